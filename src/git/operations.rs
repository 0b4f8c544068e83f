use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use git2::{BranchType, ErrorCode, Oid, Repository, Sort};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Branch not found: {branch}")]
    BranchNotFound { branch: String },
    #[error("Commit timestamp out of range: {seconds}")]
    InvalidTimestamp { seconds: i64 },
    #[error("Git query failed: {source}")]
    Git {
        #[from]
        source: git2::Error,
    },
}

/// File and line totals of a branch relative to its base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// Read-only queries against local branch history.
///
/// Implementations must never mutate the repository: no checkout, no fetch,
/// no ref updates.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait BranchHistory {
    /// Check if a branch exists locally or as `origin/<branch>`
    fn branch_exists(&self, branch: &str) -> bool;

    /// Timestamp of the branch tip commit
    fn tip_time(&self, branch: &str) -> Result<DateTime<Utc>, MetricsError>;

    /// Timestamps of commits reachable from `branch` but not from `base`, newest first
    fn commit_times(&self, branch: &str, base: &str) -> Result<Vec<DateTime<Utc>>, MetricsError>;

    /// Timestamps of every commit reachable from `branch`, newest first
    fn all_commit_times(&self, branch: &str) -> Result<Vec<DateTime<Utc>>, MetricsError>;

    /// Commits unique to `branch` and to `base`, as `(ahead, behind)`
    fn ahead_behind(&self, branch: &str, base: &str) -> Result<(usize, usize), MetricsError>;

    /// Diff totals between the merge base of `branch`/`base` and the branch tip
    fn diff_stats(&self, branch: &str, base: &str) -> Result<DiffStats, MetricsError>;

    /// Names of all local branches
    fn local_branches(&self) -> Result<Vec<String>, MetricsError>;

    /// Branch HEAD points to, `None` when detached or unborn
    fn current_branch(&self) -> Result<Option<String>, MetricsError>;
}

/// Implementation of BranchHistory using git2
pub struct Git2History {
    repo: Repository,
}

impl Git2History {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    /// Open the repository containing `path`, searching parent directories
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("Not inside a git repository")?;
        Ok(Self { repo })
    }

    fn resolve_tip(&self, branch: &str) -> Result<Oid, MetricsError> {
        let branch_ref = self
            .repo
            .find_branch(branch, BranchType::Local)
            .or_else(|_| {
                self.repo
                    .find_branch(&format!("origin/{branch}"), BranchType::Remote)
            })
            .map_err(|_| MetricsError::BranchNotFound {
                branch: branch.to_string(),
            })?;

        Ok(branch_ref.get().peel_to_commit()?.id())
    }

    fn walk_times(&self, tip: Oid, hide: Option<Oid>) -> Result<Vec<DateTime<Utc>>, MetricsError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(tip)?;
        if let Some(hidden) = hide {
            revwalk.hide(hidden)?;
        }

        let mut times = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            times.push(to_utc(commit.time().seconds())?);
        }
        Ok(times)
    }
}

fn to_utc(seconds: i64) -> Result<DateTime<Utc>, MetricsError> {
    DateTime::from_timestamp(seconds, 0).ok_or(MetricsError::InvalidTimestamp { seconds })
}

impl BranchHistory for Git2History {
    fn branch_exists(&self, branch: &str) -> bool {
        self.resolve_tip(branch).is_ok()
    }

    fn tip_time(&self, branch: &str) -> Result<DateTime<Utc>, MetricsError> {
        let commit = self.repo.find_commit(self.resolve_tip(branch)?)?;
        to_utc(commit.time().seconds())
    }

    fn commit_times(&self, branch: &str, base: &str) -> Result<Vec<DateTime<Utc>>, MetricsError> {
        let tip = self.resolve_tip(branch)?;
        let base_tip = self.resolve_tip(base)?;
        self.walk_times(tip, Some(base_tip))
    }

    fn all_commit_times(&self, branch: &str) -> Result<Vec<DateTime<Utc>>, MetricsError> {
        let tip = self.resolve_tip(branch)?;
        self.walk_times(tip, None)
    }

    fn ahead_behind(&self, branch: &str, base: &str) -> Result<(usize, usize), MetricsError> {
        let tip = self.resolve_tip(branch)?;
        let base_tip = self.resolve_tip(base)?;
        Ok(self.repo.graph_ahead_behind(tip, base_tip)?)
    }

    fn diff_stats(&self, branch: &str, base: &str) -> Result<DiffStats, MetricsError> {
        let tip = self.resolve_tip(branch)?;
        let base_tip = self.resolve_tip(base)?;

        // Unrelated histories have no merge base; compare against the base tip
        let fork_point = match self.repo.merge_base(tip, base_tip) {
            Ok(oid) => oid,
            Err(e) if e.code() == ErrorCode::NotFound => base_tip,
            Err(e) => return Err(e.into()),
        };

        let base_tree = self.repo.find_commit(fork_point)?.tree()?;
        let branch_tree = self.repo.find_commit(tip)?.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&branch_tree), None)?;
        let stats = diff.stats()?;

        Ok(DiffStats {
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }

    fn local_branches(&self) -> Result<Vec<String>, MetricsError> {
        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn current_branch(&self) -> Result<Option<String>, MetricsError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use git2::{RepositoryInitOptions, Signature, Time};
    use tempfile::TempDir;

    pub(crate) const DAY: i64 = 86_400;
    pub(crate) const T0: i64 = 1_700_000_000;

    /// Commit `content` to `file` on top of `refname`, creating the ref if needed
    pub(crate) fn commit_file(
        repo: &Repository,
        refname: &str,
        file: &str,
        content: &str,
        seconds: i64,
    ) -> Oid {
        let signature = Signature::new("Test", "test@example.com", &Time::new(seconds, 0)).unwrap();
        let parent = repo
            .find_reference(refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let parent_tree = parent.as_ref().map(|c| c.tree().unwrap());

        let blob = repo.blob(content.as_bytes()).unwrap();
        let mut builder = repo.treebuilder(parent_tree.as_ref()).unwrap();
        builder.insert(file, blob, 0o100644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();

        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some(refname), &signature, &signature, "test commit", &tree, &parents)
            .unwrap()
    }

    /// main: base.txt @T0, base.txt @T0+3d
    /// feature (from first main commit): feat.txt @T0+1d, feat.txt @T0+2d
    pub(crate) fn create_test_repo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(temp_dir.path(), &opts).unwrap();

        let root = commit_file(&repo, "refs/heads/main", "base.txt", "one\n", T0);
        {
            let root_commit = repo.find_commit(root).unwrap();
            repo.branch("feature/issue-42-login", &root_commit, false).unwrap();
        }
        commit_file(&repo, "refs/heads/feature/issue-42-login", "feat.txt", "a\nb\nc\n", T0 + DAY);
        commit_file(&repo, "refs/heads/feature/issue-42-login", "feat.txt", "a\nb\nc\nd\n", T0 + 2 * DAY);
        commit_file(&repo, "refs/heads/main", "base.txt", "one\ntwo\n", T0 + 3 * DAY);

        (temp_dir, repo)
    }

    #[test]
    fn test_branch_queries() {
        let (temp_dir, _repo) = create_test_repo();
        let history = Git2History::open(temp_dir.path()).unwrap();

        assert!(history.branch_exists("main"));
        assert!(history.branch_exists("feature/issue-42-login"));
        assert!(!history.branch_exists("nope"));

        let branches = history.local_branches().unwrap();
        assert_eq!(branches, vec!["feature/issue-42-login", "main"]);
        assert_eq!(history.current_branch().unwrap().as_deref(), Some("main"));
    }

    #[test]
    fn test_commit_times_and_ahead_behind() {
        let (temp_dir, _repo) = create_test_repo();
        let history = Git2History::open(temp_dir.path()).unwrap();
        let feature = "feature/issue-42-login";

        let times = history.commit_times(feature, "main").unwrap();
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].timestamp(), T0 + 2 * DAY);
        assert_eq!(times[1].timestamp(), T0 + DAY);

        assert_eq!(history.all_commit_times(feature).unwrap().len(), 3);
        assert_eq!(history.tip_time(feature).unwrap().timestamp(), T0 + 2 * DAY);
        assert_eq!(history.ahead_behind(feature, "main").unwrap(), (2, 1));
    }

    #[test]
    fn test_diff_stats_against_merge_base() {
        let (temp_dir, _repo) = create_test_repo();
        let history = Git2History::open(temp_dir.path()).unwrap();

        let stats = history.diff_stats("feature/issue-42-login", "main").unwrap();
        assert_eq!(
            stats,
            DiffStats {
                files_changed: 1,
                insertions: 4,
                deletions: 0,
            }
        );
    }

    #[test]
    fn test_missing_branch_is_an_error() {
        let (temp_dir, _repo) = create_test_repo();
        let history = Git2History::open(temp_dir.path()).unwrap();

        assert!(matches!(
            history.tip_time("gone"),
            Err(MetricsError::BranchNotFound { .. })
        ));
        assert!(history.ahead_behind("main", "gone").is_err());
    }

    #[test]
    fn test_unborn_head_has_no_current_branch() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();
        let history = Git2History::open(temp_dir.path()).unwrap();

        assert_eq!(history.current_branch().unwrap(), None);
        assert!(history.local_branches().unwrap().is_empty());
    }
}
