use super::operations::BranchHistory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Metrics the collector could not determine for a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    Age,
    LastCommit,
    CommitCount,
    AheadBehind,
    Diff,
}

/// Activity metrics for one branch, recomputed on every run.
///
/// Counts default to zero when a query fails; the failed queries are listed
/// in `unresolved` so "no activity" and "could not tell" stay distinct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchMetrics {
    pub name: String,
    pub base_branch: Option<String>,
    pub age_days: Option<u64>,
    /// `None` when no commit could be resolved; treated as unbounded
    pub days_since_last_commit: Option<u64>,
    pub commit_count: u32,
    pub ahead_count: u32,
    pub behind_count: u32,
    pub changed_files_count: u32,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub unresolved: BTreeSet<MetricField>,
}

impl BranchMetrics {
    /// Metrics for a branch nothing is known about
    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_branch: None,
            age_days: None,
            days_since_last_commit: None,
            commit_count: 0,
            ahead_count: 0,
            behind_count: 0,
            changed_files_count: 0,
            lines_added: 0,
            lines_deleted: 0,
            unresolved: [
                MetricField::Age,
                MetricField::LastCommit,
                MetricField::CommitCount,
                MetricField::AheadBehind,
                MetricField::Diff,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Days since the last commit, `u64::MAX` when there is none
    pub fn idle_days(&self) -> u64 {
        self.days_since_last_commit.unwrap_or(u64::MAX)
    }

    pub fn total_changed_lines(&self) -> u64 {
        self.lines_added + self.lines_deleted
    }

    pub fn is_resolved(&self, field: MetricField) -> bool {
        !self.unresolved.contains(&field)
    }
}

/// Builds `BranchMetrics` from a `BranchHistory`, one query at a time.
///
/// Every query is fail-soft: an error is logged at debug level and the
/// affected field keeps its default.
pub struct MetricsCollector<'a, H: BranchHistory + ?Sized> {
    history: &'a H,
    now: DateTime<Utc>,
}

impl<'a, H: BranchHistory + ?Sized> MetricsCollector<'a, H> {
    pub fn new(history: &'a H) -> Self {
        Self {
            history,
            now: Utc::now(),
        }
    }

    /// Pin the reference time used for day calculations
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Pick the base branch: the preferred one if it exists, else `main`, else `master`
    pub fn resolve_base(&self, preferred: Option<&str>) -> Option<String> {
        preferred
            .into_iter()
            .chain(["main", "master"])
            .find(|candidate| self.history.branch_exists(candidate))
            .map(str::to_string)
    }

    pub fn collect(&self, branch: &str, base: Option<&str>) -> BranchMetrics {
        let mut metrics = BranchMetrics::unknown(branch);
        metrics.base_branch = base.map(str::to_string);

        let tip = match self.history.tip_time(branch) {
            Ok(tip) => {
                metrics.days_since_last_commit = Some(self.days_since(tip));
                metrics.unresolved.remove(&MetricField::LastCommit);
                Some(tip)
            }
            Err(e) => {
                tracing::debug!(branch, error = %e, "Could not resolve last commit");
                None
            }
        };

        // Comparing a branch with itself only makes sense over its full history
        let base = base.filter(|b| *b != branch);

        let times = match base {
            Some(base) => self.history.commit_times(branch, base),
            None => self.history.all_commit_times(branch),
        };
        match times {
            Ok(times) => {
                metrics.commit_count = saturate(times.len());
                metrics.unresolved.remove(&MetricField::CommitCount);

                if let Some(first) = times.iter().min().copied().or(tip) {
                    metrics.age_days = Some(self.days_since(first));
                    metrics.unresolved.remove(&MetricField::Age);
                }
            }
            Err(e) => tracing::debug!(branch, error = %e, "Could not count commits"),
        }

        match base {
            Some(base) => {
                match self.history.ahead_behind(branch, base) {
                    Ok((ahead, behind)) => {
                        metrics.ahead_count = saturate(ahead);
                        metrics.behind_count = saturate(behind);
                        metrics.unresolved.remove(&MetricField::AheadBehind);
                    }
                    Err(e) => tracing::debug!(branch, base, error = %e, "Could not compute ahead/behind"),
                }

                match self.history.diff_stats(branch, base) {
                    Ok(stats) => {
                        metrics.changed_files_count = saturate(stats.files_changed);
                        metrics.lines_added = stats.insertions as u64;
                        metrics.lines_deleted = stats.deletions as u64;
                        metrics.unresolved.remove(&MetricField::Diff);
                    }
                    Err(e) => tracing::debug!(branch, base, error = %e, "Could not compute diff stats"),
                }
            }
            None if metrics.base_branch.is_some() => {
                // The branch is its own base
                metrics.unresolved.remove(&MetricField::AheadBehind);
                metrics.unresolved.remove(&MetricField::Diff);
            }
            None => {}
        }

        metrics
    }

    /// Collect metrics for every branch; one failure never affects another
    pub fn collect_all(&self, branches: &[String], base: Option<&str>) -> BTreeMap<String, BranchMetrics> {
        branches
            .iter()
            .map(|branch| (branch.clone(), self.collect(branch, base)))
            .collect()
    }

    fn days_since(&self, at: DateTime<Utc>) -> u64 {
        (self.now - at).num_days().max(0) as u64
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
