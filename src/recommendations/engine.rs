use super::format::format_recommendations;
use super::types::{Recommendation, RecommendationBatch, RecommendationType};
use crate::config::TriageConfig;
use crate::patterns::{
    BranchStatus, CurrentBranchContext, DuplicateResolution, OrphanAction, OrphanFinding, PatternAnalysis,
    PriorityConflict, StaleBranch, UnlinkedCurrentWork,
};
use crate::severity::Severity;
use std::collections::HashSet;

/// Turns detector findings into ranked, copy-pasteable actions
pub struct RecommendationEngine<'a> {
    config: &'a TriageConfig,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(config: &'a TriageConfig) -> Self {
        Self { config }
    }

    /// Map every finding to exactly one recommendation, unranked
    pub fn recommend(&self, analysis: &PatternAnalysis) -> Vec<Recommendation> {
        let base = analysis.base_branch.as_str();
        let mut recommendations = Vec::new();

        if let Some(work) = &analysis.unlinked_current {
            recommendations.push(unlinked_current(work, analysis));
        }
        recommendations.extend(analysis.priority_conflicts.iter().map(|c| priority_mismatch(c, base)));
        recommendations.extend(analysis.orphans.iter().map(orphaned_branch));
        for resolution in &analysis.duplicates {
            recommendations.extend(duplicate_branches(resolution));
        }
        if let Some(context) = &analysis.current {
            recommendations.extend(current_branch(context, base));
        }
        let current = analysis.current.as_ref().map(|c| c.branch.as_str());
        recommendations.extend(analysis.stale.iter().map(|s| stale_branch(s, base, current)));

        recommendations
    }

    pub fn process(&self, analysis: &PatternAnalysis) -> RecommendationBatch {
        let (recommendations, suppressed) =
            rank_recommendations(self.recommend(analysis), self.config.output.max_recommendations);

        let has_critical = recommendations
            .iter()
            .any(|r| r.severity == Severity::Critical);
        let formatted = format_recommendations(&recommendations, suppressed);

        tracing::info!(
            count = recommendations.len(),
            suppressed,
            has_critical,
            "Recommendations ready"
        );

        RecommendationBatch {
            count: recommendations.len(),
            recommendations,
            formatted,
            has_critical,
            suppressed,
        }
    }
}

/// Drop repeated `(type, command)` pairs, sort by rank then severity, keep `max`.
/// Returns the kept list and how many were cut by the limit.
pub fn rank_recommendations(mut recommendations: Vec<Recommendation>, max: usize) -> (Vec<Recommendation>, usize) {
    let mut seen = HashSet::new();
    recommendations.retain(|r| seen.insert((r.kind, r.command.clone())));

    recommendations.sort_by_key(|r| (r.priority, r.severity));

    let total = recommendations.len();
    recommendations.truncate(max);
    let suppressed = total - recommendations.len();
    (recommendations, suppressed)
}

/// Quote for a POSIX shell unless the value is plainly safe
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.' | '#' | '+' | '@' | ':' | ','));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

fn issue_number(id: &str) -> &str {
    id.trim_start_matches('#')
}

fn recreate_issue_command(branch: &str, referenced_issue: &str) -> String {
    format!(
        "gh issue create --title {} --body {}",
        shell_quote(branch),
        shell_quote(&format!(
            "Recreated for branch {branch}, which referenced missing issue {referenced_issue}"
        ))
    )
}

fn unlinked_current(work: &UnlinkedCurrentWork, analysis: &PatternAnalysis) -> Recommendation {
    let branch = shell_quote(&work.branch);
    // Rename toward the most urgent issue nobody is working on
    let target = analysis
        .priority_conflicts
        .first()
        .map(|c| c.issue.as_str())
        .or_else(|| analysis.unassigned_issues.first().map(String::as_str));

    let recommendation = Recommendation::new(
        RecommendationType::UnlinkedCurrent,
        work.severity,
        format!(
            "Current branch '{}' has {} commits but is not linked to any issue",
            work.branch, work.commit_count
        ),
        format!(
            "gh issue create --title {} --body {}",
            branch,
            shell_quote(&format!("Tracks work on branch {}", work.branch))
        ),
    )
    .for_branch(&work.branch);

    match target {
        Some(issue) => {
            let renamed = format!("issue-{}-{}", issue_number(issue), work.branch);
            recommendation.with_alternative(format!("git branch -m {branch} {}", shell_quote(&renamed)))
        }
        None => recommendation,
    }
}

fn priority_mismatch(conflict: &PriorityConflict, base: &str) -> Recommendation {
    let number = issue_number(&conflict.issue);
    let current_work = match &conflict.current_issue {
        Some(id) => format!("{} priority issue {}", conflict.current_priority, id),
        None => "unlinked work".to_string(),
    };

    Recommendation::new(
        RecommendationType::PriorityMismatch,
        conflict.severity,
        format!(
            "{} priority issue {} '{}' has no branch while '{}' is on {}",
            conflict.issue_priority, conflict.issue, conflict.issue_title, conflict.current_branch, current_work
        ),
        format!(
            "git stash && git checkout {} && git checkout -b issue-{}",
            shell_quote(base),
            number
        ),
    )
    .with_alternative(format!("gh issue view {number}"))
    .for_branch(&conflict.current_branch)
}

fn orphaned_branch(orphan: &OrphanFinding) -> Recommendation {
    let delete = format!("git branch -D {}", shell_quote(&orphan.branch));
    let recreate = recreate_issue_command(&orphan.branch, &orphan.referenced_issue);

    let (message, command, alternative) = match orphan.action {
        OrphanAction::RecreateIssue => (
            format!(
                "Branch '{}' references missing issue {} but carries {} commits; recreate the issue",
                orphan.branch, orphan.referenced_issue, orphan.commit_count
            ),
            recreate,
            delete,
        ),
        OrphanAction::DeleteBranch => (
            format!(
                "Branch '{}' references missing issue {}; delete it",
                orphan.branch, orphan.referenced_issue
            ),
            delete,
            recreate,
        ),
    };

    Recommendation::new(RecommendationType::OrphanedBranch, orphan.severity, message, command)
        .with_alternative(alternative)
        .for_branch(&orphan.branch)
}

fn duplicate_branches(resolution: &DuplicateResolution) -> impl Iterator<Item = Recommendation> + '_ {
    let primary = &resolution.primary;
    resolution.merge_candidates.iter().map(move |candidate| {
        let dup = shell_quote(&candidate.branch);
        Recommendation::new(
            RecommendationType::DuplicateBranch,
            resolution.severity,
            format!(
                "Branch '{}' duplicates '{}' for issue {} (score {:.1} vs {:.1}); merge it into the primary",
                candidate.branch, primary.branch, resolution.issue, candidate.score, primary.score
            ),
            format!(
                "git checkout {} && git merge {dup} && git branch -D {dup}",
                shell_quote(&primary.branch)
            ),
        )
        .with_alternative(format!("git branch -D {dup}"))
        .for_branch(&candidate.branch)
    })
}

fn current_branch(context: &CurrentBranchContext, base: &str) -> Option<Recommendation> {
    let branch = shell_quote(&context.branch);
    let base_quoted = shell_quote(base);

    match context.status {
        BranchStatus::NeedsRebase => Some(
            Recommendation::new(
                RecommendationType::NeedsRebase,
                Severity::Medium,
                format!(
                    "Current branch '{}' is {} commits behind {}",
                    context.branch, context.behind_count, base
                ),
                format!("git checkout {branch} && git rebase {base_quoted}"),
            )
            .with_alternative(format!("git checkout {branch} && git merge {base_quoted}"))
            .for_branch(&context.branch),
        ),
        BranchStatus::ReadyForPr => Some(
            Recommendation::new(
                RecommendationType::ReadyForPr,
                Severity::Info,
                format!(
                    "Current branch '{}' is {} commits ahead with {} changed lines; open a pull request",
                    context.branch, context.ahead_count, context.changed_lines
                ),
                format!("gh pr create -B {base_quoted} -H {branch}"),
            )
            .for_branch(&context.branch),
        ),
        // Staleness is reported by the stale detector
        BranchStatus::Stale | BranchStatus::InProgress | BranchStatus::Active => None,
    }
}

fn stale_branch(stale: &StaleBranch, base: &str, current: Option<&str>) -> Recommendation {
    let branch = shell_quote(&stale.branch);
    let base_quoted = shell_quote(base);
    let message = match stale.days_since_last_commit {
        Some(days) => format!("Branch '{}' has had no commits for {} days", stale.branch, days),
        None => format!("Branch '{}' has no resolvable commits", stale.branch),
    };

    // git refuses to delete the checked-out branch
    let command = if current == Some(stale.branch.as_str()) {
        format!("git checkout {base_quoted} && git branch -D {branch}")
    } else {
        format!("git branch -D {branch}")
    };

    Recommendation::new(RecommendationType::StaleBranch, stale.level.severity(), message, command)
        .with_alternative(format!("git checkout {branch} && git rebase {base_quoted}"))
        .for_branch(&stale.branch)
}
