use crate::config::{ContextConfig, TriageConfig};
use crate::git::BranchMetrics;
use crate::relationships::RelationshipReport;
use crate::severity::Severity;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchStatus {
    Stale,
    ReadyForPr,
    InProgress,
    NeedsRebase,
    Active,
}

impl fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BranchStatus::Stale => "stale",
            BranchStatus::ReadyForPr => "ready-for-pr",
            BranchStatus::InProgress => "in-progress",
            BranchStatus::NeedsRebase => "needs-rebase",
            BranchStatus::Active => "active",
        };
        write!(f, "{}", label)
    }
}

/// Where the checked-out branch stands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBranchContext {
    pub branch: String,
    pub status: BranchStatus,
    pub linked_issue: Option<String>,
    pub commit_count: u32,
    pub ahead_count: u32,
    pub behind_count: u32,
    pub changed_lines: u64,
}

/// Substantial work on the current branch with no issue behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkedCurrentWork {
    pub branch: String,
    pub commit_count: u32,
    pub severity: Severity,
}

/// First matching rule wins: stale, ready-for-pr, in-progress, needs-rebase, active
pub fn branch_status(metrics: &BranchMetrics, thresholds: &ContextConfig) -> BranchStatus {
    if metrics.idle_days() > thresholds.stale_days {
        BranchStatus::Stale
    } else if metrics.ahead_count > thresholds.ready_min_ahead
        && metrics.total_changed_lines() > thresholds.ready_min_changed_lines
    {
        BranchStatus::ReadyForPr
    } else if metrics.commit_count < thresholds.in_progress_max_commits {
        BranchStatus::InProgress
    } else if metrics.behind_count > thresholds.rebase_min_behind {
        BranchStatus::NeedsRebase
    } else {
        BranchStatus::Active
    }
}

pub fn analyze_current_branch(
    branch: &str,
    report: &RelationshipReport,
    metrics: &BranchMetrics,
    base_branch: &str,
    config: &TriageConfig,
) -> (CurrentBranchContext, Option<UnlinkedCurrentWork>) {
    let context = CurrentBranchContext {
        branch: branch.to_string(),
        status: branch_status(metrics, &config.context),
        linked_issue: report.link_for(branch).map(|link| link.issue.clone()),
        commit_count: metrics.commit_count,
        ahead_count: metrics.ahead_count,
        behind_count: metrics.behind_count,
        changed_lines: metrics.total_changed_lines(),
    };

    let unlinked_work = (report.is_unlinked(branch)
        && !config.is_protected(branch, base_branch)
        && metrics.commit_count > config.warnings.unlinked_branch_commit_threshold)
        .then(|| UnlinkedCurrentWork {
            branch: branch.to_string(),
            commit_count: metrics.commit_count,
            severity: Severity::High,
        });

    (context, unlinked_work)
}
