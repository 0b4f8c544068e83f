use crate::config::TriageConfig;
use crate::git::BranchMetrics;
use crate::severity::Severity;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleLevel {
    Warning,
    Critical,
}

impl StaleLevel {
    pub fn severity(self) -> Severity {
        match self {
            StaleLevel::Critical => Severity::Critical,
            StaleLevel::Warning => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleBranch {
    pub branch: String,
    /// `None` when the branch has no resolvable commits
    pub days_since_last_commit: Option<u64>,
    pub level: StaleLevel,
}

/// Classify idle time against the threshold: at or past it is a warning,
/// more than twice it is critical.
pub fn stale_level(idle_days: u64, threshold_days: u64) -> Option<StaleLevel> {
    if idle_days < threshold_days {
        None
    } else if idle_days > threshold_days.saturating_mul(2) {
        Some(StaleLevel::Critical)
    } else {
        Some(StaleLevel::Warning)
    }
}

/// Flag every non-protected branch idle for at least `staleThresholdDays`.
/// Output follows the order of `branches`.
pub fn detect_stale_branches(
    branches: &[String],
    metrics: &BTreeMap<String, BranchMetrics>,
    base_branch: &str,
    config: &TriageConfig,
) -> Vec<StaleBranch> {
    branches
        .iter()
        .filter(|branch| !config.is_protected(branch, base_branch))
        .filter_map(|branch| {
            let Some(branch_metrics) = metrics.get(branch) else {
                tracing::debug!(branch = %branch, "No metrics collected, skipping stale check");
                return None;
            };
            stale_level(branch_metrics.idle_days(), config.stale_threshold_days).map(|level| StaleBranch {
                branch: branch.clone(),
                days_since_last_commit: branch_metrics.days_since_last_commit,
                level,
            })
        })
        .collect()
}
