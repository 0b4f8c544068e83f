use crate::git::BranchMetrics;
use crate::relationships::OrphanedBranch;
use crate::severity::Severity;
use serde::Serialize;
use std::collections::BTreeMap;

/// More commits than this and the work is worth a new issue
const RECREATE_MIN_COMMITS: u32 = 3;
const HIGH_SEVERITY_COMMITS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrphanAction {
    RecreateIssue,
    DeleteBranch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanFinding {
    pub branch: String,
    pub referenced_issue: String,
    pub commit_count: u32,
    pub action: OrphanAction,
    pub severity: Severity,
}

pub fn detect_orphans(
    orphaned: &[OrphanedBranch],
    metrics: &BTreeMap<String, BranchMetrics>,
) -> Vec<OrphanFinding> {
    orphaned
        .iter()
        .map(|orphan| {
            let commit_count = metrics
                .get(&orphan.branch)
                .map_or(0, |m| m.commit_count);

            let action = if commit_count > RECREATE_MIN_COMMITS {
                OrphanAction::RecreateIssue
            } else {
                OrphanAction::DeleteBranch
            };
            let severity = if commit_count > HIGH_SEVERITY_COMMITS {
                Severity::High
            } else {
                Severity::Medium
            };

            OrphanFinding {
                branch: orphan.branch.clone(),
                referenced_issue: orphan.referenced_issue.clone(),
                commit_count,
                action,
                severity,
            }
        })
        .collect()
}
