//! Advanced pattern detection
//!
//! Runs the stale, duplicate, orphan, current-branch and priority-conflict
//! detectors over one run's relationship report and branch metrics.

pub mod conflicts;
pub mod context;
pub mod duplicates;
pub mod orphans;
pub mod stale;

pub use conflicts::{detect_priority_conflicts, PriorityConflict};
pub use context::{analyze_current_branch, branch_status, BranchStatus, CurrentBranchContext, UnlinkedCurrentWork};
pub use duplicates::{duplicate_score, resolve_duplicates, resolve_group, DuplicateResolution, ScoredBranch};
pub use orphans::{detect_orphans, OrphanAction, OrphanFinding};
pub use stale::{detect_stale_branches, stale_level, StaleBranch, StaleLevel};

use crate::config::TriageConfig;
use crate::git::BranchMetrics;
use crate::relationships::{unaddressed_issues, RelationshipReport};
use crate::tracker::IssueIndex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the detectors read for one run
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    pub branches: &'a [String],
    /// Valid issues of the run, built once by the relationship analyzer
    pub index: &'a IssueIndex<'a>,
    pub report: &'a RelationshipReport,
    pub metrics: &'a BTreeMap<String, BranchMetrics>,
    pub current_branch: Option<&'a str>,
    pub base_branch: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub base_branch: String,
    pub stale: Vec<StaleBranch>,
    pub duplicates: Vec<DuplicateResolution>,
    pub orphans: Vec<OrphanFinding>,
    pub current: Option<CurrentBranchContext>,
    pub unlinked_current: Option<UnlinkedCurrentWork>,
    pub priority_conflicts: Vec<PriorityConflict>,
    /// Open issues no branch is working on
    pub unassigned_issues: Vec<String>,
}

impl PatternAnalysis {
    pub fn finding_count(&self) -> usize {
        self.stale.len()
            + self
                .duplicates
                .iter()
                .map(|d| d.merge_candidates.len())
                .sum::<usize>()
            + self.orphans.len()
            + usize::from(self.unlinked_current.is_some())
            + self.priority_conflicts.len()
    }
}

pub struct PatternDetector<'a> {
    config: &'a TriageConfig,
}

impl<'a> PatternDetector<'a> {
    pub fn new(config: &'a TriageConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, ctx: &DetectionContext<'_>) -> PatternAnalysis {
        let stale = detect_stale_branches(ctx.branches, ctx.metrics, ctx.base_branch, self.config);
        let duplicates = resolve_duplicates(
            &ctx.report.duplicates,
            ctx.metrics,
            &self.config.duplicate_resolution,
        );
        let orphans = detect_orphans(&ctx.report.orphaned, ctx.metrics);
        let unassigned = unaddressed_issues(ctx.index, ctx.report);

        let mut analysis = PatternAnalysis {
            base_branch: ctx.base_branch.to_string(),
            stale,
            duplicates,
            orphans,
            unassigned_issues: unassigned
                .iter()
                .filter_map(|issue| issue.canonical_id())
                .collect(),
            ..PatternAnalysis::default()
        };

        if let Some(current) = ctx.current_branch {
            let fallback;
            let metrics = match ctx.metrics.get(current) {
                Some(m) => m,
                None => {
                    fallback = BranchMetrics::unknown(current);
                    &fallback
                }
            };

            let (context, unlinked) =
                analyze_current_branch(current, ctx.report, metrics, ctx.base_branch, self.config);

            let current_issue = context
                .linked_issue
                .as_deref()
                .and_then(|id| ctx.index.get(id).map(|issue| (id, issue)));

            analysis.priority_conflicts = detect_priority_conflicts(
                current,
                current_issue,
                &unassigned,
                self.config.warnings.priority_mismatch_levels,
            );
            analysis.current = Some(context);
            analysis.unlinked_current = unlinked;
        }

        tracing::info!(
            stale = analysis.stale.len(),
            duplicate_groups = analysis.duplicates.len(),
            orphans = analysis.orphans.len(),
            priority_conflicts = analysis.priority_conflicts.len(),
            unlinked_current = analysis.unlinked_current.is_some(),
            "Pattern detection complete"
        );

        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::Priority;
    use crate::relationships::{BranchMemory, RelationshipAnalyzer};
    use crate::tracker::{Issue, IssueState};

    fn metrics(name: &str, commits: u32, idle: u64) -> (String, BranchMetrics) {
        let mut m = BranchMetrics::unknown(name);
        m.commit_count = commits;
        m.days_since_last_commit = Some(idle);
        (name.to_string(), m)
    }

    #[test]
    fn test_detect_runs_every_detector() {
        let branches: Vec<String> = ["main", "feature/issue-42-login", "bugfix/42-login-fix", "feature/issue-999-old", "wip"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let issues = vec![
            Issue::new("#42", "Login", IssueState::Open, Priority::High),
            Issue::new("#7", "Outage", IssueState::Open, Priority::Critical),
        ];
        let memory = BranchMemory::new();
        let analyzer = RelationshipAnalyzer::new(&issues, &memory);
        let report = analyzer.analyze(&branches);
        let metrics: BTreeMap<_, _> = [
            metrics("main", 100, 0),
            metrics("feature/issue-42-login", 2, 1),
            metrics("bugfix/42-login-fix", 4, 2),
            metrics("feature/issue-999-old", 1, 120),
            metrics("wip", 8, 0),
        ]
        .into_iter()
        .collect();

        let config = TriageConfig::default();
        let ctx = DetectionContext {
            branches: &branches,
            index: analyzer.index(),
            report: &report,
            metrics: &metrics,
            current_branch: Some("wip"),
            base_branch: "main",
        };
        let analysis = PatternDetector::new(&config).detect(&ctx);

        assert_eq!(analysis.stale.len(), 1);
        assert_eq!(analysis.stale[0].branch, "feature/issue-999-old");
        assert_eq!(analysis.duplicates.len(), 1);
        assert_eq!(analysis.duplicates[0].primary.branch, "bugfix/42-login-fix");
        assert_eq!(analysis.orphans.len(), 1);
        assert!(analysis.unlinked_current.is_some());
        assert_eq!(analysis.priority_conflicts.len(), 1);
        assert_eq!(analysis.priority_conflicts[0].issue, "#7");
        assert_eq!(analysis.unassigned_issues, vec!["#7"]);
        assert_eq!(analysis.current.as_ref().map(|c| c.status), Some(BranchStatus::Active));
        assert_eq!(analysis.finding_count(), 5);
    }

    #[test]
    fn test_no_current_branch_skips_context_detectors() {
        let branches = vec!["wip".to_string()];
        let issues = vec![Issue::new("#7", "Outage", IssueState::Open, Priority::Critical)];
        let memory = BranchMemory::new();
        let analyzer = RelationshipAnalyzer::new(&issues, &memory);
        let report = analyzer.analyze(&branches);
        let metrics = BTreeMap::new();

        let config = TriageConfig::default();
        let ctx = DetectionContext {
            branches: &branches,
            index: analyzer.index(),
            report: &report,
            metrics: &metrics,
            current_branch: None,
            base_branch: "main",
        };
        let analysis = PatternDetector::new(&config).detect(&ctx);

        assert!(analysis.current.is_none());
        assert!(analysis.unlinked_current.is_none());
        assert!(analysis.priority_conflicts.is_empty());
        assert!(analysis.stale.is_empty());
        assert_eq!(analysis.unassigned_issues, vec!["#7"]);
    }
}
