//! One reconciliation run: metrics, relationships, patterns, recommendations

use crate::config::TriageConfig;
use crate::git::{BranchHistory, BranchMetrics, MetricsCollector, MetricsError};
use crate::patterns::{DetectionContext, PatternAnalysis, PatternDetector};
use crate::recommendations::{RecommendationBatch, RecommendationEngine};
use crate::relationships::{BranchMemory, RelationshipAnalyzer, RelationshipReport};
use crate::telemetry::{create_reconciliation_span, generate_correlation_id};
use crate::tracker::Issue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base used for reporting when no base branch exists in the repository
pub const FALLBACK_BASE_BRANCH: &str = "main";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconciliationInput {
    pub branches: Vec<String>,
    pub issues: Vec<Issue>,
    pub memory: BranchMemory,
    pub current_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationOutcome {
    pub correlation_id: String,
    pub base_branch: String,
    pub metrics: BTreeMap<String, BranchMetrics>,
    pub report: RelationshipReport,
    pub analysis: PatternAnalysis,
    pub recommendations: RecommendationBatch,
}

pub struct Reconciler<'a, H: BranchHistory + ?Sized> {
    history: &'a H,
    config: &'a TriageConfig,
    now: Option<DateTime<Utc>>,
}

impl<'a, H: BranchHistory + ?Sized> Reconciler<'a, H> {
    pub fn new(history: &'a H, config: &'a TriageConfig) -> Self {
        Self {
            history,
            config,
            now: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn run(&self, input: &ReconciliationInput) -> ReconciliationOutcome {
        let branches = analyzed_branches(input);
        let correlation_id = generate_correlation_id();
        let span = create_reconciliation_span(
            &correlation_id,
            branches.len(),
            input.current_branch.as_deref(),
        );
        let _enter = span.enter();

        let mut collector = MetricsCollector::new(self.history);
        if let Some(now) = self.now {
            collector = collector.with_now(now);
        }

        let resolved_base = collector.resolve_base(self.config.base_branch.as_deref());
        if resolved_base.is_none() {
            tracing::warn!(
                configured = ?self.config.base_branch,
                "No base branch found; ahead/behind and diff metrics stay unresolved"
            );
        }
        let base_branch = resolved_base
            .clone()
            .or_else(|| self.config.base_branch.clone())
            .unwrap_or_else(|| FALLBACK_BASE_BRANCH.to_string());

        let metrics = collector.collect_all(&branches, resolved_base.as_deref());
        let analyzer = RelationshipAnalyzer::new(&input.issues, &input.memory);
        let report = analyzer.analyze(&branches);

        let ctx = DetectionContext {
            branches: &branches,
            index: analyzer.index(),
            report: &report,
            metrics: &metrics,
            current_branch: input.current_branch.as_deref(),
            base_branch: &base_branch,
        };
        let analysis = PatternDetector::new(self.config).detect(&ctx);
        let recommendations = RecommendationEngine::new(self.config).process(&analysis);

        tracing::info!(
            base_branch = %base_branch,
            findings = analysis.finding_count(),
            recommendations = recommendations.count,
            "Reconciliation complete"
        );

        ReconciliationOutcome {
            correlation_id,
            base_branch,
            metrics,
            report,
            analysis,
            recommendations,
        }
    }
}

/// Input branches plus the current branch when the caller left it out
fn analyzed_branches(input: &ReconciliationInput) -> Vec<String> {
    let mut branches = input.branches.clone();
    if let Some(current) = input.current_branch.as_deref() {
        if !branches.iter().any(|b| b == current) {
            tracing::debug!(branch = current, "Adding current branch to the analyzed set");
            branches.push(current.to_string());
        }
    }
    branches
}

/// Build an input from the repository's local branches and checked-out branch
pub fn discover_input<H: BranchHistory + ?Sized>(
    history: &H,
    issues: Vec<Issue>,
    memory: BranchMemory,
) -> Result<ReconciliationInput, MetricsError> {
    Ok(ReconciliationInput {
        branches: history.local_branches()?,
        issues,
        memory,
        current_branch: history.current_branch()?,
    })
}
