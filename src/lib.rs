// Branch Triage Library - branch/issue reconciliation and cleanup recommendations
// This exposes the core components for testing and integration

pub mod config;
pub mod git;
pub mod patterns;
pub mod pipeline;
pub mod priority;
pub mod recommendations;
pub mod relationships;
pub mod severity;
pub mod telemetry;
pub mod tracker;

// Re-export key types for easy access
pub use config::{ConfigError, TriageConfig};
pub use git::{BranchHistory, BranchMetrics, Git2History, MetricsCollector, MetricsError};
pub use patterns::{PatternAnalysis, PatternDetector};
pub use pipeline::{discover_input, ReconciliationInput, ReconciliationOutcome, Reconciler};
pub use priority::Priority;
pub use recommendations::{Recommendation, RecommendationBatch, RecommendationEngine, RecommendationType};
pub use relationships::{analyze, extract_issue_ref, find_unassigned_issues, BranchMemory, RelationshipReport};
pub use severity::Severity;
pub use telemetry::{create_reconciliation_span, generate_correlation_id, init_telemetry};
pub use tracker::{normalize_issue_id, parse_issues, Issue, IssueState};
