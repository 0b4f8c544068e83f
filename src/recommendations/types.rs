use crate::severity::Severity;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    UnlinkedCurrent,
    PriorityMismatch,
    OrphanedBranch,
    DuplicateBranch,
    NeedsRebase,
    StaleBranch,
    ReadyForPr,
}

impl RecommendationType {
    /// Fixed rank per type, 0 = act first
    pub fn rank(self) -> u8 {
        match self {
            RecommendationType::UnlinkedCurrent | RecommendationType::PriorityMismatch => 0,
            RecommendationType::OrphanedBranch | RecommendationType::DuplicateBranch => 2,
            RecommendationType::NeedsRebase | RecommendationType::StaleBranch => 3,
            RecommendationType::ReadyForPr => 4,
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecommendationType::UnlinkedCurrent => "UNLINKED_CURRENT",
            RecommendationType::PriorityMismatch => "PRIORITY_MISMATCH",
            RecommendationType::OrphanedBranch => "ORPHANED_BRANCH",
            RecommendationType::DuplicateBranch => "DUPLICATE_BRANCH",
            RecommendationType::NeedsRebase => "NEEDS_REBASE",
            RecommendationType::StaleBranch => "STALE_BRANCH",
            RecommendationType::ReadyForPr => "READY_FOR_PR",
        };
        write!(f, "{}", label)
    }
}

/// One concrete action. `command` is always a runnable shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub severity: Severity,
    pub priority: u8,
    pub message: String,
    pub command: String,
    pub alternative: Option<String>,
    /// Branch the recommendation is about
    pub branch: Option<String>,
}

impl Recommendation {
    pub fn new(kind: RecommendationType, severity: Severity, message: String, command: String) -> Self {
        Self {
            kind,
            severity,
            priority: kind.rank(),
            message,
            command,
            alternative: None,
            branch: None,
        }
    }

    pub fn with_alternative(mut self, alternative: String) -> Self {
        self.alternative = Some(alternative);
        self
    }

    pub fn for_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }
}

/// Ranked, truncated output of one engine run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBatch {
    pub recommendations: Vec<Recommendation>,
    pub formatted: String,
    pub count: usize,
    pub has_critical: bool,
    /// Recommendations cut by `output.maxRecommendations`
    pub suppressed: usize,
}
