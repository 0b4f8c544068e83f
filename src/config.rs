use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Thresholds and weights for one reconciliation run.
///
/// Passed explicitly into every analyzer and detector. Field names follow the
/// camelCase keys of the on-disk JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriageConfig {
    /// Days without a commit before a branch counts as stale
    pub stale_threshold_days: u64,
    /// Kept for compatibility with existing config files; critical staleness
    /// is derived as twice `stale_threshold_days`
    pub critical_stale_threshold_days: u64,
    /// Branch to compare against; `main`, then `master` when unset
    pub base_branch: Option<String>,
    /// Branches never reported as stale or as unlinked work
    pub protected_branches: Vec<String>,
    pub duplicate_resolution: DuplicateResolutionConfig,
    pub warnings: WarningsConfig,
    pub context: ContextConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuplicateResolutionConfig {
    pub weight_commit_count: f64,
    pub weight_recency: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarningsConfig {
    /// Commits on an unlinked current branch before it is worth surfacing
    pub unlinked_branch_commit_threshold: u32,
    /// Minimum priority gap between unaddressed and current work
    pub priority_mismatch_levels: u8,
}

/// Thresholds for classifying the current branch status
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextConfig {
    pub stale_days: u64,
    pub ready_min_ahead: u32,
    pub ready_min_changed_lines: u64,
    pub in_progress_max_commits: u32,
    pub rebase_min_behind: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub max_recommendations: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            stale_threshold_days: 30,
            critical_stale_threshold_days: 14,
            base_branch: None,
            protected_branches: vec!["main".to_string(), "master".to_string()],
            duplicate_resolution: DuplicateResolutionConfig::default(),
            warnings: WarningsConfig::default(),
            context: ContextConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for DuplicateResolutionConfig {
    fn default() -> Self {
        Self {
            weight_commit_count: 0.7,
            weight_recency: 0.3,
        }
    }
}

impl Default for WarningsConfig {
    fn default() -> Self {
        Self {
            unlinked_branch_commit_threshold: 5,
            priority_mismatch_levels: 2,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            stale_days: 30,
            ready_min_ahead: 10,
            ready_min_changed_lines: 200,
            in_progress_max_commits: 3,
            rebase_min_behind: 20,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 10,
        }
    }
}

impl TriageConfig {
    /// Parse commented JSON. Lines starting with `//` are dropped first.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let stripped: String = raw
            .lines()
            .filter(|line| !line.trim_start().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        if stripped.trim().is_empty() {
            return Ok(Self::default());
        }

        let parsed: TriageConfig = serde_json::from_str(&stripped)?;
        Ok(parsed.sanitized())
    }

    /// Load configuration from a commented JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path.as_ref().display(), "Configuration loaded successfully");
                config
            }
            Err(e) => {
                tracing::warn!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Replace values that would make the analysis meaningless with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.stale_threshold_days == 0 {
            tracing::warn!("staleThresholdDays must be positive, using default");
            self.stale_threshold_days = defaults.stale_threshold_days;
        }

        let weights = &mut self.duplicate_resolution;
        if !weights.weight_commit_count.is_finite() || weights.weight_commit_count < 0.0 {
            tracing::warn!("duplicateResolution.weightCommitCount is invalid, using default");
            weights.weight_commit_count = defaults.duplicate_resolution.weight_commit_count;
        }
        if !weights.weight_recency.is_finite() || weights.weight_recency < 0.0 {
            tracing::warn!("duplicateResolution.weightRecency is invalid, using default");
            weights.weight_recency = defaults.duplicate_resolution.weight_recency;
        }

        if self.output.max_recommendations == 0 {
            tracing::warn!("output.maxRecommendations must be positive, using default");
            self.output.max_recommendations = defaults.output.max_recommendations;
        }

        self
    }

    /// Long-lived branches that are never cleanup or linking candidates
    pub fn is_protected(&self, branch: &str, base_branch: &str) -> bool {
        branch == base_branch || self.protected_branches.iter().any(|b| b == branch)
    }
}
