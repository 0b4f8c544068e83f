//! Git metrics collection
//!
//! This module provides a trait-based interface over local branch history,
//! backed by libgit2, and the collector that turns it into per-branch
//! activity metrics. Nothing here mutates the repository.

pub mod metrics;
pub mod operations;

pub use metrics::{BranchMetrics, MetricField, MetricsCollector};
pub use operations::{BranchHistory, DiffStats, Git2History, MetricsError};
