//! Recommendation engine
//!
//! Maps pattern findings to concrete shell commands, ranks them and renders
//! the text report.

pub mod engine;
pub mod format;
pub mod types;

pub use engine::{rank_recommendations, shell_quote, RecommendationEngine};
pub use format::format_recommendations;
pub use types::{Recommendation, RecommendationBatch, RecommendationType};
