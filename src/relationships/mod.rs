//! Branch to issue relationship analysis
//!
//! Resolves issue references from branch names, combines them with the
//! persisted memory map and classifies every branch for one run.

pub mod analyzer;
pub mod extractor;
pub mod types;

pub use analyzer::{analyze, find_unassigned_issues, unaddressed_issues, Classification, RelationshipAnalyzer};
pub use extractor::extract_issue_ref;
pub use types::{
    BranchIssueLink, BranchMemory, LinkSource, MemoryEntry, OrphanedBranch, RelationshipReport,
};
