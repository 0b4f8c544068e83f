//! Issue tracker data model
//!
//! Issues arrive already fetched by the caller. This module only normalizes
//! and indexes them; it never talks to a tracker API.

pub mod types;

pub use types::{normalize_issue_id, parse_issues, Issue, IssueIndex, IssueState};
