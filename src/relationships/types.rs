use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A persisted, human-confirmed branch link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    #[serde(default)]
    pub issue: String,
    #[serde(default, alias = "linked_at")]
    pub linked_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "auto_detected")]
    pub auto_detected: bool,
}

impl MemoryEntry {
    pub fn new(issue: &str) -> Self {
        Self {
            issue: issue.to_string(),
            linked_at: None,
            auto_detected: false,
        }
    }
}

/// Branch name -> confirmed link. Read-only during analysis.
pub type BranchMemory = BTreeMap<String, MemoryEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    /// Present in the persisted memory map
    Verified,
    /// Inferred from the branch name only
    Detected,
}

impl LinkSource {
    /// How much the link can be trusted, in `0.0..=1.0`
    pub fn confidence(self) -> f64 {
        match self {
            LinkSource::Verified => 1.0,
            LinkSource::Detected => 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchIssueLink {
    pub branch: String,
    pub issue: String,
    pub source: LinkSource,
}

/// A branch whose name points at an issue that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedBranch {
    pub branch: String,
    pub referenced_issue: String,
}

/// Point-in-time classification of every branch.
///
/// Each branch lands in exactly one of `verified`, `detected`, `unlinked`
/// or `orphaned`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipReport {
    pub verified: Vec<BranchIssueLink>,
    pub detected: Vec<BranchIssueLink>,
    pub unlinked: Vec<String>,
    pub orphaned: Vec<OrphanedBranch>,
    /// Issue id -> branches linked to it, only for groups of two or more.
    /// Branches keep their input order.
    pub duplicates: BTreeMap<String, Vec<String>>,
}

impl RelationshipReport {
    /// Verified or detected link for a branch
    pub fn link_for(&self, branch: &str) -> Option<&BranchIssueLink> {
        self.verified
            .iter()
            .chain(self.detected.iter())
            .find(|link| link.branch == branch)
    }

    pub fn is_unlinked(&self, branch: &str) -> bool {
        self.unlinked.iter().any(|b| b == branch)
    }

    /// Issue ids some branch is actively addressing
    pub fn linked_issue_ids(&self) -> HashSet<&str> {
        self.verified
            .iter()
            .chain(self.detected.iter())
            .map(|link| link.issue.as_str())
            .collect()
    }

    pub fn total_branches(&self) -> usize {
        self.verified.len() + self.detected.len() + self.unlinked.len() + self.orphaned.len()
    }
}
