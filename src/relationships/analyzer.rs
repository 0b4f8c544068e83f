use super::extractor::extract_issue_ref;
use super::types::{BranchIssueLink, BranchMemory, LinkSource, OrphanedBranch, RelationshipReport};
use crate::tracker::{normalize_issue_id, Issue, IssueIndex};
use std::collections::{BTreeMap, HashSet};

/// Where a single branch ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Linked(BranchIssueLink),
    Orphaned(OrphanedBranch),
    Unlinked,
}

/// Links branches to issues using the memory map first and naming second
pub struct RelationshipAnalyzer<'a> {
    index: IssueIndex<'a>,
    memory: &'a BranchMemory,
}

impl<'a> RelationshipAnalyzer<'a> {
    pub fn new(issues: &'a [Issue], memory: &'a BranchMemory) -> Self {
        Self {
            index: IssueIndex::new(issues),
            memory,
        }
    }

    /// Valid issues of this run, shared with later stages
    pub fn index(&self) -> &IssueIndex<'a> {
        &self.index
    }

    pub fn classify(&self, branch: &str) -> Classification {
        // A confirmed link always wins over a guess from the name
        if let Some(entry) = self.memory.get(branch) {
            match normalize_issue_id(&entry.issue) {
                Some(issue) => {
                    return Classification::Linked(BranchIssueLink {
                        branch: branch.to_string(),
                        issue,
                        source: LinkSource::Verified,
                    })
                }
                None => tracing::warn!(branch, issue = %entry.issue, "Ignoring memory entry with malformed issue id"),
            }
        }

        match extract_issue_ref(branch) {
            Some(issue) if self.index.contains(&issue) => Classification::Linked(BranchIssueLink {
                branch: branch.to_string(),
                issue,
                source: LinkSource::Detected,
            }),
            Some(issue) => Classification::Orphaned(OrphanedBranch {
                branch: branch.to_string(),
                referenced_issue: issue,
            }),
            None => Classification::Unlinked,
        }
    }

    pub fn analyze(&self, branches: &[String]) -> RelationshipReport {
        let mut report = RelationshipReport::default();
        let mut seen = HashSet::new();
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for branch in branches {
            if !seen.insert(branch.as_str()) {
                tracing::debug!(branch = %branch, "Skipping repeated branch name");
                continue;
            }

            match self.classify(branch) {
                Classification::Linked(link) => {
                    groups
                        .entry(link.issue.clone())
                        .or_default()
                        .push(link.branch.clone());
                    match link.source {
                        LinkSource::Verified => report.verified.push(link),
                        LinkSource::Detected => report.detected.push(link),
                    }
                }
                Classification::Orphaned(orphan) => report.orphaned.push(orphan),
                Classification::Unlinked => report.unlinked.push(branch.clone()),
            }
        }

        report.duplicates = groups
            .into_iter()
            .filter(|(_, branches)| branches.len() >= 2)
            .collect();

        tracing::info!(
            verified = report.verified.len(),
            detected = report.detected.len(),
            unlinked = report.unlinked.len(),
            orphaned = report.orphaned.len(),
            duplicate_groups = report.duplicates.len(),
            "Branch relationships analyzed"
        );

        report
    }

    /// Open issues no verified or detected branch is addressing, in input order
    pub fn unassigned_issues(&self, report: &RelationshipReport) -> Vec<&'a Issue> {
        unaddressed_issues(&self.index, report)
    }
}

/// Open issues in `index` that no linked branch addresses, in input order
pub fn unaddressed_issues<'a>(index: &IssueIndex<'a>, report: &RelationshipReport) -> Vec<&'a Issue> {
    let linked = report.linked_issue_ids();
    index
        .iter()
        .filter(|(id, issue)| issue.is_open() && !linked.contains(id))
        .map(|(_, issue)| issue)
        .collect()
}

/// Classify every branch against the issue list and memory map
pub fn analyze(branches: &[String], issues: &[Issue], memory: &BranchMemory) -> RelationshipReport {
    RelationshipAnalyzer::new(issues, memory).analyze(branches)
}

/// Open issues with no branch actively addressing them
pub fn find_unassigned_issues<'a>(issues: &'a [Issue], report: &RelationshipReport) -> Vec<&'a Issue> {
    unaddressed_issues(&IssueIndex::new(issues), report)
}
