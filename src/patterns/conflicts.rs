use crate::priority::Priority;
use crate::severity::Severity;
use crate::tracker::Issue;
use serde::Serialize;

/// An unaddressed issue that outranks what the current branch is working on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityConflict {
    pub current_branch: String,
    pub current_issue: Option<String>,
    pub current_priority: Priority,
    pub issue: String,
    pub issue_title: String,
    pub issue_priority: Priority,
    pub gap: u8,
    pub severity: Severity,
}

/// Compare the current work's priority with every open, branch-less issue.
///
/// `current_issue` is `None` when the current branch is not linked or its
/// issue is unknown; that work then counts as priority level 0. Results are
/// ordered most urgent first, input order within a level.
pub fn detect_priority_conflicts(
    current_branch: &str,
    current_issue: Option<(&str, &Issue)>,
    unassigned: &[&Issue],
    margin: u8,
) -> Vec<PriorityConflict> {
    let current_priority = current_issue
        .map(|(_, issue)| issue.effective_priority())
        .unwrap_or(Priority::Normal);
    let required_gap = margin.max(1);

    let mut conflicts: Vec<PriorityConflict> = unassigned
        .iter()
        .filter_map(|issue| {
            let id = issue.canonical_id()?;
            let issue_priority = issue.effective_priority();
            let gap = issue_priority.level().checked_sub(current_priority.level())?;
            if gap < required_gap {
                return None;
            }

            Some(PriorityConflict {
                current_branch: current_branch.to_string(),
                current_issue: current_issue.map(|(id, _)| id.to_string()),
                current_priority,
                issue: id,
                issue_title: issue.title.clone(),
                issue_priority,
                gap,
                severity: if issue_priority == Priority::Critical {
                    Severity::Critical
                } else {
                    Severity::High
                },
            })
        })
        .collect();

    conflicts.sort_by(|a, b| b.issue_priority.cmp(&a.issue_priority));
    conflicts
}
