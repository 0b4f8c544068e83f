use crate::priority::Priority;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    #[serde(alias = "OPEN", alias = "Open")]
    Open,
    #[serde(alias = "CLOSED", alias = "Closed")]
    Closed,
}

/// An issue as supplied by the tracker collaborator.
///
/// Every field is optional on the wire so a single malformed record can be
/// skipped instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default, deserialize_with = "deserialize_issue_id", alias = "number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub state: IssueState,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub priority: Priority,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn new(id: &str, title: &str, state: IssueState, priority: Priority) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            state,
            priority,
            labels: BTreeSet::new(),
            assignee: None,
            created_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    /// Canonical `#<n>` form of the id, or `None` for a malformed record
    pub fn canonical_id(&self) -> Option<String> {
        normalize_issue_id(&self.id)
    }

    /// Explicit priority, falling back to priority labels when unset
    pub fn effective_priority(&self) -> Priority {
        if self.priority != Priority::Normal {
            return self.priority;
        }
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        Priority::from_labels(&labels)
    }
}

/// Normalize `42`, `#42` or ` #42 ` to `#42`. Anything else is not an id.
pub fn normalize_issue_id(raw: &str) -> Option<String> {
    let digits = raw.trim().trim_start_matches('#');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("#{digits}"))
}

fn deserialize_issue_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(n)) => format!("#{n}"),
        Some(RawId::Text(s)) => s,
        None => String::new(),
    })
}

/// Decode a closed enum field, falling back to its default on null or an
/// unknown value. Matching is case-insensitive.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None => T::default(),
        Some(Value::String(s)) => T::deserialize(Value::String(s.to_ascii_lowercase())).unwrap_or_else(|_| {
            tracing::warn!(value = %s, "Unknown issue field value, using default");
            T::default()
        }),
        Some(other) => {
            tracing::warn!(value = %other, "Unexpected issue field value, using default");
            T::default()
        }
    })
}

/// Parse a JSON array of issues record by record.
///
/// Records that still fail to decode are skipped with a warning; only a
/// document that is not an array is an error.
pub fn parse_issues(raw: &str) -> Result<Vec<Issue>, serde_json::Error> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| match Issue::deserialize(record) {
            Ok(issue) => Some(issue),
            Err(e) => {
                tracing::warn!(position, error = %e, "Skipping malformed issue record");
                None
            }
        })
        .collect())
}

/// Lookup table over the valid issues of one analysis run.
///
/// Preserves input order for iteration; records with an unusable id are
/// dropped here so downstream code never sees them.
#[derive(Debug, Default)]
pub struct IssueIndex<'a> {
    ordered: Vec<(String, &'a Issue)>,
    by_id: HashMap<String, usize>,
}

impl<'a> IssueIndex<'a> {
    pub fn new(issues: &'a [Issue]) -> Self {
        let mut index = Self::default();
        for issue in issues {
            let Some(id) = issue.canonical_id() else {
                tracing::warn!(raw_id = %issue.id, title = %issue.title, "Skipping issue with malformed id");
                continue;
            };
            if index.by_id.contains_key(&id) {
                tracing::debug!(issue = %id, "Ignoring duplicate issue record");
                continue;
            }
            index.by_id.insert(id.clone(), index.ordered.len());
            index.ordered.push((id, issue));
        }
        index
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&'a Issue> {
        self.by_id.get(id).map(|&i| self.ordered[i].1)
    }

    /// Valid issues in input order, paired with their canonical ids
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a Issue)> + '_ {
        self.ordered.iter().map(|(id, issue)| (id.as_str(), *issue))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
