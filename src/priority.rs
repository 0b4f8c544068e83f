use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority levels for tracker issues on an ordinal scale.
/// Higher values = more urgent work
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// No priority set (0)
    #[default]
    #[serde(alias = "none")]
    Normal = 0,
    /// priority:low (1)
    Low = 1,
    /// priority:medium (2)
    Medium = 2,
    /// priority:high (3)
    High = 3,
    /// priority:critical (4)
    Critical = 4,
}

impl Priority {
    /// Determine priority from issue labels.
    ///
    /// Recognizes `priority:<level>`, `priority-<level>` and the `P0`..`P3`
    /// shorthand. The highest matching label wins.
    pub fn from_labels(labels: &[impl AsRef<str>]) -> Self {
        let mut highest_priority = Priority::Normal;

        for label in labels {
            let label = label.as_ref().trim().to_ascii_lowercase();
            let level = label
                .strip_prefix("priority:")
                .or_else(|| label.strip_prefix("priority-"))
                .unwrap_or(&label);

            let priority = match level.trim() {
                "critical" | "p0" => Priority::Critical,
                "high" | "p1" => Priority::High,
                "medium" | "p2" => Priority::Medium,
                "low" | "p3" => Priority::Low,
                _ => continue,
            };

            if priority > highest_priority {
                highest_priority = priority;
            }
        }

        highest_priority
    }

    /// Get the ordinal level used for priority-gap comparisons
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_from_labels() {
        assert_eq!(Priority::from_labels(&["priority:critical"]), Priority::Critical);
        assert_eq!(Priority::from_labels(&["priority-high"]), Priority::High);
        assert_eq!(Priority::from_labels(&["Priority:Medium"]), Priority::Medium);
        assert_eq!(Priority::from_labels(&["P3"]), Priority::Low);

        // Unrelated labels leave the issue at normal priority
        assert_eq!(Priority::from_labels(&["bug", "ui"]), Priority::Normal);
        assert_eq!(Priority::from_labels(&[] as &[&str]), Priority::Normal);

        // Highest label wins
        assert_eq!(
            Priority::from_labels(&["priority:low", "P0", "priority-medium"]),
            Priority::Critical
        );
    }

    #[test]
    fn test_priority_levels() {
        assert_eq!(Priority::Normal.level(), 0);
        assert_eq!(Priority::Low.level(), 1);
        assert_eq!(Priority::Medium.level(), 2);
        assert_eq!(Priority::High.level(), 3);
        assert_eq!(Priority::Critical.level(), 4);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert!(Priority::Low > Priority::Normal);
    }

    #[test]
    fn test_priority_deserialize() {
        let parsed: Priority = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Priority::Critical);
        let parsed: Priority = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, Priority::Normal);
        assert_eq!(Priority::High.to_string(), "HIGH");
    }
}
