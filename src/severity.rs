use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency tier shared by findings and recommendations.
/// Declaration order = display order (most urgent first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Critical => "🚨",
            Severity::High => "⚠️ ",
            Severity::Medium => "📋",
            Severity::Low => "💡",
            Severity::Info => "ℹ️ ",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::Low < Severity::Info);
        let mut tiers = vec![Severity::Info, Severity::Critical, Severity::Medium];
        tiers.sort();
        assert_eq!(tiers, vec![Severity::Critical, Severity::Medium, Severity::Info]);
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
    }
}
