use super::types::Recommendation;
use crate::severity::Severity;
use std::fmt::Write;

/// Render recommendations as a plain-text report grouped by severity tier.
///
/// Numbering follows the ranked order across tiers, so item `3.` is always
/// the third recommendation in the batch.
pub fn format_recommendations(recommendations: &[Recommendation], suppressed: usize) -> String {
    if recommendations.is_empty() {
        return "✅ No recommendations: branches and issues are in sync\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "📋 Branch recommendations ({})", recommendations.len());

    for severity in Severity::ALL {
        let tier: Vec<(usize, &Recommendation)> = recommendations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.severity == severity)
            .collect();
        if tier.is_empty() {
            continue;
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{} {} ({})", severity.icon(), severity, tier.len());
        for (position, rec) in tier {
            let _ = writeln!(out, "  {}. [{}] {}", position + 1, rec.kind, rec.message);
            let _ = writeln!(out, "     → {}", rec.command);
            if let Some(alternative) = &rec.alternative {
                let _ = writeln!(out, "     ↳ {}", alternative);
            }
        }
    }

    if suppressed > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "… {} more recommendation(s) hidden by output.maxRecommendations",
            suppressed
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::types::RecommendationType;

    fn rec(kind: RecommendationType, severity: Severity, command: &str) -> Recommendation {
        Recommendation::new(kind, severity, format!("{kind} finding"), command.to_string())
    }

    #[test]
    fn test_empty_report() {
        assert!(format_recommendations(&[], 0).starts_with("✅ No recommendations"));
    }

    #[test]
    fn test_groups_by_severity_with_numbering() {
        let recs = vec![
            rec(RecommendationType::PriorityMismatch, Severity::Critical, "git stash"),
            rec(RecommendationType::UnlinkedCurrent, Severity::High, "gh issue create --title wip --body x")
                .with_alternative("git branch -m wip issue-1-wip".to_string()),
            rec(RecommendationType::StaleBranch, Severity::Critical, "git branch -D old"),
        ];
        let text = format_recommendations(&recs, 2);

        let critical = text.find("CRITICAL (2)").unwrap();
        let high = text.find("HIGH (1)").unwrap();
        assert!(critical < high);
        assert!(text.contains("  1. [PRIORITY_MISMATCH]"));
        assert!(text.contains("  3. [STALE_BRANCH]"));
        assert!(text.contains("     → git branch -D old"));
        assert!(text.contains("     ↳ git branch -m wip issue-1-wip"));
        assert!(text.contains("2 more recommendation(s) hidden"));
        assert!(!text.contains("MEDIUM"));
    }
}
