use crate::config::DuplicateResolutionConfig;
use crate::git::BranchMetrics;
use crate::severity::Severity;
use serde::Serialize;
use std::collections::BTreeMap;

/// Commit count above which an unmerged duplicate carries real work
const SUBSTANTIAL_COMMITS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredBranch {
    pub branch: String,
    pub score: f64,
    pub commit_count: u32,
    pub days_since_last_commit: Option<u64>,
}

/// Which branch of a duplicate group to keep and which to fold into it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResolution {
    pub issue: String,
    pub primary: ScoredBranch,
    /// Everything except the primary, in group order
    pub merge_candidates: Vec<ScoredBranch>,
    pub severity: Severity,
}

/// `commits × weightCommit × 10 + max(0, 100 − idle days) × weightRecency`
pub fn duplicate_score(metrics: &BranchMetrics, weights: &DuplicateResolutionConfig) -> f64 {
    let recency = 100u64.saturating_sub(metrics.idle_days()) as f64;
    f64::from(metrics.commit_count) * weights.weight_commit_count * 10.0 + recency * weights.weight_recency
}

/// Pick a primary branch for one group. Ties go to the earlier branch.
pub fn resolve_group(
    issue: &str,
    group: &[String],
    metrics: &BTreeMap<String, BranchMetrics>,
    weights: &DuplicateResolutionConfig,
) -> Option<DuplicateResolution> {
    let mut scored: Vec<ScoredBranch> = group
        .iter()
        .map(|branch| {
            let fallback;
            let branch_metrics = match metrics.get(branch) {
                Some(m) => m,
                None => {
                    fallback = BranchMetrics::unknown(branch);
                    &fallback
                }
            };
            ScoredBranch {
                branch: branch.clone(),
                score: duplicate_score(branch_metrics, weights),
                commit_count: branch_metrics.commit_count,
                days_since_last_commit: branch_metrics.days_since_last_commit,
            }
        })
        .collect();

    if scored.len() < 2 {
        return None;
    }

    // Strictly greater keeps the earliest branch on ties
    let mut primary_index = 0;
    for (i, candidate) in scored.iter().enumerate().skip(1) {
        if candidate.score > scored[primary_index].score {
            primary_index = i;
        }
    }

    let primary = scored.remove(primary_index);
    let severity = if scored.iter().any(|c| c.commit_count > SUBSTANTIAL_COMMITS) {
        Severity::High
    } else {
        Severity::Medium
    };

    Some(DuplicateResolution {
        issue: issue.to_string(),
        primary,
        merge_candidates: scored,
        severity,
    })
}

/// Resolve every duplicate group, ordered by issue id
pub fn resolve_duplicates(
    duplicates: &BTreeMap<String, Vec<String>>,
    metrics: &BTreeMap<String, BranchMetrics>,
    weights: &DuplicateResolutionConfig,
) -> Vec<DuplicateResolution> {
    duplicates
        .iter()
        .filter_map(|(issue, group)| resolve_group(issue, group, metrics, weights))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(name: &str, commits: u32, idle: u64) -> (String, BranchMetrics) {
        let mut metrics = BranchMetrics::unknown(name);
        metrics.commit_count = commits;
        metrics.days_since_last_commit = Some(idle);
        (name.to_string(), metrics)
    }

    fn group(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_formula() {
        let weights = DuplicateResolutionConfig::default();
        let (_, m) = branch("a", 4, 10);
        // 4 * 0.7 * 10 + 90 * 0.3
        assert!((duplicate_score(&m, &weights) - 55.0).abs() < 1e-9);

        let (_, old) = branch("b", 0, 250);
        assert_eq!(duplicate_score(&old, &weights), 0.0);

        let unknown = BranchMetrics::unknown("c");
        assert_eq!(duplicate_score(&unknown, &weights), 0.0);
    }

    #[test]
    fn test_highest_score_is_primary() {
        let metrics: BTreeMap<_, _> = [
            branch("feature/issue-42-login", 2, 1),
            branch("bugfix/42-login-fix", 8, 3),
        ]
        .into_iter()
        .collect();
        let g = group(&["feature/issue-42-login", "bugfix/42-login-fix"]);

        let resolution =
            resolve_group("#42", &g, &metrics, &DuplicateResolutionConfig::default()).unwrap();
        assert_eq!(resolution.primary.branch, "bugfix/42-login-fix");
        assert_eq!(resolution.merge_candidates.len(), 1);
        assert_eq!(resolution.merge_candidates[0].branch, "feature/issue-42-login");
        assert_eq!(resolution.severity, Severity::Medium);
    }

    #[test]
    fn test_tie_goes_to_earlier_branch() {
        let metrics: BTreeMap<_, _> = [branch("zeta", 3, 5), branch("alpha", 3, 5)]
            .into_iter()
            .collect();

        let resolution = resolve_group(
            "#1",
            &group(&["zeta", "alpha"]),
            &metrics,
            &DuplicateResolutionConfig::default(),
        )
        .unwrap();
        assert_eq!(resolution.primary.branch, "zeta");

        let resolution = resolve_group(
            "#1",
            &group(&["alpha", "zeta"]),
            &metrics,
            &DuplicateResolutionConfig::default(),
        )
        .unwrap();
        assert_eq!(resolution.primary.branch, "alpha");
    }

    #[test]
    fn test_substantial_candidate_raises_severity() {
        let metrics: BTreeMap<_, _> = [branch("a", 20, 0), branch("b", 6, 40), branch("c", 1, 2)]
            .into_iter()
            .collect();

        let resolution = resolve_group(
            "#9",
            &group(&["a", "b", "c"]),
            &metrics,
            &DuplicateResolutionConfig::default(),
        )
        .unwrap();
        assert_eq!(resolution.primary.branch, "a");
        let candidates: Vec<&str> = resolution
            .merge_candidates
            .iter()
            .map(|c| c.branch.as_str())
            .collect();
        assert_eq!(candidates, vec!["b", "c"]);
        assert_eq!(resolution.severity, Severity::High);
    }

    #[test]
    fn test_weights_change_primary() {
        let metrics: BTreeMap<_, _> = [branch("busy-old", 10, 90), branch("quiet-new", 1, 0)]
            .into_iter()
            .collect();
        let recency_only = DuplicateResolutionConfig {
            weight_commit_count: 0.0,
            weight_recency: 1.0,
        };

        let resolution =
            resolve_group("#3", &group(&["busy-old", "quiet-new"]), &metrics, &recency_only).unwrap();
        assert_eq!(resolution.primary.branch, "quiet-new");
    }

    #[test]
    fn test_resolve_duplicates_skips_small_groups() {
        let mut duplicates = BTreeMap::new();
        duplicates.insert("#1".to_string(), group(&["x"]));
        duplicates.insert("#2".to_string(), group(&["y", "z"]));

        let resolutions =
            resolve_duplicates(&duplicates, &BTreeMap::new(), &DuplicateResolutionConfig::default());
        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].issue, "#2");
        assert_eq!(resolutions[0].primary.branch, "y");
    }
}
