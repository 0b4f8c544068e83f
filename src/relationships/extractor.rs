use regex::Regex;
use std::sync::OnceLock;

/// Compiled branch-name patterns, in match priority order
static BRANCH_ISSUE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Get compiled patterns for matching issue references in branch names.
///
/// Order matters: the explicit `issue-<n>` convention beats a bare `#<n>`
/// anywhere in the name, which would otherwise catch version-like segments.
fn branch_issue_patterns() -> &'static Vec<Regex> {
    BRANCH_ISSUE_PATTERNS.get_or_init(|| {
        let patterns = [
            r"(?i)issue[-\s]([0-9]+)",
            r"(?:feature|bugfix|fix|hotfix)/([0-9]+)-",
            r"(?:feature|bugfix|fix|hotfix)/#([0-9]+)",
            r"\b[A-Z][A-Z0-9]+-([0-9]+)",
            r"#([0-9]+)",
        ];

        patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Map a branch name to the `#<n>` issue id it references, if any.
///
/// The first matching pattern wins.
pub fn extract_issue_ref(branch: &str) -> Option<String> {
    branch_issue_patterns().iter().find_map(|pattern| {
        pattern
            .captures(branch)
            .and_then(|captures| captures.get(1))
            .map(|number| format!("#{}", number.as_str()))
    })
}
