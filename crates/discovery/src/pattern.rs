use globset::{GlobBuilder, GlobMatcher};

use crate::{DiscoveryError, Result};

const WILDCARD_CHARS: [char; 3] = ['*', '?', '['];

/// Returns true when `value` contains glob wildcard characters.
///
/// ```
/// use snipx_discovery::has_wildcard;
///
/// assert!(has_wildcard("deploy-*"));
/// assert!(has_wildcard("v?"));
/// assert!(!has_wildcard("deploy"));
/// ```
pub fn has_wildcard(value: &str) -> bool {
    value.chars().any(|c| WILDCARD_CHARS.contains(&c))
}

/// A case-insensitive name pattern.
///
/// Literal patterns are compared directly so that characters such as `{`
/// in an exact name never take on glob meaning.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    matcher: Option<GlobMatcher>,
}

impl Pattern {
    /// Compiles `raw`, failing with a validation error if the glob is malformed.
    pub fn new(raw: &str) -> Result<Self> {
        let matcher = if has_wildcard(raw) {
            let glob = GlobBuilder::new(&escape_braces(raw))
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    DiscoveryError::Validation(format!("Invalid wildcard pattern \"{raw}\": {e}"))
                })?;
            Some(glob.compile_matcher())
        } else {
            None
        };
        Ok(Self {
            raw: raw.to_string(),
            matcher,
        })
    }

    /// The pattern text as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches a single path component (file or directory name).
    pub fn is_match(&self, candidate: &str) -> bool {
        match &self.matcher {
            Some(glob) => glob.is_match(candidate),
            None => eq_ignore_case(&self.raw, candidate),
        }
    }
}

/// Braces are literal in host wildcards; globset would read them as
/// alternation.
fn escape_braces(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '{' => out.push_str("[{]"),
            '}' => out.push_str("[}]"),
            _ => out.push(c),
        }
    }
    out
}

/// Unicode-aware case-insensitive equality.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_patterns_ignore_case() {
        let p = Pattern::new("Deploy.sh").unwrap();
        assert!(p.is_match("deploy.SH"));
        assert!(!p.is_match("deploy.sh.bak"));
    }

    #[test]
    fn wildcard_patterns_match_components() {
        let p = Pattern::new("dep*.sh").unwrap();
        assert!(p.is_match("DEPLOY.sh"));
        assert!(p.is_match("dep.sh"));
        assert!(!p.is_match("redeploy.sh"));

        let q = Pattern::new("v[12].?").unwrap();
        assert!(q.is_match("v1.x"));
        assert!(!q.is_match("v3.x"));
    }

    #[test]
    fn literal_braces_are_not_alternation() {
        let p = Pattern::new("{a,b}.sh").unwrap();
        assert!(p.is_match("{a,b}.sh"));
        assert!(!p.is_match("a.sh"));
    }

    #[test]
    fn braces_stay_literal_in_wildcard_patterns() {
        let p = Pattern::new("a*{b").unwrap();
        assert!(p.is_match("ax{b"));
        assert!(!p.is_match("axb"));

        let q = Pattern::new("{x,y}*.sh").unwrap();
        assert!(q.is_match("{x,y}-deploy.sh"));
        assert!(!q.is_match("x-deploy.sh"));
    }

    #[test]
    fn malformed_glob_is_a_validation_error() {
        let err = Pattern::new("[abc").unwrap_err();
        assert!(matches!(err, DiscoveryError::Validation(_)));
    }

    #[test]
    fn non_ascii_names_compare_case_insensitively() {
        assert!(eq_ignore_case("Ärger", "ärger"));
        assert!(!eq_ignore_case("Ärger", "Arger"));
    }
}
