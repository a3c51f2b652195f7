//! Wildcard matching of entry names.
//!
//! The only metacharacter is `*`, which matches any run of characters
//! (including none). Everything else is literal, so the pieces between stars
//! are escaped before they reach `regex`. Case is ignored using Unicode simple
//! case folding.

use regex::Regex;

/// A compiled, case-insensitive wildcard pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    kind: MatcherKind,
}

#[derive(Debug, Clone)]
enum MatcherKind {
    /// Empty pattern or a pattern made only of `*`.
    Any,
    Regex(Regex),
    /// The translated pattern exceeded the regex size limit.
    Nothing,
}

impl PathMatcher {
    /// Compiles `pattern`. Every string is a valid pattern, so this cannot fail.
    pub fn compile(pattern: &str) -> Self {
        let kind = if pattern.chars().all(|c| c == '*') {
            MatcherKind::Any
        } else {
            match Regex::new(&wildcard_to_regex(pattern)) {
                Ok(regex) => MatcherKind::Regex(regex),
                Err(e) => {
                    tracing::error!("Failed to compile name pattern {:?}: {}", pattern, e);
                    MatcherKind::Nothing
                }
            }
        };

        Self {
            pattern: pattern.to_string(),
            kind,
        }
    }

    /// Tests a single path component (a file or directory name).
    pub fn matches(&self, name: &str) -> bool {
        match &self.kind {
            MatcherKind::Any => true,
            MatcherKind::Regex(regex) => regex.is_match(name),
            MatcherKind::Nothing => false,
        }
    }

    /// The pattern as it was given to [`PathMatcher::compile`].
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Translates a wildcard pattern into an anchored, case-insensitive regex.
/// Runs of `*` collapse into a single `.*`.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?is)^");
    for (i, piece) in pattern.split('*').enumerate() {
        if i > 0 && !out.ends_with(".*") {
            out.push_str(".*");
        }
        out.push_str(&regex::escape(piece));
    }
    out.push('$');
    out
}
