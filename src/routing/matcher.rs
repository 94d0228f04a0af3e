//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix on a segment boundary (case-sensitive)
//! - Report match specificity so the table can prefer longer prefixes
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api` matches `/api` and `/api/...` but never `/apikeys`
//! - No regex to guarantee O(n) matching

/// Matches the request path against a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Longer prefixes are more specific.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }

    /// Returns true if `path` equals the prefix or continues it with `/`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}
