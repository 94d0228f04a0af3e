//! Path rewriting applied before a request is forwarded.

/// Remove `strip_prefix` from `path` and put `replacement` in its place.
///
/// The result always starts with `/`; an empty remainder becomes the root.
/// A path that does not start with `strip_prefix` keeps its full text.
pub fn rewrite_path(path: &str, strip_prefix: &str, replacement: Option<&str>) -> String {
    let rest = path.strip_prefix(strip_prefix).unwrap_or(path);
    let root = replacement.map(|r| r.trim_end_matches('/')).unwrap_or("");

    let mut rewritten = String::with_capacity(root.len() + rest.len() + 1);
    rewritten.push_str(root);
    if !rest.is_empty() && !rest.starts_with('/') {
        rewritten.push('/');
    }
    rewritten.push_str(rest);

    if rewritten.is_empty() {
        rewritten.push('/');
    } else if !rewritten.starts_with('/') {
        rewritten.insert(0, '/');
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix() {
        assert_eq!(rewrite_path("/api/auth/login", "/api/auth", None), "/login");
        assert_eq!(rewrite_path("/api/projects/7/files", "/api/projects", None), "/7/files");
    }

    #[test]
    fn bare_prefix_becomes_root() {
        assert_eq!(rewrite_path("/api/auth", "/api/auth", None), "/");
        assert_eq!(rewrite_path("/api/auth/", "/api/auth", None), "/");
    }

    #[test]
    fn substitutes_replacement_root() {
        assert_eq!(rewrite_path("/api/ai/generate", "/api/ai", Some("/api/v1")), "/api/v1/generate");
        assert_eq!(rewrite_path("/api/ai", "/api/ai", Some("/api/v1")), "/api/v1");
        assert_eq!(rewrite_path("/api/ai/x", "/api/ai", Some("/api/v1/")), "/api/v1/x");
    }

    #[test]
    fn unrelated_strip_prefix_keeps_path() {
        assert_eq!(rewrite_path("/api/auth/me", "/other", None), "/api/auth/me");
        assert_eq!(rewrite_path("/api/auth/me", "/other", Some("/v2")), "/v2/api/auth/me");
    }

    #[test]
    fn partial_segment_strip_keeps_leading_slash() {
        assert_eq!(rewrite_path("/api/authx", "/api/auth", None), "/x");
        assert_eq!(rewrite_path("/api/authx", "/api/auth", Some("/v1")), "/v1/x");
    }
}
