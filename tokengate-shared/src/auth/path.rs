/// Skip-path matching
///
/// Decides whether a request path is exempt from authentication. Patterns
/// are tried in order and the first match wins:
///
/// 1. Exact equality
/// 2. Trailing `*` (this covers `/*`): prefix match on the text before it
/// 3. `*` elsewhere: the path must start with the text before the first `*`,
///    end with the text after the last one, and contain every segment in
///    between, in order
///
/// This is a simplified glob, not a regex engine. In rule 3 the middle
/// segments are searched from the end of the prefix and may overlap the
/// suffix, so `/a*b*b` matches `/ab`.
///
/// # Example
///
/// ```
/// use tokengate_shared::auth::path::should_skip_path;
///
/// let patterns = ["/health", "/admin/*"];
/// assert!(should_skip_path("/health", &patterns));
/// assert!(should_skip_path("/admin/users", &patterns));
/// assert!(!should_skip_path("/users", &patterns));
/// ```

/// Checks a path against an ordered pattern list
pub fn should_skip_path<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    patterns
        .iter()
        .any(|pattern| match_path(path, pattern.as_ref()))
}

/// Matches one path against one pattern
pub fn match_path(path: &str, pattern: &str) -> bool {
    if path == pattern {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return path.starts_with(prefix);
    }

    if pattern.contains('*') {
        return match_wildcard(path, pattern);
    }

    false
}

fn match_wildcard(path: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (prefix, rest) = match parts.split_first() {
        Some((prefix, rest)) if !rest.is_empty() => (*prefix, rest),
        _ => return path == pattern,
    };

    if !path.starts_with(prefix) {
        return false;
    }

    let (suffix, middle) = match rest.split_last() {
        Some(split) => split,
        None => return true,
    };

    if !suffix.is_empty() && !path.ends_with(suffix) {
        return false;
    }

    let mut pos = prefix.len();
    for segment in middle.iter().filter(|s| !s.is_empty()) {
        match path[pos..].find(segment) {
            Some(index) => pos += index + segment.len(),
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(match_path("/health", "/health"));
        assert!(!match_path("/healthz", "/health"));
        assert!(!match_path("/", "/health"));
    }

    #[test]
    fn test_trailing_wildcard() {
        assert!(match_path("/admin/users", "/admin/*"));
        assert!(match_path("/admin/", "/admin/*"));
        // `/*` is a prefix match on the text before the asterisk
        assert!(!match_path("/admin", "/admin/*"));
        assert!(match_path("/assets.css", "/assets*"));
        assert!(match_path("/anything", "*"));
    }

    #[test]
    fn test_middle_wildcard() {
        assert!(match_path("/api/v1/users/docs", "/api/*/docs"));
        assert!(match_path("/api/v2/orders/docs", "/api/*/docs"));
        assert!(!match_path("/api/v1/users", "/api/*/docs"));
        assert!(!match_path("/other/v1/docs", "/api/*/docs"));
    }

    #[test]
    fn test_multiple_wildcards() {
        assert!(match_path("/api/v1/public/items.json", "/api/*/public/*.json"));
        assert!(!match_path("/api/v1/private/items.json", "/api/*/public/*.json"));
        assert!(!match_path("/api/v1/public/items.xml", "/api/*/public/*.json"));
    }

    #[test]
    fn test_overlapping_segments() {
        // middle segments are not required to stay clear of the suffix
        assert!(match_path("/ab", "/a*b*b"));
        assert!(match_path("/x/y", "/x*/*/y"));
    }

    #[test]
    fn test_should_skip_path_order() {
        let patterns = vec!["/health".to_string(), "/admin/*".to_string()];
        assert!(should_skip_path("/health", &patterns));
        assert!(should_skip_path("/admin/users", &patterns));
        assert!(!should_skip_path("/users", &patterns));

        let empty: [&str; 0] = [];
        assert!(!should_skip_path("/health", &empty));
    }
}
