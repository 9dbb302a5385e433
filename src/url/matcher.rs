/// Checks if a host matches a host-alias pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact: "cdn.example.com" matches only "cdn.example.com"
/// 2. Wildcard: "*.example.com" matches "example.com" and every subdomain of it
///
/// Both sides are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use site_crawler::url::matches_wildcard;
///
/// assert!(matches_wildcard("cdn.example.com", "cdn.example.com"));
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "img.cdn.example.com"));
/// assert!(!matches_wildcard("*.example.com", "notexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_alias() {
        assert!(matches_wildcard("localhost", "localhost"));
        assert!(matches_wildcard("mirror.example.com", "mirror.example.com"));
        assert!(!matches_wildcard("mirror.example.com", "example.com"));
        assert!(!matches_wildcard("example.com", "mirror.example.com"));
    }

    #[test]
    fn test_wildcard_matches_bare_and_nested() {
        assert!(matches_wildcard("*.example.com", "example.com"));
        assert!(matches_wildcard("*.example.com", "www.example.com"));
        assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_wildcard_rejects_lookalikes() {
        assert!(!matches_wildcard("*.example.com", "myexample.com"));
        assert!(!matches_wildcard("*.example.com", "example.com.evil.net"));
        assert!(!matches_wildcard("*.example.com", "example.org"));
        assert!(!matches_wildcard("*.example.com", ""));
    }

    #[test]
    fn test_ip_address_alias() {
        assert!(matches_wildcard("127.0.0.1", "127.0.0.1"));
        assert!(!matches_wildcard("127.0.0.1", "127.0.0.2"));
    }
}
