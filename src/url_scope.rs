//! URL normalization and scope filtering.
//!
//! Mirrors the data model's notion of a "cleaned" URL (host + path only,
//! used as a secondary dedup key) and the `isExcluded` scope predicate that
//! decides whether a discovered URL is eligible for crawling.

use url::Url;

/// Produce the host+path "cleaned" form of a URL, discarding scheme, port,
/// and query. Used so that `http`/`https` variants and query-only variants
/// collapse onto the same visited-set entry.
///
/// Falls back to the raw input (lowercased) if it doesn't parse as a URL,
/// so callers never need to special-case malformed input.
#[must_use]
pub fn clean_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            let path = parsed.path();
            format!("{host}{path}")
        }
        Err(_) => raw.to_string(),
    }
}

/// Promote a relative path to an absolute URL under `base_url`. A URL that
/// already contains a scheme marker (`"://"`) is returned unchanged.
#[must_use]
pub fn prepend_base_url_if_needed(candidate: &str, base_url: &str) -> String {
    if candidate.contains("://") {
        return candidate.to_string();
    }
    if candidate.starts_with('/') {
        format!("{base_url}{candidate}")
    } else {
        format!("{base_url}/{candidate}")
    }
}

/// The scope/blocklist configuration that decides whether a given URL is
/// eligible for crawling.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    pub base_url: String,
    pub base_url_secure: Option<String>,
    pub allowed_suffixes: Vec<String>,
    pub blocked_patterns: Vec<String>,
}

impl ScopePolicy {
    /// Default allowed suffixes: a bare trailing slash, or one of the
    /// common server-rendered HTML extensions.
    #[must_use]
    pub fn default_allowed_suffixes() -> Vec<String> {
        vec![
            "/".to_string(),
            ".jsp".to_string(),
            ".htm".to_string(),
            ".html".to_string(),
        ]
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_url_secure: None,
            allowed_suffixes: Self::default_allowed_suffixes(),
            blocked_patterns: Vec::new(),
        }
    }

    /// Path-only portion of `url`, lowercased, with any query string
    /// stripped. Used for suffix matching.
    fn path_only_lowercase(url: &str) -> String {
        url.split('?').next().unwrap_or(url).to_lowercase()
    }

    fn in_base_scope(&self, url: &str) -> bool {
        url.starts_with(self.base_url.as_str())
            || self
                .base_url_secure
                .as_deref()
                .is_some_and(|secure| url.starts_with(secure))
    }

    fn has_allowed_suffix(&self, url: &str) -> bool {
        let path = Self::path_only_lowercase(url);
        self.allowed_suffixes
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }

    fn is_blocked(&self, url: &str) -> bool {
        self.blocked_patterns
            .iter()
            .any(|pattern| url.contains(pattern.as_str()))
    }

    /// True iff `url` should be excluded from the crawl: out of the base
    /// scope, missing an allowed suffix, already visited (raw or cleaned
    /// form), or matching a blocked pattern. `visited` and `visited_cleaned`
    /// are checked by the caller via [`ScopePolicy::is_excluded`] passing
    /// membership predicates so this type stays free of any particular set
    /// implementation.
    #[must_use]
    pub fn is_excluded(
        &self,
        url: &str,
        already_visited: bool,
        cleaned_already_visited: bool,
    ) -> bool {
        !self.in_base_scope(url)
            || !self.has_allowed_suffix(url)
            || already_visited
            || cleaned_already_visited
            || self.is_blocked(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_url_drops_scheme_port_and_query() {
        assert_eq!(clean_url("http://h:80/p?x=1"), "h/p");
        assert_eq!(clean_url("https://h/p"), "h/p");
    }

    #[test]
    fn clean_url_collapses_scheme_variants() {
        assert_eq!(clean_url("https://example.com/a"), clean_url("http://example.com/a"));
    }

    #[test]
    fn prepend_handles_relative_and_absolute() {
        assert_eq!(prepend_base_url_if_needed("foo", "http://site"), "http://site/foo");
        assert_eq!(prepend_base_url_if_needed("/foo", "http://site"), "http://site/foo");
        assert_eq!(
            prepend_base_url_if_needed("http://x/y", "http://site"),
            "http://x/y"
        );
    }

    #[test]
    fn scope_respects_allowed_suffix() {
        let policy = ScopePolicy::new("http://site");
        assert!(!policy.is_excluded("http://site/page.html", false, false));
        assert!(policy.is_excluded("http://site/page.png", false, false));
    }

    #[test]
    fn scope_excludes_out_of_base_urls() {
        let policy = ScopePolicy::new("http://site");
        assert!(policy.is_excluded("http://other/page.html", false, false));
    }

    #[test]
    fn scope_excludes_blocked_patterns() {
        let mut policy = ScopePolicy::new("http://site");
        policy.blocked_patterns.push("/b".to_string());
        assert!(policy.is_excluded("http://site/b.html", false, false));
        assert!(!policy.is_excluded("http://site/a.html", false, false));
    }

    #[test]
    fn scope_excludes_already_visited() {
        let policy = ScopePolicy::new("http://site");
        assert!(policy.is_excluded("http://site/a.html", true, false));
        assert!(policy.is_excluded("http://site/a.html", false, true));
    }

    #[test]
    fn is_excluded_is_idempotent() {
        let policy = ScopePolicy::new("http://site");
        let url = "http://site/a.html";
        assert_eq!(
            policy.is_excluded(url, false, false),
            policy.is_excluded(url, false, false)
        );
    }
}
