//! Property tests for the scope filter and URL-cleaning invariants (§8).

use proptest::prelude::*;
use sitecrawl::{clean_url, prepend_base_url_if_needed, ScopePolicy};

proptest! {
    #[test]
    fn is_excluded_is_idempotent(
        host in "[a-z]{3,8}",
        path in "[a-z/]{0,12}",
        suffix in prop::sample::select(vec!["/", ".html", ".htm", ".jsp"]),
    ) {
        let base = format!("http://{host}");
        let url = format!("{base}{path}{suffix}");
        let policy = ScopePolicy::new(base);
        let first = policy.is_excluded(&url, false, false);
        let second = policy.is_excluded(&url, false, false);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn scheme_variants_share_a_cleaned_key(host in "[a-z]{3,8}", path in "[a-z/]{0,12}") {
        let http_url = format!("http://{host}{path}");
        let https_url = format!("https://{host}{path}");
        prop_assert_eq!(clean_url(&http_url), clean_url(&https_url));
    }

    #[test]
    fn cleaned_url_drops_query(host in "[a-z]{3,8}", path in "[a-z/]{0,12}", query in "[a-z=&0-9]{0,10}") {
        let with_query = format!("http://{host}{path}?{query}");
        let without_query = format!("http://{host}{path}");
        prop_assert_eq!(clean_url(&with_query), clean_url(&without_query));
    }

    #[test]
    fn prepend_is_a_no_op_for_absolute_urls(host in "[a-z]{3,8}", path in "[a-z/]{1,12}") {
        let absolute = format!("http://{host}{path}");
        prop_assert_eq!(prepend_base_url_if_needed(&absolute, "http://base"), absolute);
    }

    #[test]
    fn prepend_always_yields_a_single_base_prefix(path in "[a-z]{1,12}") {
        let base = "http://site";
        let joined = prepend_base_url_if_needed(&path, base);
        prop_assert!(joined.starts_with(base));
        prop_assert!(joined.ends_with(&path));
    }

    #[test]
    fn already_visited_url_is_always_excluded(host in "[a-z]{3,8}") {
        let base = format!("http://{host}");
        let url = format!("{base}/");
        let policy = ScopePolicy::new(base);
        prop_assert!(policy.is_excluded(&url, true, false));
        prop_assert!(policy.is_excluded(&url, false, true));
    }
}
