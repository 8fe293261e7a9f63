//! Concurrent deduplication structures: the visited set and the scheduled
//! (in-frontier) set, plus the blocklist.
//!
//! Grounded on the per-domain `DashMap` idiom used for concurrency limiting
//! in the source crate; here a `DashSet` (a `DashMap<K, ()>` in spirit) is
//! used since only membership, not a value, is needed.

use dashmap::DashSet;

/// Tracks URLs already dispatched to the fetch stage, keyed on both the raw
/// URL and its cleaned (host+path) form.
#[derive(Debug, Default)]
pub struct VisitedSet {
    raw: DashSet<String>,
    cleaned: DashSet<String>,
}

impl VisitedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains_raw(&self, url: &str) -> bool {
        self.raw.contains(url)
    }

    #[must_use]
    pub fn contains_cleaned(&self, cleaned: &str) -> bool {
        self.cleaned.contains(cleaned)
    }

    /// Record a dispatch: inserts both the raw URL and its cleaned form.
    pub fn mark_visited(&self, url: &str, cleaned: &str) {
        self.raw.insert(url.to_string());
        self.cleaned.insert(cleaned.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn clear(&self) {
        self.raw.clear();
        self.cleaned.clear();
    }
}

/// Tracks URLs currently sitting in the frontier (submitted but not yet
/// dispatched), so the parse-completion consumer can avoid enqueuing a
/// duplicate that is already waiting its turn.
#[derive(Debug, Default)]
pub struct ScheduledSet {
    inner: DashSet<String>,
}

impl ScheduledSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.inner.contains(url)
    }

    pub fn insert(&self, url: &str) {
        self.inner.insert(url.to_string());
    }

    pub fn remove(&self, url: &str) {
        self.inner.remove(url);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visited_set_tracks_both_keys() {
        let set = VisitedSet::new();
        set.mark_visited("http://a/x", "a/x");
        assert!(set.contains_raw("http://a/x"));
        assert!(set.contains_cleaned("a/x"));
        assert!(!set.contains_raw("http://a/y"));
    }

    #[test]
    fn scheduled_set_insert_remove() {
        let set = ScheduledSet::new();
        set.insert("http://a/x");
        assert!(set.contains("http://a/x"));
        set.remove("http://a/x");
        assert!(!set.contains("http://a/x"));
    }
}
