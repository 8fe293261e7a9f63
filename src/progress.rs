//! Progress reporting: the stable human-readable progress string and the
//! de-duplication gate that limits how often the coordinator logs it.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::counters::Counters;

/// Tracks which "report bucket" (a multiple of `report_every`) has already
/// been logged, so the coordinator's producer loop doesn't emit the same
/// progress line on every single dispatch.
#[derive(Debug, Default)]
pub struct ProgressGate {
    last_bucket_logged: AtomicI64,
}

impl ProgressGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `visited` crosses into a new bucket of
    /// size `report_every`; subsequent calls within the same bucket return
    /// `false`.
    pub fn should_report(&self, visited: i64, report_every: u64) -> bool {
        if report_every == 0 {
            return false;
        }
        let bucket = visited / i64::try_from(report_every).unwrap_or(i64::MAX);
        let previous = self.last_bucket_logged.swap(bucket, Ordering::SeqCst);
        bucket != previous
    }
}

/// Render the stable progress string:
/// `"<actually_visited> crawled. <left_to_crawl> left to crawl.
/// <links_scheduled> scheduled for download. <pages_scheduled> scheduled
/// for processing. <pct>% complete."`
#[must_use]
pub fn format_progress(counters: &Counters, frontier_len: usize, thread_limit: usize) -> String {
    let actually_visited = counters.actually_visited();
    let links_scheduled = counters.links_scheduled();
    let pages_scheduled = counters.pages_scheduled();
    let visited_counter = counters.visited_counter();

    // `left_to_crawl` can go negative near completion; this is a cosmetic
    // reporting artifact of the formula, not a scheduling signal.
    let left_to_crawl = frontier_len as i64 + links_scheduled - thread_limit as i64;

    let denom = visited_counter + left_to_crawl.max(0);
    let pct = if denom > 0 {
        (visited_counter as f64 / denom as f64 * 10000.0).round() / 100.0
    } else {
        100.0
    };

    format!(
        "{actually_visited} crawled. {left_to_crawl} left to crawl. \
         {links_scheduled} scheduled for download. {pages_scheduled} scheduled for processing. \
         {pct}% complete."
    )
}
