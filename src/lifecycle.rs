//! The crawler lifecycle state machine and the flags the coordinator polls.
//!
//! Grounded on the idempotent `AtomicBool` shutdown-flag pattern used for
//! event bus teardown in the source crate, generalized to the fuller
//! `configured -> running -> draining -> stopped` machine with soft/hard
//! pause.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Lifecycle states a [`crate::WebCrawler`] can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerState {
    Configured,
    Running,
    Draining,
    Stopped,
}

/// The flags every crawler thread polls at its 5-second wait boundary.
///
/// `force_pause` stops the coordinator from dispatching new work without
/// tearing down the pools (soft pause); `stop` is the hard shutdown signal
/// that every suspension point checks.
#[derive(Debug, Default)]
pub struct LifecycleFlags {
    force_pause: AtomicBool,
    stop: AtomicBool,
    rebuild_requested: AtomicBool,
    state: Mutex<Option<CrawlerState>>,
}

impl LifecycleFlags {
    #[must_use]
    pub fn new() -> Self {
        Self {
            force_pause: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            rebuild_requested: AtomicBool::new(false),
            state: Mutex::new(Some(CrawlerState::Configured)),
        }
    }

    #[must_use]
    pub fn state(&self) -> CrawlerState {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .unwrap_or(CrawlerState::Configured)
    }

    pub fn set_state(&self, state: CrawlerState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(state);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.force_pause.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.force_pause.store(true, Ordering::SeqCst);
        log::info!(target: "sitecrawl::lifecycle", "crawl paused");
    }

    pub fn unpause(&self) {
        self.force_pause.store(false, Ordering::SeqCst);
        log::info!(target: "sitecrawl::lifecycle", "crawl unpaused");
    }

    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Idempotent: calling this more than once has no further effect.
    pub fn request_stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            log::info!(target: "sitecrawl::lifecycle", "shutdown requested");
        }
    }

    /// Clears the stop flag so a stopped crawler can be restarted
    /// (`hard_unpause`/`reset`).
    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }

    /// Requests that the in-flight `navigate()` call drain and tear down
    /// its worker pools, then rebuild them and keep crawling instead of
    /// returning. The blocked `navigate()` call itself is the only thing
    /// that clears `stop` afterwards (via [`Self::take_rebuild_request`]),
    /// so there is no window where a second thread can clear `stop` before
    /// the crawl has actually observed it and torn down.
    pub fn request_rebuild(&self) {
        self.rebuild_requested.store(true, Ordering::SeqCst);
        self.request_stop();
        log::info!(target: "sitecrawl::lifecycle", "pool rebuild requested");
    }

    /// Consumes a pending rebuild request. Returns `true` at most once per
    /// `request_rebuild()` call.
    #[must_use]
    pub fn take_rebuild_request(&self) -> bool {
        self.rebuild_requested.swap(false, Ordering::SeqCst)
    }
}
