//! The public crawler facade: the Control API surface from the external
//! interfaces section, wiring configuration, lifecycle, coordinator, and
//! the fetch/parse stages together.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::action::Action;
use crate::client_pool::{ClientPool, Cookie, ReqwestClientPool};
use crate::config::CrawlerConfig;
use crate::coordinator::Coordinator;
use crate::default_fetcher::DefaultFetcher;
use crate::error::{CrawlError, CrawlResult};
use crate::fetch::Fetcher;
use crate::lifecycle::{CrawlerState, LifecycleFlags};
use crate::progress::format_progress;
use crate::stages::{parse_width_for, FetchStage, ParseStage};

const POOL_SHUTDOWN_GRACE: Duration = Duration::from_secs(120);

/// A crawler instance: one scope, one visited set, one pair of worker
/// pools created fresh on each `navigate()`/`reset()`.
///
/// `navigate()` blocks the calling thread until the crawl reaches
/// quiescence or is interrupted by `shutdown()`/`hard_pause()` called from
/// another thread. The rest of the Control API is safe to call
/// concurrently with a blocked `navigate()` call: configuration lives
/// behind a [`RwLock`] that `navigate()` and the coordinator only hold for
/// the instant they need a field, never for the crawl's duration, and
/// lifecycle methods otherwise only touch the shared [`LifecycleFlags`],
/// which every suspension point polls at its 5-second tick.
pub struct WebCrawler {
    config: RwLock<CrawlerConfig>,
    coordinator: Coordinator,
    flags: LifecycleFlags,
    fetcher: Arc<dyn Fetcher>,
    client_pool: Arc<dyn ClientPool>,
}

impl WebCrawler {
    /// Build a crawler with the default fetcher/client pool (a blocking
    /// `reqwest` client pool paired with a `scraper`-based link extractor).
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        base_url_secure: Option<String>,
        actions: Vec<Arc<dyn Action>>,
    ) -> Self {
        let config = CrawlerConfig::new(base_url, base_url_secure, actions);
        let client_pool: Arc<dyn ClientPool> = Arc::new(ReqwestClientPool::new(config.thread_limit()));
        let fetcher: Arc<dyn Fetcher> = Arc::new(DefaultFetcher::new(client_pool.clone()));
        Self::with_collaborators(config, fetcher, client_pool)
    }

    /// Build a crawler with caller-supplied collaborators, per the Fetcher
    /// and Client pool contracts.
    #[must_use]
    pub fn with_collaborators(
        config: CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        client_pool: Arc<dyn ClientPool>,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            coordinator: Coordinator::new(),
            flags: LifecycleFlags::new(),
            fetcher,
            client_pool,
        }
    }

    fn config_read(&self) -> RwLockReadGuard<'_, CrawlerConfig> {
        self.config.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn config_write(&self) -> RwLockWriteGuard<'_, CrawlerConfig> {
        self.config.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // -- Control API: concurrency limits -------------------------------

    pub fn set_thread_limit(&self, n: usize) -> CrawlResult<()> {
        self.config_write().set_thread_limit(n)?;
        if self.flags.state() == CrawlerState::Running {
            self.reset();
        }
        Ok(())
    }

    #[must_use]
    pub fn get_thread_limit(&self) -> usize {
        self.config_read().thread_limit()
    }

    pub fn set_max_process_waiting(&self, n: u64) -> CrawlResult<()> {
        self.config_write().set_max_process_waiting(n)
    }

    #[must_use]
    pub fn get_max_process_waiting(&self) -> u64 {
        self.config_read().max_process_waiting()
    }

    pub fn set_short_circuit_after(&self, n: u64) {
        self.config_write().set_short_circuit_after(n);
    }

    // -- Control API: scope ---------------------------------------------

    pub fn set_include_path(&self, urls: Vec<String>) {
        self.config_write().set_include_path(urls);
    }

    pub fn set_blocked(&self, patterns: Vec<String>) {
        self.config_write().set_blocked(patterns);
    }

    #[must_use]
    pub fn get_allowed_suffixes(&self) -> Vec<String> {
        self.config_read().allowed_suffixes().to_vec()
    }

    pub fn add_allowed_suffix(&self, suffix: impl Into<String>) {
        self.config_write().allowed_suffixes_mut().push(suffix.into());
    }

    // -- Control API: client policy ---------------------------------------

    pub fn enable_redirects(&self) {
        self.config_write().enable_redirects();
        self.client_pool.enable_redirects();
    }

    pub fn disable_redirects(&self) {
        self.config_write().disable_redirects();
        self.client_pool.disable_redirects();
    }

    pub fn enable_javascript(&self) {
        self.config_write().enable_javascript();
        self.client_pool.enable_javascript();
    }

    pub fn add_cookie(&self, name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) {
        let cookie = Cookie {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
        };
        self.config_write().add_cookie(cookie.clone());
        self.client_pool.add_cookie(cookie);
    }

    pub fn clear_cookies(&self) {
        self.config_write().clear_cookies();
        self.client_pool.clear_cookies();
    }

    pub fn disable_crawling(&self) {
        self.config_write().disable_crawling();
    }

    // -- Control API: lifecycle -------------------------------------------

    pub fn pause(&self) {
        self.flags.pause();
    }

    pub fn unpause(&self) {
        self.flags.unpause();
    }

    /// Pauses, drains both completion consumers to quiescence, and tears
    /// down the worker pools. The currently-blocked `navigate()` call (on
    /// whichever thread invoked it) returns once teardown completes;
    /// visited/frontier/blocked state is retained.
    pub fn hard_pause(&self) {
        self.flags.pause();
        self.flags.request_stop();
    }

    /// Clears the stop signal so a subsequent `navigate()` call rebuilds
    /// the worker pools and resumes from the retained frontier/visited
    /// state.
    pub fn hard_unpause(&self) {
        self.flags.clear_stop();
        self.flags.unpause();
    }

    /// Recreates the worker pools (picking up a new `thread_limit`)
    /// without discarding crawl state.
    ///
    /// Rather than flipping `stop` and immediately clearing it from this
    /// thread — a race the in-flight `navigate()` call's 5-second poll
    /// would usually miss — this requests a rebuild that `navigate()`
    /// itself honors once its current pools have actually drained and
    /// torn down, then resumes the same call with the new `thread_limit`
    /// instead of returning to the caller.
    pub fn reset(&self) {
        self.flags.request_rebuild();
    }

    /// Requests orderly termination: stops dispatch, drains in-flight
    /// work, closes the client pool, and tears down both pools with a
    /// 2-minute grace period.
    pub fn shutdown(&self) {
        self.flags.request_stop();
        self.client_pool.close();
        self.flags.set_state(CrawlerState::Draining);
    }

    #[must_use]
    pub fn state(&self) -> CrawlerState {
        self.flags.state()
    }

    /// Run the crawl to quiescence. Blocks the calling thread. Returns
    /// `Err(CrawlError::Config(..))` if the base URL is empty, or
    /// `Err(CrawlError::ShutdownTimeout(..))` if a pool failed to
    /// terminate within its grace period during teardown.
    ///
    /// A `reset()` (or `set_thread_limit()` while running) does not make
    /// this call return: it tears the current pools down, rebuilds them
    /// at the new `thread_limit`, and keeps crawling on the same call —
    /// only an unrequested drain to quiescence, or a teardown failure,
    /// returns control to the caller.
    pub fn navigate(&self) -> CrawlResult<()> {
        if self.config_read().base_url().is_empty() {
            return Err(CrawlError::Config("base URL must not be empty".to_string()));
        }

        self.flags.clear_stop();
        self.flags.set_state(CrawlerState::Running);

        loop {
            let thread_limit = self.config_read().thread_limit();
            let mut fetch_stage = FetchStage::new(thread_limit, self.fetcher.clone());
            let mut parse_stage = ParseStage::new(parse_width_for(thread_limit));

            self.coordinator.seed(&self.config);
            self.coordinator.run(&self.config, &self.flags, &fetch_stage, &parse_stage);

            let fetch_ok = fetch_stage.shutdown(POOL_SHUTDOWN_GRACE);
            let parse_ok = parse_stage.shutdown(POOL_SHUTDOWN_GRACE);

            if !fetch_ok {
                self.flags.set_state(CrawlerState::Stopped);
                return Err(CrawlError::ShutdownTimeout {
                    pool: "fetch",
                    grace_secs: POOL_SHUTDOWN_GRACE.as_secs(),
                });
            }
            if !parse_ok {
                self.flags.set_state(CrawlerState::Stopped);
                return Err(CrawlError::ShutdownTimeout {
                    pool: "parse",
                    grace_secs: POOL_SHUTDOWN_GRACE.as_secs(),
                });
            }

            // A rebuild request (from `reset()`/`set_thread_limit()`) is
            // only honored if nothing else asked for a real stop in the
            // same window — `shutdown()` leaves the state `Draining`.
            if self.flags.take_rebuild_request() && self.flags.state() != CrawlerState::Draining {
                self.flags.clear_stop();
                continue;
            }

            self.flags.set_state(CrawlerState::Stopped);
            return Ok(());
        }
    }

    /// The stable, human-readable progress string described in the
    /// external interfaces section. Safe to call while a crawl is
    /// running: it only takes a config read lock for the instant it
    /// needs `thread_limit`.
    #[must_use]
    pub fn get_crawl_progress(&self) -> String {
        let thread_limit = self.config_read().thread_limit();
        format_progress(&self.coordinator.counters, self.coordinator.frontier_len(), thread_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, PageEvent};
    use crate::fetch::{FetchOutcome, ParseJob};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SinglePageFetcher {
        visits: Arc<AtomicUsize>,
    }

    struct StaticParseJob {
        url: String,
        links: Vec<String>,
    }

    impl ParseJob for StaticParseJob {
        fn configure(
            &mut self,
            actions: Arc<[Arc<dyn Action>]>,
            _base_url: Arc<str>,
            _base_url_secure: Option<Arc<str>>,
        ) {
            for action in actions.iter() {
                action.on_page(PageEvent::Fetched {
                    url: &self.url,
                    body: "",
                });
            }
        }

        fn run(self: Box<Self>) -> CrawlResult<Vec<String>> {
            Ok(self.links)
        }
    }

    impl Fetcher for SinglePageFetcher {
        fn fetch(&self, url: &str) -> FetchOutcome {
            self.visits.fetch_add(1, Ordering::SeqCst);
            FetchOutcome::Fetched {
                url: url.to_string(),
                job: Box::new(StaticParseJob {
                    url: url.to_string(),
                    links: Vec::new(),
                }),
            }
        }
    }

    #[test]
    fn navigate_rejects_empty_base_url() {
        let crawler = WebCrawler::new("", None, Vec::new());
        assert!(matches!(crawler.navigate(), Err(CrawlError::Config(_))));
    }

    #[test]
    fn navigate_dispatches_single_page_site() {
        let visits = Arc::new(AtomicUsize::new(0));
        let fetcher: Arc<dyn Fetcher> = Arc::new(SinglePageFetcher { visits: visits.clone() });
        let client_pool: Arc<dyn ClientPool> = Arc::new(ReqwestClientPool::new(1));
        let config = CrawlerConfig::new("http://site/", None, Vec::new());
        let crawler = WebCrawler::with_collaborators(config, fetcher, client_pool);

        crawler.navigate().expect("navigate");

        assert_eq!(visits.load(Ordering::SeqCst), 1);
        assert_eq!(crawler.coordinator.counters.actually_visited(), 1);
        assert_eq!(crawler.coordinator.counters.links_scheduled(), 0);
        assert_eq!(crawler.coordinator.counters.pages_scheduled(), 0);
    }
}
