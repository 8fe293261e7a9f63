//! The crawl coordinator: frontier, producer loop, and the two
//! completion consumers (§4.3, §4.4, §4.5).
//!
//! All three run concurrently for the duration of one [`Coordinator::run`]
//! call — the producer loop on the calling thread, the two consumers on
//! threads scoped to that call via [`std::thread::scope`] so they can
//! borrow the coordinator's state directly instead of requiring `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::action::{Action, PageEvent};
use crate::config::CrawlerConfig;
use crate::counters::Counters;
use crate::lifecycle::LifecycleFlags;
use crate::progress::{format_progress, ProgressGate};
use crate::sets::{ScheduledSet, VisitedSet};
use crate::stages::{FetchStage, ParseStage};
use crate::url_scope::clean_url;

const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the frontier queue and the concurrent sets/counters that track
/// crawl progress. One `Coordinator` is created per crawler instance and
/// reused across `navigate()`/`reset()` calls so visited state persists.
pub struct Coordinator {
    frontier_tx: Sender<String>,
    frontier_rx: Receiver<String>,
    pub visited: VisitedSet,
    pub scheduled: ScheduledSet,
    pub counters: Counters,
    progress_gate: ProgressGate,
}

impl Coordinator {
    #[must_use]
    pub fn new() -> Self {
        let (frontier_tx, frontier_rx) = crossbeam_channel::unbounded();
        Self {
            frontier_tx,
            frontier_rx,
            visited: VisitedSet::new(),
            scheduled: ScheduledSet::new(),
            counters: Counters::new(),
            progress_gate: ProgressGate::new(),
        }
    }

    #[must_use]
    pub fn frontier_len(&self) -> usize {
        self.frontier_rx.len()
    }

    #[must_use]
    pub fn frontier_is_empty(&self) -> bool {
        self.frontier_rx.is_empty()
    }

    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.counters.is_quiescent(self.frontier_is_empty())
    }

    /// Reset all crawl state: visited set, scheduled set, counters, and any
    /// URLs left sitting in the frontier. Used by `reset()`/`hard_unpause()`.
    pub fn reset_state(&self) {
        self.visited.clear();
        self.scheduled.clear();
        while self.frontier_rx.try_recv().is_ok() {}
    }

    /// Enqueue `url` onto the frontier if it passes the scope filter and
    /// isn't already waiting there. Used both for seeding and for the
    /// parse-completion consumer's link intake (§4.4).
    ///
    /// Only holds the config read lock for the instant it needs the scope
    /// policy, so this never blocks a concurrent Control API write for
    /// longer than a single exclusion check.
    fn enqueue_if_eligible(&self, url: &str, config: &RwLock<CrawlerConfig>) {
        let cleaned = clean_url(url);
        let excluded = {
            let config = config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            config.scope().is_excluded(
                url,
                self.visited.contains_raw(url),
                self.visited.contains_cleaned(&cleaned),
            )
        };
        if excluded || self.scheduled.contains(url) {
            return;
        }
        self.scheduled.insert(url);
        let _ = self.frontier_tx.send(url.to_string());
    }

    /// Seed the frontier with the base URL (if nothing has been queued
    /// yet) and any additional seed URLs from `set_include_path`.
    pub fn seed(&self, config: &RwLock<CrawlerConfig>) {
        if self.frontier_is_empty() && self.visited.is_empty() {
            let base_url = config
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .base_url()
                .to_string();
            self.enqueue_if_eligible(&base_url, config);
        }
        let seed_urls = config
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .seed_urls()
            .to_vec();
        for url in &seed_urls {
            self.enqueue_if_eligible(url, config);
        }
    }

    fn should_continue_crawling(&self, config: &RwLock<CrawlerConfig>) -> bool {
        if self.is_quiescent() {
            return false;
        }
        let config = config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !config.url_discovery_enabled() {
            return false;
        }
        if config.short_circuit_after() > 0
            && self.counters.visited_counter() as u64 > config.short_circuit_after()
        {
            return false;
        }
        true
    }

    fn should_pause_crawling(&self, config: &RwLock<CrawlerConfig>, flags: &LifecycleFlags) -> bool {
        if flags.is_paused() {
            return true;
        }
        let config = config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.counters.links_scheduled() as u64 > config.max_process_waiting()
    }

    /// Run the producer loop, fetch-completion consumer, and
    /// parse-completion consumer concurrently until in-flight work drains
    /// to zero or `flags.should_stop()` is set.
    pub fn run(&self, config: &RwLock<CrawlerConfig>, flags: &LifecycleFlags, fetch_stage: &FetchStage, parse_stage: &ParseStage) {
        let local_done = AtomicBool::new(false);
        std::thread::scope(|scope| {
            scope.spawn(|| self.run_fetch_consumer(flags, &local_done, fetch_stage, parse_stage, config));
            scope.spawn(|| self.run_parse_consumer(flags, &local_done, parse_stage, config));
            self.run_producer_loop(config, flags, &local_done, fetch_stage);
        });
    }

    fn run_producer_loop(
        &self,
        config: &RwLock<CrawlerConfig>,
        flags: &LifecycleFlags,
        local_done: &AtomicBool,
        fetch_stage: &FetchStage,
    ) {
        loop {
            if flags.should_stop() {
                break;
            }
            if !self.should_continue_crawling(config) {
                break;
            }

            let (report_every, thread_limit) = {
                let config = config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
                (config.report_progress_every(), config.thread_limit())
            };
            if self
                .progress_gate
                .should_report(self.counters.visited_counter(), report_every)
            {
                log::info!(
                    target: "sitecrawl::coordinator",
                    "{}",
                    format_progress(&self.counters, self.frontier_len(), thread_limit)
                );
            }

            if self.should_pause_crawling(config, flags) {
                std::thread::sleep(POLL_TIMEOUT);
                continue;
            }

            let url = match self.frontier_rx.recv_timeout(POLL_TIMEOUT) {
                Ok(url) => url,
                Err(_) => continue,
            };
            self.scheduled.remove(&url);

            let cleaned = clean_url(&url);
            let excluded = {
                let config = config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
                config.scope().is_excluded(
                    &url,
                    self.visited.contains_raw(&url),
                    self.visited.contains_cleaned(&cleaned),
                )
            };
            if excluded {
                continue;
            }

            if fetch_stage.submit(url.clone()) {
                self.counters.inc_links_scheduled();
                self.visited.mark_visited(&url, &cleaned);
                self.counters.inc_visited_counter();
            }
        }

        // Drain in-flight fetch/parse work only. Do NOT wait on the
        // frontier too: once dispatch has stopped (short-circuit bound
        // hit, or discovery disabled), the parse-completion consumer keeps
        // enqueuing newly-discovered links that will never be dispatched,
        // so `frontier.is_empty()` might never become true again. Those
        // leftover frontier entries are simply discarded once in-flight
        // work reaches zero.
        while (self.counters.links_scheduled() != 0 || self.counters.pages_scheduled() != 0)
            && !flags.should_stop()
        {
            std::thread::sleep(POLL_TIMEOUT);
        }
        local_done.store(true, Ordering::SeqCst);
    }

    fn run_fetch_consumer(
        &self,
        flags: &LifecycleFlags,
        local_done: &AtomicBool,
        fetch_stage: &FetchStage,
        parse_stage: &ParseStage,
        config: &RwLock<CrawlerConfig>,
    ) {
        let (actions, base_url, base_url_secure): (Arc<[Arc<dyn Action>]>, Arc<str>, Option<Arc<str>>) = {
            let config = config.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            (
                Arc::from(config.actions().to_vec()),
                Arc::from(config.base_url()),
                config.base_url_secure().map(Arc::from),
            )
        };

        loop {
            match fetch_stage.poll_completed(POLL_TIMEOUT) {
                Some(crate::fetch::FetchOutcome::Fetched { url, mut job }) => {
                    self.counters.inc_actually_visited();
                    job.configure(actions.clone(), base_url.clone(), base_url_secure.clone());
                    parse_stage.submit(url, job);
                    self.counters.inc_pages_scheduled();
                    self.counters.dec_links_scheduled();
                }
                Some(crate::fetch::FetchOutcome::Failed { url, cause }) => {
                    self.counters.inc_actually_visited();
                    log::warn!(target: "sitecrawl::coordinator", "fetch failed for {url}: {cause}");
                    for action in actions.iter() {
                        action.on_page(PageEvent::Failed {
                            url: &url,
                            cause: &cause,
                        });
                    }
                    self.counters.dec_links_scheduled();
                }
                None => {
                    if local_done.load(Ordering::SeqCst) || flags.should_stop() {
                        break;
                    }
                }
            }
        }
    }

    fn run_parse_consumer(
        &self,
        flags: &LifecycleFlags,
        local_done: &AtomicBool,
        parse_stage: &ParseStage,
        config: &RwLock<CrawlerConfig>,
    ) {
        loop {
            match parse_stage.poll_completed(POLL_TIMEOUT) {
                Some(completion) => {
                    match completion.result {
                        Ok(links) => {
                            for link in links {
                                self.enqueue_if_eligible(&link, config);
                            }
                        }
                        Err(err) => {
                            log::warn!(
                                target: "sitecrawl::coordinator",
                                "parse failed for {}: {err}",
                                completion.url
                            );
                        }
                    }
                    self.counters.dec_pages_scheduled();
                }
                None => {
                    if local_done.load(Ordering::SeqCst) || flags.should_stop() {
                        break;
                    }
                }
            }
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_enqueues_base_url_once() {
        let coordinator = Coordinator::new();
        let config = RwLock::new(CrawlerConfig::new("http://site/", None, Vec::new()));
        coordinator.seed(&config);
        assert_eq!(coordinator.frontier_len(), 1);
        coordinator.seed(&config);
        // visited is still empty (nothing dispatched yet) but the base URL
        // is already sitting in the frontier, so seeding again must not
        // duplicate it.
        assert_eq!(coordinator.frontier_len(), 1);
    }

    #[test]
    fn quiescent_when_fresh() {
        let coordinator = Coordinator::new();
        assert!(coordinator.is_quiescent());
    }
}
