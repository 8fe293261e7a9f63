//! Crawler configuration.
//!
//! The Control API described in the external interfaces mutates
//! configuration after construction (`set_thread_limit`, `set_blocked`,
//! ...), so this is a plain struct with setters and getters rather than a
//! one-shot typestate builder.

use std::sync::Arc;

use crate::action::Action;
use crate::client_pool::Cookie;
use crate::error::{CrawlError, CrawlResult};
use crate::url_scope::ScopePolicy;

/// How often (in successful dispatches) the coordinator should emit a
/// progress log line.
const DEFAULT_REPORT_PROGRESS_EVERY: u64 = 2000;
const DEFAULT_MAX_PROCESS_WAITING: u64 = 2000;

/// Mutable crawler configuration: scope, concurrency limits, cookies, and
/// the registered actions.
pub struct CrawlerConfig {
    scope: ScopePolicy,
    actions: Vec<Arc<dyn Action>>,
    thread_limit: usize,
    max_process_waiting: u64,
    short_circuit_after: u64,
    cookies: Vec<Cookie>,
    redirects_enabled: bool,
    javascript_enabled: bool,
    url_discovery_enabled: bool,
    seed_urls: Vec<String>,
    report_progress_every: u64,
}

impl CrawlerConfig {
    /// Construct a configuration for `base_url` (and an optional secure
    /// mirror) with the given actions. Thread limit defaults to the number
    /// of CPUs.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        base_url_secure: Option<String>,
        actions: Vec<Arc<dyn Action>>,
    ) -> Self {
        let base_url = base_url.into();
        let mut scope = ScopePolicy::new(base_url);
        scope.base_url_secure = base_url_secure;
        Self {
            scope,
            actions,
            thread_limit: num_cpus::get().max(1),
            max_process_waiting: DEFAULT_MAX_PROCESS_WAITING,
            short_circuit_after: 0,
            cookies: Vec::new(),
            redirects_enabled: true,
            javascript_enabled: false,
            url_discovery_enabled: true,
            seed_urls: Vec::new(),
            report_progress_every: DEFAULT_REPORT_PROGRESS_EVERY,
        }
    }

    #[must_use]
    pub fn scope(&self) -> &ScopePolicy {
        &self.scope
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.scope.base_url
    }

    #[must_use]
    pub fn base_url_secure(&self) -> Option<&str> {
        self.scope.base_url_secure.as_deref()
    }

    #[must_use]
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    #[must_use]
    pub fn thread_limit(&self) -> usize {
        self.thread_limit
    }

    pub fn set_thread_limit(&mut self, n: usize) -> CrawlResult<()> {
        if n == 0 {
            return Err(CrawlError::Config("thread limit must be at least 1".to_string()));
        }
        self.thread_limit = n;
        Ok(())
    }

    #[must_use]
    pub fn max_process_waiting(&self) -> u64 {
        self.max_process_waiting
    }

    pub fn set_max_process_waiting(&mut self, n: u64) -> CrawlResult<()> {
        if n == 0 {
            return Err(CrawlError::Config(
                "max process waiting must be at least 1".to_string(),
            ));
        }
        self.max_process_waiting = n;
        Ok(())
    }

    #[must_use]
    pub fn short_circuit_after(&self) -> u64 {
        self.short_circuit_after
    }

    /// `0` disables short-circuiting.
    pub fn set_short_circuit_after(&mut self, n: u64) {
        self.short_circuit_after = n;
    }

    #[must_use]
    pub fn report_progress_every(&self) -> u64 {
        self.report_progress_every
    }

    #[must_use]
    pub fn seed_urls(&self) -> &[String] {
        &self.seed_urls
    }

    /// Seed the frontier with additional URLs beyond the base URL. Each is
    /// still subject to scope filtering at dispatch time.
    pub fn set_include_path(&mut self, urls: Vec<String>) {
        self.seed_urls = urls;
    }

    pub fn set_blocked(&mut self, patterns: Vec<String>) {
        self.scope.blocked_patterns = patterns;
    }

    #[must_use]
    pub fn blocked(&self) -> &[String] {
        &self.scope.blocked_patterns
    }

    /// Live, mutable handle to the allowed-suffix list.
    pub fn allowed_suffixes_mut(&mut self) -> &mut Vec<String> {
        &mut self.scope.allowed_suffixes
    }

    #[must_use]
    pub fn allowed_suffixes(&self) -> &[String] {
        &self.scope.allowed_suffixes
    }

    pub fn enable_redirects(&mut self) {
        self.redirects_enabled = true;
    }

    pub fn disable_redirects(&mut self) {
        self.redirects_enabled = false;
    }

    #[must_use]
    pub fn redirects_enabled(&self) -> bool {
        self.redirects_enabled
    }

    /// Records the JavaScript-execution policy flag. Actual JS rendering
    /// is out of scope; this only configures the client pool's reported
    /// policy for collaborators that check it.
    pub fn enable_javascript(&mut self) {
        self.javascript_enabled = true;
    }

    #[must_use]
    pub fn javascript_enabled(&self) -> bool {
        self.javascript_enabled
    }

    pub fn add_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Finish in-flight work but discover no further links. The producer
    /// loop treats this the same as an empty frontier for the purpose of
    /// `should_continue_crawling`.
    pub fn disable_crawling(&mut self) {
        self.url_discovery_enabled = false;
    }

    #[must_use]
    pub fn url_discovery_enabled(&self) -> bool {
        self.url_discovery_enabled
    }
}
