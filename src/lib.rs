//! Polite, bounded-memory site crawler.
//!
//! A [`WebCrawler`] fetches in-scope pages starting from one or two base
//! URLs, extracts outbound links, and invokes caller-supplied [`Action`]s on
//! each fetched page. The fetch stage and parse stage are independent
//! bounded thread pools joined by completion channels; a single producer
//! loop (the caller's own thread, inside [`WebCrawler::navigate`]) pulls
//! URLs from the frontier and submits fetch jobs.

pub mod action;
pub mod client_pool;
pub mod config;
pub mod coordinator;
pub mod counters;
pub mod default_fetcher;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod progress;
pub mod sets;
pub mod stages;
pub mod url_scope;
pub mod worker_pool;

mod crawler;

pub use action::{Action, LoggingAction, PageEvent};
pub use client_pool::{ClientPool, Cookie, ReqwestClientPool};
pub use config::CrawlerConfig;
pub use crawler::WebCrawler;
pub use default_fetcher::{DefaultFetcher, DefaultParseJob};
pub use error::{CrawlError, CrawlResult};
pub use fetch::{FetchOutcome, Fetcher, ParseJob};
pub use lifecycle::CrawlerState;
pub use url_scope::{clean_url, prepend_base_url_if_needed, ScopePolicy};
