//! Error types for crawl operations.

/// Errors a crawl can raise.
///
/// Only [`CrawlError::Config`] and [`CrawlError::ShutdownTimeout`] are ever
/// returned from [`crate::WebCrawler::navigate`] as an `Err`; the other
/// variants are recovered in place (logged, folded into progress
/// bookkeeping) and the crawl continues.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Invalid configuration discovered synchronously (bad thread limit,
    /// empty base URL, ...). Fatal: no crawler state is mutated.
    #[error("invalid crawler configuration: {0}")]
    Config(String),

    /// A fetch job failed (network, TLS, HTTP status, or client-pool error).
    #[error("fetch failed for {url}: {cause}")]
    Fetch { url: String, cause: String },

    /// A parse job failed (extraction error or an action panicked/errored).
    #[error("parse failed for {url}: {cause}")]
    Parse { url: String, cause: String },

    /// An internal wait was interrupted before its timeout elapsed.
    #[error("interrupted while {0}")]
    Interrupted(String),

    /// A worker pool did not terminate within its shutdown grace period.
    #[error("{pool} pool did not shut down within {grace_secs}s")]
    ShutdownTimeout { pool: &'static str, grace_secs: u64 },
}

/// Convenience alias for `Result<T, CrawlError>`.
pub type CrawlResult<T> = Result<T, CrawlError>;

impl From<reqwest::Error> for CrawlError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.as_str().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        Self::Fetch {
            url,
            cause: err.to_string(),
        }
    }
}
