//! External collaborator contracts: the fetcher and the parse job.
//!
//! These are the two seams a caller may swap out; the crate ships default
//! implementations in [`crate::default_fetcher`] so the coordinator is
//! exercisable standalone.

use std::sync::Arc;

use crate::action::Action;
use crate::error::CrawlResult;

/// Outcome of running one fetch job.
pub enum FetchOutcome {
    /// The page was fetched; `job` is ready to be configured with actions
    /// and submitted to the parse stage.
    Fetched { url: String, job: Box<dyn ParseJob> },
    /// The fetch failed. The URL is still handed to every action as a
    /// failure notification by the fetch-completion consumer.
    Failed { url: String, cause: String },
}

/// A unit of fetch work bound to one URL.
///
/// A fetcher acquires a client from a [`crate::client_pool::ClientPool`],
/// issues the request, and returns a [`FetchOutcome`]. It must not mutate
/// crawler-level state (visited sets, counters); that is the
/// fetch-completion consumer's job.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> FetchOutcome;
}

/// A parse job bound to one fetched page.
///
/// The fetch-completion consumer configures a freshly-fetched job with the
/// registered actions and the base URLs before submitting it to the parse
/// stage. Running the job invokes every action on the document and returns
/// the set of outbound link candidates discovered (scheme-resolved, but not
/// yet scope-filtered — that happens in the parse-completion consumer).
pub trait ParseJob: Send {
    /// Bind the actions and base URLs this job should use once run.
    fn configure(
        &mut self,
        actions: Arc<[Arc<dyn Action>]>,
        base_url: Arc<str>,
        base_url_secure: Option<Arc<str>>,
    );

    /// Run the job: invoke every action, extract links. A returned `Err`
    /// still carries whatever links were discovered before the failure via
    /// the `CrawlError::Parse` variant's context — callers that need
    /// partial results on failure should collect them before returning
    /// `Err` and log them at the call site.
    fn run(self: Box<Self>) -> CrawlResult<Vec<String>>;
}
