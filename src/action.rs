//! The action plugin contract.
//!
//! An `Action` is invoked once per fetched page (success or failure). It
//! must be side-effect-isolated from crawler state: it can index, log, or
//! save content, but must not reach back into the crawler to mutate the
//! frontier, visited set, or counters.

/// The outcome handed to an action for one page.
pub enum PageEvent<'a> {
    /// The page was fetched successfully; `body` is the raw HTML.
    Fetched { url: &'a str, body: &'a str },
    /// The page failed to fetch or parse.
    Failed { url: &'a str, cause: &'a str },
}

/// A user-supplied plugin invoked on each fetched page.
///
/// Grounded on the page-enhancer callback shape in the source crawl
/// engine: one method, invoked per page, with no return value consumed by
/// the crawler beyond logging a panic-free error.
pub trait Action: Send + Sync {
    fn on_page(&self, event: PageEvent<'_>);
}

/// An action that logs every page event at info/warn level. Useful as a
/// default when a caller hasn't supplied their own action yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAction;

impl Action for LoggingAction {
    fn on_page(&self, event: PageEvent<'_>) {
        match event {
            PageEvent::Fetched { url, body } => {
                log::info!(target: "sitecrawl::action", "fetched {url} ({} bytes)", body.len());
            }
            PageEvent::Failed { url, cause } => {
                log::warn!(target: "sitecrawl::action", "failed {url}: {cause}");
            }
        }
    }
}
