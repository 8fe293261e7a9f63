//! A concrete `Fetcher`/`ParseJob` pair built on a blocking HTTP client and
//! `scraper`, so the coordinator can run end-to-end without a caller
//! supplying their own collaborators.

use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use crate::action::{Action, PageEvent};
use crate::client_pool::ClientPool;
use crate::error::{CrawlError, CrawlResult};
use crate::fetch::{FetchOutcome, Fetcher, ParseJob};

/// Fetches a page by acquiring a client from a [`ClientPool`], issuing a
/// GET, and wrapping the body in a [`DefaultParseJob`] on success.
pub struct DefaultFetcher {
    client_pool: Arc<dyn ClientPool>,
}

impl DefaultFetcher {
    #[must_use]
    pub fn new(client_pool: Arc<dyn ClientPool>) -> Self {
        Self { client_pool }
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        let client = match self.client_pool.acquire() {
            Ok(client) => client,
            Err(err) => {
                return FetchOutcome::Failed {
                    url: url.to_string(),
                    cause: err.to_string(),
                }
            }
        };

        let result = client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|resp| resp.text());

        self.client_pool.release(client);

        match result {
            Ok(body) => FetchOutcome::Fetched {
                url: url.to_string(),
                job: Box::new(DefaultParseJob::new(url.to_string(), body)),
            },
            Err(err) => FetchOutcome::Failed {
                url: url.to_string(),
                cause: err.to_string(),
            },
        }
    }
}

/// Runs every action on the fetched document, then extracts `a[href]`
/// targets resolved against the page's own URL.
pub struct DefaultParseJob {
    url: String,
    body: String,
    actions: Arc<[Arc<dyn Action>]>,
    #[allow(dead_code)]
    base_url: Option<Arc<str>>,
    #[allow(dead_code)]
    base_url_secure: Option<Arc<str>>,
}

impl DefaultParseJob {
    #[must_use]
    pub fn new(url: String, body: String) -> Self {
        Self {
            url,
            body,
            actions: Arc::from(Vec::new()),
            base_url: None,
            base_url_secure: None,
        }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        match Url::parse(&self.url) {
            Ok(page_url) => page_url.join(href).ok().map(|joined| joined.to_string()),
            Err(_) => Some(crate::url_scope::prepend_base_url_if_needed(
                href,
                self.base_url.as_deref().unwrap_or(&self.url),
            )),
        }
    }
}

impl ParseJob for DefaultParseJob {
    fn configure(
        &mut self,
        actions: Arc<[Arc<dyn Action>]>,
        base_url: Arc<str>,
        base_url_secure: Option<Arc<str>>,
    ) {
        self.actions = actions;
        self.base_url = Some(base_url);
        self.base_url_secure = base_url_secure;
    }

    fn run(self: Box<Self>) -> CrawlResult<Vec<String>> {
        for action in self.actions.iter() {
            action.on_page(PageEvent::Fetched {
                url: &self.url,
                body: &self.body,
            });
        }

        let document = Html::parse_document(&self.body);
        let selector = Selector::parse("a[href]").map_err(|err| CrawlError::Parse {
            url: self.url.clone(),
            cause: format!("{err:?}"),
        })?;

        let links = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| self.resolve(href))
            .collect();

        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_resolves_links() {
        let body = r#"<html><body>
            <a href="/a.html">a</a>
            <a href="b.html">b</a>
            <a href="http://other/c.html">c</a>
        </body></html>"#;
        let job = Box::new(DefaultParseJob::new("http://site/index.html".to_string(), body.to_string()));
        let links = job.run().expect("run");
        assert!(links.contains(&"http://site/a.html".to_string()));
        assert!(links.contains(&"http://site/b.html".to_string()));
        assert!(links.contains(&"http://other/c.html".to_string()));
    }

    #[test]
    fn invokes_every_action() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting(Arc<AtomicUsize>);
        impl Action for Counting {
            fn on_page(&self, _event: PageEvent<'_>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let mut job = DefaultParseJob::new("http://site/".to_string(), "<html></html>".to_string());
        job.configure(
            Arc::from(vec![Arc::new(Counting(count.clone())) as Arc<dyn Action>]),
            Arc::from("http://site"),
            None,
        );
        Box::new(job).run().expect("run");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
