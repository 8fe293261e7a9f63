//! Boundary-condition tests (§8).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mockito::Server;
use sitecrawl::{Action, PageEvent, WebCrawler};

struct CountingAction {
    count: Arc<AtomicUsize>,
}

impl Action for CountingAction {
    fn on_page(&self, _event: PageEvent<'_>) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

fn crawler_with_counter(base_url: String) -> (WebCrawler, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let actions: Vec<Arc<dyn Action>> = vec![Arc::new(CountingAction { count: count.clone() })];
    (WebCrawler::new(base_url, None, actions), count)
}

#[test]
fn thread_limit_of_one_is_legal() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/").with_status(200).with_body("<html></html>").create();

    let (crawler, count) = crawler_with_counter(format!("{}/", server.url()));
    crawler.set_thread_limit(1).expect("thread limit 1 is legal");
    crawler.navigate().expect("navigate");

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn zero_thread_limit_is_rejected() {
    let (crawler, _count) = crawler_with_counter("http://site/".to_string());
    assert!(crawler.set_thread_limit(0).is_err());
}

#[test]
fn empty_seed_list_still_seeds_base_url() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/").with_status(200).with_body("<html></html>").create();

    let (crawler, count) = crawler_with_counter(format!("{}/", server.url()));
    crawler.set_include_path(Vec::new());
    crawler.navigate().expect("navigate");

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn short_circuit_after_one_dispatches_exactly_once_from_a_dead_end() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/").with_status(200).with_body("<html></html>").create();

    let (crawler, count) = crawler_with_counter(format!("{}/", server.url()));
    crawler.set_short_circuit_after(1);
    crawler.navigate().expect("navigate");

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn max_process_waiting_of_one_still_makes_forward_progress() {
    let mut server = Server::new();
    let base = server.url();
    let _root = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(format!(r#"<html><body><a href="{base}/a.html">a</a></body></html>"#))
        .create();
    let _a = server.mock("GET", "/a.html").with_status(200).with_body("<html></html>").create();

    let (crawler, count) = crawler_with_counter(format!("{base}/"));
    crawler.set_max_process_waiting(1).expect("max process waiting 1 is legal");
    crawler.navigate().expect("navigate");

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn all_blocked_site_terminates_without_dispatch() {
    let mut server = Server::new();
    let mock = server.mock("GET", "/").with_status(200).with_body("<html></html>").expect(0).create();

    let (crawler, count) = crawler_with_counter(format!("{}/", server.url()));
    crawler.set_blocked(vec!["/".to_string()]);
    crawler.navigate().expect("navigate");

    assert_eq!(count.load(Ordering::SeqCst), 0);
    mock.assert();
}
