//! Minimal demo binary: crawl a URL given on the command line using the
//! default fetcher/client pool, logging progress until completion.

use std::sync::Arc;

use sitecrawl::{Action, LoggingAction, WebCrawler};

fn main() {
    env_logger::init();

    let base_url = match std::env::args().nth(1) {
        Some(url) => url,
        None => {
            eprintln!("usage: sitecrawl-demo <base-url>");
            std::process::exit(1);
        }
    };

    let actions: Vec<Arc<dyn Action>> = vec![Arc::new(LoggingAction)];
    let crawler = WebCrawler::new(base_url, None, actions);

    if let Err(err) = crawler.navigate() {
        eprintln!("crawl failed: {err}");
        std::process::exit(1);
    }

    println!("{}", crawler.get_crawl_progress());
}
