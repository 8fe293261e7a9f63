//! The fetch stage and parse stage: each a bounded worker pool paired with
//! a completion channel, per §4.1/§4.2.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::error::CrawlResult;
use crate::fetch::{FetchOutcome, Fetcher, ParseJob};
use crate::worker_pool::{completion_channel, poll_completed, WorkerPool};

/// Network-bound stage: submits one job per URL, draining completions in
/// whatever order they finish.
pub struct FetchStage {
    pool: WorkerPool,
    completion_tx: Sender<FetchOutcome>,
    completion_rx: Receiver<FetchOutcome>,
    fetcher: Arc<dyn Fetcher>,
}

impl FetchStage {
    #[must_use]
    pub fn new(width: usize, fetcher: Arc<dyn Fetcher>) -> Self {
        let (completion_tx, completion_rx) = completion_channel(width.max(1) * 8);
        Self {
            pool: WorkerPool::new(width, "sitecrawl-fetch"),
            completion_tx,
            completion_rx,
            fetcher,
        }
    }

    /// Submit a fetch job. Returns `false` only if the pool has been shut
    /// down (`PoolClosed` per the fetch stage contract).
    pub fn submit(&self, url: String) -> bool {
        let fetcher = self.fetcher.clone();
        let tx = self.completion_tx.clone();
        self.pool.submit(Box::new(move || {
            let outcome = fetcher.fetch(&url);
            let _ = tx.send(outcome);
        }))
    }

    #[must_use]
    pub fn poll_completed(&self, timeout: Duration) -> Option<FetchOutcome> {
        poll_completed(&self.completion_rx, timeout)
    }

    pub fn shutdown(&mut self, grace: Duration) -> bool {
        self.pool.shutdown(grace, Duration::from_millis(100))
    }
}

/// A completed parse job: the originating URL and either the discovered
/// links or the failure that occurred while running the job.
pub struct ParseCompletion {
    pub url: String,
    pub result: CrawlResult<Vec<String>>,
}

/// CPU-bound stage: runs each parse job (actions + link extraction) on a
/// worker narrower than the fetch stage, since network latency dominates
/// fetch time while parsing is CPU-bound.
pub struct ParseStage {
    pool: WorkerPool,
    completion_tx: Sender<ParseCompletion>,
    completion_rx: Receiver<ParseCompletion>,
}

impl ParseStage {
    #[must_use]
    pub fn new(width: usize) -> Self {
        let (completion_tx, completion_rx) = completion_channel(width.max(1) * 8);
        Self {
            pool: WorkerPool::new(width, "sitecrawl-parse"),
            completion_tx,
            completion_rx,
        }
    }

    pub fn submit(&self, url: String, job: Box<dyn ParseJob>) -> bool {
        let tx = self.completion_tx.clone();
        self.pool.submit(Box::new(move || {
            let result = job.run();
            let _ = tx.send(ParseCompletion {
                url,
                result,
            });
        }))
    }

    #[must_use]
    pub fn poll_completed(&self, timeout: Duration) -> Option<ParseCompletion> {
        poll_completed(&self.completion_rx, timeout)
    }

    pub fn shutdown(&mut self, grace: Duration) -> bool {
        self.pool.shutdown(grace, Duration::from_millis(100))
    }
}

/// Parse-stage width as a function of fetch-stage width: `ceil(width * 0.5)`,
/// floored at 1. This ratio is a design constant, not a tuning knob.
#[must_use]
pub fn parse_width_for(fetch_width: usize) -> usize {
    fetch_width.div_ceil(2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_width_is_half_fetch_width_rounded_up() {
        assert_eq!(parse_width_for(1), 1);
        assert_eq!(parse_width_for(4), 2);
        assert_eq!(parse_width_for(5), 3);
    }
}
