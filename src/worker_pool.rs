//! A generic bounded worker pool of OS threads.
//!
//! Grounded on the classic `ThreadPool`/`Worker`/`Job` shape, restyled with
//! `crossbeam_channel` so completions can be drained with a timed receive
//! instead of blocking indefinitely — the scheduling model throughout this
//! crate is "parallel threads", not an async runtime.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A pool of `size` worker threads pulling jobs from a shared queue.
///
/// `submit` never blocks the caller on job execution; jobs run on whichever
/// worker becomes free. Completion is observed out-of-band: callers of this
/// type are expected to have each job send its own result onto a completion
/// channel (see [`crate::stages`]), since `WorkerPool` itself is generic
/// over "a thing that runs", not over a particular result type.
pub struct WorkerPool {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` worker threads. `size` must be at least 1.
    #[must_use]
    pub fn new(size: usize, name: &str) -> Self {
        assert!(size >= 1, "worker pool size must be at least 1");
        let (job_tx, job_rx) = bounded::<Job>(size * 4);
        let mut workers = Vec::with_capacity(size);
        for idx in 0..size {
            let job_rx: Receiver<Job> = job_rx.clone();
            let thread_name = format!("{name}-{idx}");
            let handle = thread::Builder::new()
                .name(thread_name.clone())
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        job();
                    }
                    log::debug!(target: "sitecrawl::worker_pool", "worker {thread_name} exiting");
                })
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }
        Self {
            job_tx: Some(job_tx),
            workers,
        }
    }

    /// Submit a job to the pool. Returns `false` if the pool has already
    /// been shut down.
    pub fn submit(&self, job: Job) -> bool {
        match &self.job_tx {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }

    /// Close the job queue and join every worker, polling in
    /// `poll_interval`-sized increments up to `grace`. Returns `false` if
    /// any worker was still running when the grace period elapsed (the
    /// threads are left to finish on their own; this pool no longer tracks
    /// them).
    pub fn shutdown(&mut self, grace: Duration, poll_interval: Duration) -> bool {
        self.job_tx.take();
        let deadline = std::time::Instant::now() + grace;
        let mut remaining: Vec<JoinHandle<()>> = self.workers.drain(..).collect();
        while !remaining.is_empty() && std::time::Instant::now() < deadline {
            remaining.retain(|handle| !handle.is_finished());
            if !remaining.is_empty() {
                thread::sleep(poll_interval.min(Duration::from_millis(200)));
            }
        }
        remaining.is_empty()
    }
}

/// A bounded completion channel pair: `Sender` is cloned into each job
/// closure, `Receiver` is polled by a single completion consumer.
pub fn completion_channel<T: Send + 'static>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    bounded(capacity)
}

/// Poll a completion channel with a fixed timeout, treating a timeout as
/// "no completion yet" rather than an error.
pub fn poll_completed<T>(rx: &Receiver<T>, timeout: Duration) -> Option<T> {
    match rx.recv_timeout(timeout) {
        Ok(value) => Some(value),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn pool_runs_submitted_jobs() {
        let pool = WorkerPool::new(2, "test-pool");
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        let mut pool = pool;
        pool.shutdown(Duration::from_secs(2), Duration::from_millis(10));
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn submit_after_shutdown_fails() {
        let mut pool = WorkerPool::new(1, "test-pool-2");
        pool.shutdown(Duration::from_secs(2), Duration::from_millis(10));
        assert!(!pool.submit(Box::new(|| {})));
    }

    #[test]
    fn poll_completed_times_out_without_error() {
        let (_tx, rx) = completion_channel::<u32>(1);
        let result = poll_completed(&rx, Duration::from_millis(20));
        assert!(result.is_none());
    }
}
