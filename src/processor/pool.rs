//! Bounded worker pool for tokenizing fetched text.
//!
//! Concurrency here is decoupled from the fetch stage: the pool is sized
//! independently, and its bounded job queue (capacity `2 * worker_count`) is
//! the backpressure point that throttles the fetch stage if processing lags.

use crate::processor::word_bank::WordBank;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Partial word counts produced by one processing job.
pub type PartialCounts = HashMap<String, u64>;

/// Processing pool errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool was used after [`ProcessingPool::close`].
    #[error("processing pool is closed")]
    Closed,
}

/// Tokenize `text`, keeping normalized tokens accepted by the bank.
///
/// Tokens are split on whitespace; non-ASCII-letter bytes are stripped and
/// the remainder lower-cased. Tokens shorter than 3 characters or absent
/// from the bank are discarded.
pub fn count_words(text: &str, bank: &WordBank) -> PartialCounts {
    let mut counts = PartialCounts::new();
    let mut buf = String::with_capacity(32);

    for token in text.split_whitespace() {
        buf.clear();
        for byte in token.bytes() {
            match byte {
                b'A'..=b'Z' => buf.push((byte + 32) as char),
                b'a'..=b'z' => buf.push(byte as char),
                _ => {}
            }
        }
        if buf.len() >= 3 && bank.contains(&buf) {
            *counts.entry(buf.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Bounded pool of workers turning fetched text into partial word counts.
pub struct ProcessingPool {
    bank: Arc<WordBank>,
    worker_count: usize,
    jobs_tx: Option<mpsc::Sender<String>>,
    jobs_rx: Option<mpsc::Receiver<String>>,
    results_tx: Option<mpsc::Sender<PartialCounts>>,
    results_rx: Option<mpsc::Receiver<PartialCounts>>,
    workers: JoinSet<()>,
}

impl ProcessingPool {
    /// Create a pool with `worker_count` workers (non-positive coerced to 1)
    /// and queues sized at twice the worker count.
    pub fn new(bank: Arc<WordBank>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let capacity = worker_count * 2;
        let (jobs_tx, jobs_rx) = mpsc::channel(capacity);
        let (results_tx, results_rx) = mpsc::channel(capacity);
        Self {
            bank,
            worker_count,
            jobs_tx: Some(jobs_tx),
            jobs_rx: Some(jobs_rx),
            results_tx: Some(results_tx),
            results_rx: Some(results_rx),
            workers: JoinSet::new(),
        }
    }

    /// Launch the workers. Call once before submitting.
    pub fn start(&mut self) {
        let Some(jobs_rx) = self.jobs_rx.take() else {
            return; // already started
        };
        let results_tx = self
            .results_tx
            .take()
            .expect("results sender taken before start");
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));

        for _ in 0..self.worker_count {
            let bank = Arc::clone(&self.bank);
            let jobs_rx = Arc::clone(&jobs_rx);
            let results_tx = results_tx.clone();
            self.workers.spawn(async move {
                loop {
                    let job = {
                        let mut jobs = jobs_rx.lock().await;
                        jobs.recv().await
                    };
                    let Some(text) = job else {
                        return; // job queue closed and drained
                    };
                    let counts = count_words(&text, &bank);
                    if results_tx.send(counts).await.is_err() {
                        return; // result consumer gone
                    }
                }
            });
        }
        // The workers hold the only result senders now; when the last worker
        // exits, the results stream closes.
    }

    /// Enqueue a unit of work, blocking while the job queue is full.
    pub async fn submit(&self, text: String) -> Result<(), PoolError> {
        let jobs_tx = self.jobs_tx.as_ref().ok_or(PoolError::Closed)?;
        jobs_tx.send(text).await.map_err(|_| PoolError::Closed)
    }

    /// Take the partial-counts receiver. Must be drained fully to observe
    /// all results and avoid leaking blocked workers.
    pub fn take_results(&mut self) -> mpsc::Receiver<PartialCounts> {
        self.results_rx
            .take()
            .expect("results receiver already taken")
    }

    /// Signal no more input, then wait for the workers to drain.
    ///
    /// Callers must not submit after closing.
    pub async fn close(mut self) {
        self.jobs_tx.take(); // closes the job queue
        while self.workers.join_next().await.is_some() {}
    }
}
