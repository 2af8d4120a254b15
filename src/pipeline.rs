//! Fan-out/fan-in wiring of the fetch and processing stages.
//!
//! URLs flow into the fetcher's bounded task pool; terminal results flow
//! through a bounded channel into the processing pool; partial word counts
//! are merged into the [`WordCounter`]. The two pools are sized and
//! backpressured independently: if processing lags, submission blocks, which
//! in turn fills the result channel and throttles the fetch stage.
//!
//! Cancellation stops new work promptly, but results already queued are
//! still drained and counted.

use crate::extract::ContentExtractor;
use crate::fetcher::{Fetcher, FetcherConfig, FetcherError, FetchResult};
use crate::processor::{ProcessingPool, WordBank, WordCount, WordCounter};
use crate::shutdown::SharedShutdown;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Fetcher construction failed (misconfiguration is fatal to the run).
    #[error(transparent)]
    Fetcher(#[from] FetcherError),

    /// The merge task panicked.
    #[error("count merge task failed: {0}")]
    Merge(String),
}

/// Final output of a run: the ranking plus the run metrics.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Highest-count whitelisted words, ranked.
    pub top_words: Vec<WordCount>,
    /// Wall-clock duration of the run.
    pub duration_seconds: f64,
    /// URLs that produced a terminal success result.
    pub processed: u64,
    /// URLs that exhausted their retry budget.
    pub errors: u64,
    /// Rate-limit responses observed.
    pub rate_limited: u64,
}

/// The complete fetch-and-aggregate pipeline for one run.
pub struct Pipeline {
    config: FetcherConfig,
    bank: Arc<WordBank>,
    extractor: Arc<dyn ContentExtractor>,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        config: FetcherConfig,
        bank: Arc<WordBank>,
        extractor: Arc<dyn ContentExtractor>,
    ) -> Self {
        Self {
            config,
            bank,
            extractor,
        }
    }

    /// Run the pipeline over `urls` and return the top-`top_n` ranking.
    ///
    /// `on_result` is invoked for every terminal fetch result as it is
    /// drained, in completion order; the CLI uses it to advance the progress
    /// bar. A failed URL never stops the rest of the batch, and metrics are
    /// reported regardless of how many URLs failed.
    pub async fn execute<F>(
        &self,
        urls: Vec<String>,
        shutdown: SharedShutdown,
        top_n: usize,
        mut on_result: F,
    ) -> Result<PipelineReport, PipelineError>
    where
        F: FnMut(&FetchResult) + Send,
    {
        let started = Instant::now();
        info!(
            urls = urls.len(),
            workers = self.config.worker_count,
            bank_words = self.bank.len(),
            "Pipeline starting"
        );

        let fetcher = Arc::new(Fetcher::new(
            self.config.clone(),
            Arc::clone(&self.extractor),
        )?);

        let mut pool = ProcessingPool::new(Arc::clone(&self.bank), self.config.worker_count);
        pool.start();
        let mut partials = pool.take_results();

        let counter = Arc::new(WordCounter::new());
        let merge = tokio::spawn({
            let counter = Arc::clone(&counter);
            async move {
                while let Some(partial) = partials.recv().await {
                    counter.merge(partial);
                }
            }
        });

        let mut results = fetcher.fetch_all(shutdown.clone(), urls);
        while let Some(result) = results.recv().await {
            on_result(&result);
            if let Some(error) = &result.error {
                debug!(url = %result.url, error = %error, "URL failed terminally");
                continue;
            }
            if result.content.is_empty() {
                continue;
            }
            // Blocks when the job queue is full: the backpressure point
            // that throttles fetching if processing lags. Workers are never
            // cancelled, so a blocked submit always unblocks.
            if pool.submit(result.content).await.is_err() {
                break;
            }
        }

        pool.close().await;
        merge
            .await
            .map_err(|e| PipelineError::Merge(e.to_string()))?;

        let metrics = fetcher.metrics();
        let report = PipelineReport {
            top_words: counter.top_n(top_n),
            duration_seconds: started.elapsed().as_secs_f64(),
            processed: metrics.processed,
            errors: metrics.errors,
            rate_limited: metrics.rate_limited,
        };
        info!(
            duration_secs = report.duration_seconds,
            processed = report.processed,
            errors = report.errors,
            rate_limited = report.rate_limited,
            "Pipeline finished"
        );
        Ok(report)
    }
}
