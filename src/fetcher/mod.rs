//! Concurrent document retrieval with rate limiting and retry
//!
//! The fetcher owns a bounded pool of fetch tasks, one per input URL, each
//! running an independent retry state machine:
//!
//! 1. Wait out any active backoff window (rate-limit cool-down).
//! 2. Acquire a token from the shared rate limiter.
//! 3. Issue the request and classify the outcome:
//!    - success / not-found: emit a terminal result
//!    - rate limit (429 or 999): arm the shared backoff window and retry
//!      the same attempt index; rate limits never consume retry budget
//!    - anything else: exponential delay, then retry with the next attempt
//!      index, up to `max_retries` attempts
//!
//! Exactly one terminal [`FetchResult`] is produced per URL (success,
//! empty-content not-found, or final error) unless the run is cancelled
//! first. A result that cannot be placed into a full buffer during shutdown
//! is dropped rather than blocking forever; this is an accepted at-most-once
//! delivery trade-off, not a bug.

use crate::extract::ContentExtractor;
use crate::metrics::{FetchMetrics, MetricsSnapshot};
use crate::shutdown::{SharedShutdown, ShutdownCoordinator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub mod backoff;
pub mod config;
pub mod http;
pub mod rate_limit;

pub use backoff::BackoffController;
pub use config::FetcherConfig;
pub use rate_limit::{RateLimitError, RateLimiter};

use http::{PageClient, PageOutcome};

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Configuration rejected by [`FetcherConfig::validate`].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Terminal outcome for one input URL.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    /// The input URL this result belongs to.
    pub url: String,
    /// Extracted content; empty for not-found and error results.
    pub content: String,
    /// When the terminal attempt finished.
    pub fetched_at: DateTime<Utc>,
    /// The final error, if the retry budget was exhausted.
    pub error: Option<String>,
    /// Index of the attempt that produced this result (0-based).
    pub retry_count: u32,
}

impl FetchResult {
    fn success(url: String, content: String, retry_count: u32) -> Self {
        Self {
            url,
            content,
            fetched_at: Utc::now(),
            error: None,
            retry_count,
        }
    }

    fn failed(url: String, retry_count: u32, error: String) -> Self {
        Self {
            url,
            content: String::new(),
            fetched_at: Utc::now(),
            error: Some(error),
            retry_count,
        }
    }
}

/// Retrieves documents with bounded concurrency, rate limiting, global
/// backoff cooperation, and per-URL retry.
///
/// A `Fetcher` is constructed once per run and owns its rate limiter,
/// backoff controller, and metrics for the run's duration. It is not
/// designed for reuse across unrelated batches: the counters are never
/// reset.
pub struct Fetcher {
    client: PageClient,
    limiter: RateLimiter,
    backoff: Arc<BackoffController>,
    metrics: FetchMetrics,
    extractor: Arc<dyn ContentExtractor>,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a fetcher, validating `config` first.
    pub fn new(
        config: FetcherConfig,
        extractor: Arc<dyn ContentExtractor>,
    ) -> Result<Self, FetcherError> {
        config.validate().map_err(FetcherError::InvalidConfig)?;
        let client = PageClient::new(&config).map_err(|e| FetcherError::Client(e.to_string()))?;
        // validate() guarantees a non-zero rate.
        let rate = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| FetcherError::InvalidConfig("requests_per_second is zero".into()))?;
        Ok(Self {
            client,
            limiter: RateLimiter::per_second(rate),
            backoff: BackoffController::new(config.backoff_duration),
            metrics: FetchMetrics::new(),
            extractor,
            config,
        })
    }

    /// Snapshot the run metrics. Safe to call mid-run.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Fetch every URL, emitting results as they complete.
    ///
    /// At most `worker_count` URLs are in flight simultaneously, enforced by
    /// an admission semaphore. Results complete out of input order. The
    /// channel closes once every admitted URL has reached a terminal state;
    /// cancellation stops admission and in-flight waits exit promptly, so
    /// the channel still closes without hanging.
    pub fn fetch_all(
        self: &Arc<Self>,
        shutdown: SharedShutdown,
        urls: Vec<String>,
    ) -> mpsc::Receiver<FetchResult> {
        let (results_tx, results_rx) = mpsc::channel(self.config.result_buffer.max(1));
        let admission = Arc::new(Semaphore::new(self.config.worker_count));
        let fetcher = Arc::clone(self);

        tokio::spawn(async move {
            let mut tasks = JoinSet::new();
            for url in urls {
                if shutdown.is_shutdown_requested() {
                    break;
                }
                let permit = tokio::select! {
                    permit = Arc::clone(&admission).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                    () = shutdown.wait_for_shutdown() => break,
                };

                let fetcher = Arc::clone(&fetcher);
                let shutdown = shutdown.clone();
                let results_tx = results_tx.clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    fetcher.fetch_url(url, shutdown, results_tx).await;
                });
            }
            while tasks.join_next().await.is_some() {}
            // results_tx drops here, closing the stream once all tasks drain.
        });

        results_rx
    }

    /// Per-URL retry state machine.
    async fn fetch_url(
        &self,
        url: String,
        shutdown: SharedShutdown,
        results: mpsc::Sender<FetchResult>,
    ) {
        let mut attempt: u32 = 0;
        loop {
            if shutdown.is_shutdown_requested() {
                return;
            }

            if self.backoff.is_active() && self.backoff.await_release(&shutdown).await.is_err() {
                return;
            }

            if let Err(e) = self.limiter.wait(&shutdown).await {
                if shutdown.is_shutdown_requested() {
                    return;
                }
                self.deliver(&results, &shutdown, FetchResult::failed(url, attempt, e.to_string()))
                    .await;
                return;
            }

            match self.client.get(&url).await {
                Ok(PageOutcome::Content(body)) => {
                    let content = self.extractor.extract(&body);
                    self.metrics.record_processed();
                    self.deliver(&results, &shutdown, FetchResult::success(url, content, attempt))
                        .await;
                    return;
                }
                Ok(PageOutcome::NotFound) => {
                    // Missing documents are an empty success, not a failure.
                    self.metrics.record_processed();
                    self.deliver(
                        &results,
                        &shutdown,
                        FetchResult::success(url, String::new(), attempt),
                    )
                    .await;
                    return;
                }
                Ok(PageOutcome::RateLimited(status)) => {
                    // A capacity signal, not a failure: arm the shared window
                    // and retry the same attempt index so rate limits never
                    // starve genuine errors of their retry allowance.
                    self.metrics.record_rate_limited();
                    debug!(url = %url, status, "Rate limited, arming backoff");
                    self.backoff.arm();
                }
                Err(e) => {
                    if attempt + 1 >= self.config.max_retries {
                        warn!(url = %url, attempt, error = %e, "Retries exhausted");
                        self.metrics.record_error();
                        self.deliver(
                            &results,
                            &shutdown,
                            FetchResult::failed(url, attempt, e.to_string()),
                        )
                        .await;
                        return;
                    }
                    let delay = self.config.retry_backoff(attempt);
                    debug!(url = %url, attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = shutdown.wait_for_shutdown() => return,
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Place a result into the bounded channel.
    ///
    /// Blocks while the buffer is full. Once shutdown fires, falls back to a
    /// non-blocking send and drops the result if the buffer is still full;
    /// blocking here instead would risk deadlocking shutdown against a
    /// stalled consumer.
    async fn deliver(
        &self,
        results: &mpsc::Sender<FetchResult>,
        shutdown: &ShutdownCoordinator,
        result: FetchResult,
    ) {
        let reserved = tokio::select! {
            permit = results.reserve() => Some(permit),
            () = shutdown.wait_for_shutdown() => None,
        };
        match reserved {
            Some(Ok(permit)) => permit.send(result),
            Some(Err(_)) => {} // consumer dropped the stream
            None => match results.try_send(result) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(dropped)) => {
                    debug!(url = %dropped.url, "Result buffer full during shutdown, dropping result");
                }
            },
        }
    }
}
