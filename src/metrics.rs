//! Run metrics for the fetch pipeline.
//!
//! Three independent atomic counters, monotonically increasing for the
//! lifetime of a [`crate::fetcher::Fetcher`] instance. They require no
//! coordination with each other and may be sampled mid-run.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters observed by fetch tasks.
#[derive(Debug, Default)]
pub struct FetchMetrics {
    processed: AtomicU64,
    errors: AtomicU64,
    rate_limited: AtomicU64,
}

/// Point-in-time view of [`FetchMetrics`], serializable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// URLs that produced a terminal success result (including empty 404s).
    pub processed: u64,
    /// URLs that exhausted their retry budget.
    pub errors: u64,
    /// Rate-limit responses observed (429 or the 999 sentinel).
    pub rate_limited: u64,
}

impl FetchMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully processed URL.
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a URL that failed after exhausting its retry budget.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rate-limit response from the remote service.
    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
        }
    }
}
