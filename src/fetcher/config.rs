//! Fetcher configuration constants and validation

use std::time::Duration;

/// Default steady-state request rate against the remote service.
/// 4 requests per second keeps a 40k-URL batch under three hours while
/// staying clear of the service's throttling threshold.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 4;

/// Default shared cool-down window after a rate-limit response.
/// ~150s is a good balance between respecting the throttle and not stalling
/// the whole batch for too long.
pub const DEFAULT_BACKOFF_SECS: u64 = 150;

/// Default retry budget per URL for genuine errors.
/// Rate-limit responses never consume this budget.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential retry backoff.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Default bound on simultaneously in-flight URLs.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Default capacity of the fetch result channel.
pub const DEFAULT_RESULT_BUFFER: usize = 100;

/// HTTP connect timeout (seconds) - time to establish the TCP connection.
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds) - overall time for one request.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Immutable configuration for a [`crate::fetcher::Fetcher`].
///
/// Constructed once per run and validated before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Token-bucket refill rate shared by all fetch tasks.
    pub requests_per_second: u32,
    /// Length of the shared cool-down window armed on rate-limit responses.
    pub backoff_duration: Duration,
    /// Attempts per URL for non-rate-limit failures. Must be at least 1.
    pub max_retries: u32,
    /// Base delay for exponential retry backoff.
    pub retry_delay: Duration,
    /// Bound on simultaneously in-flight URLs. Must be at least 1.
    pub worker_count: usize,
    /// Capacity of the result channel. A value of 0 is coerced to 1 since
    /// the channel requires a positive capacity.
    pub result_buffer: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            backoff_duration: Duration::from_secs(DEFAULT_BACKOFF_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            worker_count: DEFAULT_WORKER_COUNT,
            result_buffer: DEFAULT_RESULT_BUFFER,
        }
    }
}

impl FetcherConfig {
    /// Validate the configuration.
    ///
    /// Invariants: all durations positive, retry budget and worker count at
    /// least 1, request rate non-zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.requests_per_second == 0 {
            return Err("requests_per_second must be at least 1".to_string());
        }
        if self.backoff_duration.is_zero() {
            return Err("backoff_duration must be positive".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        if self.retry_delay.is_zero() {
            return Err("retry_delay must be positive".to_string());
        }
        if self.worker_count == 0 {
            return Err("worker_count must be at least 1".to_string());
        }
        Ok(())
    }

    /// Exponential delay for retrying a genuine error: `retry_delay * 2^attempt`.
    ///
    /// The attempt index is bounded by `max_retries`, which caps the delay
    /// implicitly.
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_delay * 2u32.saturating_pow(attempt)
    }

    /// Idle lifetime for pooled connections. Twice the backoff window so
    /// connections survive a cool-down pause.
    pub fn idle_conn_timeout(&self) -> Duration {
        self.backoff_duration * 2
    }
}
