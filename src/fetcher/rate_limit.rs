//! Token-bucket rate limiting shared by all fetch tasks.
//!
//! The bucket refills at `requests_per_second` with a burst capacity of 1,
//! so steady-state pacing never exceeds the configured rate. This is the
//! sole mechanism enforcing the global request rate; the backoff controller
//! handles abrupt throttling signals separately and composes with it.

use crate::shutdown::ShutdownCoordinator;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;

/// Rate limiter errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// Shutdown was requested while waiting for a token.
    #[error("cancelled while waiting for a request token")]
    Cancelled,
}

/// Token-bucket limiter gating every HTTP request.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
}

impl RateLimiter {
    /// Create a limiter granting `requests_per_second` tokens per second
    /// with burst capacity 1.
    pub fn per_second(requests_per_second: NonZeroU32) -> Self {
        let burst = NonZeroU32::new(1).unwrap();
        Self {
            inner: GovernorRateLimiter::direct(
                Quota::per_second(requests_per_second).allow_burst(burst),
            ),
        }
    }

    /// Block until a request token is available.
    ///
    /// Returns [`RateLimitError::Cancelled`] immediately if shutdown has
    /// already been requested, or as soon as it is requested mid-wait. No
    /// task may issue an HTTP request without first acquiring a token.
    pub async fn wait(&self, shutdown: &ShutdownCoordinator) -> Result<(), RateLimitError> {
        if shutdown.is_shutdown_requested() {
            return Err(RateLimitError::Cancelled);
        }
        tokio::select! {
            () = self.inner.until_ready() => Ok(()),
            () = shutdown.wait_for_shutdown() => Err(RateLimitError::Cancelled),
        }
    }
}
