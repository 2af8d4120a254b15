//! HTTP client and response classification.
//!
//! One [`PageClient`] is built per [`crate::fetcher::Fetcher`] with explicit
//! timeouts so requests cannot hang indefinitely:
//! - Connect timeout: 10 seconds
//! - Request timeout: 30 seconds
//! - Pool idle timeout: twice the backoff window, so pooled connections
//!   survive a cool-down pause

use crate::fetcher::config::{
    FetcherConfig, HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Implementation-specific over-limit sentinel returned by the remote
/// service alongside the standard 429.
const RATE_LIMIT_SENTINEL: u16 = 999;

/// Transport and protocol errors from a single request attempt.
///
/// Both variants are retryable and consume the per-URL retry budget;
/// rate-limit responses are classified as [`PageOutcome::RateLimited`]
/// instead and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Connection failure, timeout, or other transport error.
    #[error("request failed: {0}")]
    Transport(String),

    /// Response carried a status outside the recognized classes.
    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),
}

/// Classified outcome of a successful HTTP exchange.
#[derive(Debug)]
pub enum PageOutcome {
    /// 200 with a body to hand to the content extractor.
    Content(String),
    /// 404 class; treated as an empty success, not a failure.
    NotFound,
    /// 429 or the 999 sentinel; a capacity signal, not a failure.
    RateLimited(u16),
}

/// Thin wrapper over [`reqwest::Client`] issuing classified GET requests.
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Build the client with the timeouts derived from `config`.
    pub fn new(config: &FetcherConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .pool_idle_timeout(config.idle_conn_timeout())
            .build()
            .map_err(|e| HttpError::Transport(format!("build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Issue a GET request and classify the response.
    pub async fn get(&self, url: &str) -> Result<PageOutcome, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| HttpError::Transport(format!("read body: {e}")))?;
                Ok(PageOutcome::Content(body))
            }
            StatusCode::NOT_FOUND => Ok(PageOutcome::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Ok(PageOutcome::RateLimited(status.as_u16())),
            _ if status.as_u16() == RATE_LIMIT_SENTINEL => {
                Ok(PageOutcome::RateLimited(status.as_u16()))
            }
            _ => {
                debug!(url, status = status.as_u16(), "Unexpected response status");
                Err(HttpError::UnexpectedStatus(status.as_u16()))
            }
        }
    }
}
