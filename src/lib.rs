//! # Word Counter Library
//!
//! A concurrent pipeline that fetches a large list of remote documents under
//! a strict external rate limit, extracts their textual content, and produces
//! a frequency ranking of whitelisted words — surviving transient failures
//! (HTTP 429s, network errors) without crashing or losing already-gathered
//! work.
//!
//! ## Features
//!
//! - **Bounded concurrency**: fetch and processing stages are independently
//!   sized worker pools joined by bounded queues
//! - **Rate limiting**: a shared token bucket paces every request
//! - **Adaptive backoff**: rate-limit responses arm a process-wide cool-down
//!   window that pauses all fetch tasks
//! - **Per-URL retry**: exponential backoff for genuine errors, unlimited
//!   budget-free retries for throttling signals
//! - **Graceful cancellation**: Ctrl+C or a run deadline stops new requests
//!   while already-queued results are still counted
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use word_counter::extract::ArticleExtractor;
//! use word_counter::fetcher::FetcherConfig;
//! use word_counter::pipeline::Pipeline;
//! use word_counter::processor::WordBank;
//! use word_counter::shutdown::ShutdownCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bank = Arc::new(WordBank::build(["hello", "world", "test"]));
//! let pipeline = Pipeline::new(
//!     FetcherConfig::default(),
//!     bank,
//!     Arc::new(ArticleExtractor::new()),
//! );
//!
//! let shutdown = ShutdownCoordinator::shared();
//! let report = pipeline
//!     .execute(
//!         vec!["https://example.com/article".to_string()],
//!         shutdown,
//!         10,
//!         |_| {},
//!     )
//!     .await?;
//! println!("{:?}", report.top_words);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Concurrent retrieval with rate limiting, backoff, and retry
//! - [`extract`] - Pluggable document-to-text extraction
//! - [`processor`] - Tokenization workers, word bank, and count aggregation
//! - [`pipeline`] - Fan-out/fan-in wiring of the two stages
//! - [`metrics`] - Atomic run counters, observable mid-run
//! - [`shutdown`] - Single cancellation signal shared by every task
//! - [`input`] - Newline-delimited file loading
//! - [`cli`] - Command-line surface

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Content extraction from fetched documents
pub mod extract;

/// Concurrent document retrieval
pub mod fetcher;

/// Input file loading
pub mod input;

/// Run metrics
pub mod metrics;

/// Fetch-and-aggregate pipeline wiring
pub mod pipeline;

/// Tokenization and word counting
pub mod processor;

/// Graceful shutdown coordination
pub mod shutdown;

// Re-export commonly used types
pub use fetcher::{Fetcher, FetchResult, FetcherConfig};
pub use pipeline::{Pipeline, PipelineReport};
pub use processor::{WordBank, WordCount, WordCounter};
