//! Run command: load inputs, execute the pipeline, report results.

use crate::cli::CliError;
use crate::extract::ArticleExtractor;
use crate::fetcher::config::{
    DEFAULT_BACKOFF_SECS, DEFAULT_MAX_RETRIES, DEFAULT_REQUESTS_PER_SECOND, DEFAULT_RESULT_BUFFER,
    DEFAULT_RETRY_DELAY_SECS, DEFAULT_WORKER_COUNT,
};
use crate::fetcher::FetcherConfig;
use crate::input;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::processor::WordBank;
use crate::shutdown::SharedShutdown;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on fetch concurrency to prevent self-inflicted rate limiting.
const MAX_WORKERS: usize = 256;

/// Default overall execution deadline in hours.
const DEFAULT_TIMEOUT_HOURS: u64 = 12;

/// Parse and validate a worker count.
fn parse_workers(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value == 0 {
        return Err("workers must be at least 1".to_string());
    }
    if value > MAX_WORKERS {
        return Err(format!("workers {value} exceeds maximum of {MAX_WORKERS}"));
    }
    Ok(value)
}

/// Count whitelisted word frequencies across a list of remote documents.
#[derive(Debug, Parser)]
#[command(name = "word-counter", version, about)]
pub struct Cli {
    /// Newline-delimited file of URLs to fetch.
    #[arg(long)]
    pub urls: PathBuf,

    /// Newline-delimited file of candidate words for the word bank.
    #[arg(long)]
    pub words: PathBuf,

    /// Number of top-ranked words to report.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the normalized word bank here for inspection.
    #[arg(long)]
    pub bank_output: Option<PathBuf>,

    /// Steady-state request rate against the remote service.
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_SECOND)]
    pub requests_per_second: u32,

    /// Cool-down window after a rate-limit response, in seconds.
    #[arg(long, default_value_t = DEFAULT_BACKOFF_SECS)]
    pub backoff_secs: u64,

    /// Attempts per URL for non-rate-limit failures.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_SECS * 1000)]
    pub retry_delay_ms: u64,

    /// Concurrent fetch and processing workers.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT, value_parser = parse_workers)]
    pub workers: usize,

    /// Capacity of the fetch result buffer.
    #[arg(long, default_value_t = DEFAULT_RESULT_BUFFER)]
    pub result_buffer: usize,

    /// Overall execution deadline in hours.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_HOURS)]
    pub timeout_hours: u64,

    /// Suppress the progress bar.
    #[arg(long)]
    pub quiet: bool,
}

impl Cli {
    fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            requests_per_second: self.requests_per_second,
            backoff_duration: Duration::from_secs(self.backoff_secs),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            worker_count: self.workers,
            result_buffer: self.result_buffer,
        }
    }

    /// Execute the run and emit the JSON report.
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        if self.timeout_hours == 0 {
            return Err(CliError::InvalidArgument(
                "timeout-hours must be at least 1".to_string(),
            ));
        }
        shutdown.deadline(Duration::from_secs(self.timeout_hours * 3600));

        let urls = input::read_lines(&self.urls)?;
        if urls.is_empty() {
            warn!(path = %self.urls.display(), "URL list is empty");
        }

        // Failure to read the word list is fatal to the run.
        let raw_words = input::read_lines(&self.words)?;
        let bank = Arc::new(WordBank::build(&raw_words));
        info!(
            candidates = raw_words.len(),
            accepted = bank.len(),
            "Word bank built"
        );
        if let Some(path) = &self.bank_output {
            input::write_string(path, &bank.to_sorted_lines())?;
        }

        let progress = if self.quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(urls.len() as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
            );
            bar.set_message("Fetching URLs");
            bar
        };

        let pipeline = Pipeline::new(self.fetcher_config(), bank, Arc::new(ArticleExtractor::new()));
        let report = {
            let progress = progress.clone();
            pipeline
                .execute(urls, shutdown, self.top, move |_| progress.inc(1))
                .await?
        };
        progress.finish_and_clear();

        self.emit_report(&report)
    }

    fn emit_report(&self, report: &PipelineReport) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(report)?;
        match &self.output {
            Some(path) => {
                input::write_string(path, &json)?;
                info!(path = %path.display(), "Report written");
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
