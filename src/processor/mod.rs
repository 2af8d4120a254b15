//! Text processing: tokenization, filtering, and aggregation
//!
//! The processing stage is a bounded worker pool decoupled from the fetch
//! stage. Workers pull fetched text, tokenize and filter it against the
//! [`WordBank`], and emit partial word-count maps which the [`WordCounter`]
//! merges into global totals.

pub mod counter;
pub mod pool;
pub mod word_bank;

pub use counter::{WordCount, WordCounter};
pub use pool::{count_words, PartialCounts, PoolError, ProcessingPool};
pub use word_bank::WordBank;
