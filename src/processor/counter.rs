//! Thread-safe accumulator for merged word counts.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

/// One ranked entry in the final output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    /// The counted word.
    pub word: String,
    /// Total occurrences across all fetched documents.
    pub count: u64,
}

/// Merges partial word-count maps into global totals and answers top-N
/// queries.
///
/// Increments take the write lock; [`WordCounter::top_n`] is a pure read
/// under the read lock. Merging is commutative, so worker scheduling order
/// never changes the final ranking.
#[derive(Debug, Default)]
pub struct WordCounter {
    counts: RwLock<HashMap<String, u64>>,
}

impl WordCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the running total for `word`.
    pub fn increment(&self, word: &str, count: u64) {
        let mut counts = self.counts.write().expect("word counts lock poisoned");
        *counts.entry(word.to_string()).or_insert(0) += count;
    }

    /// Merge a partial map produced by one processing job.
    pub fn merge(&self, partial: HashMap<String, u64>) {
        let mut counts = self.counts.write().expect("word counts lock poisoned");
        for (word, count) in partial {
            *counts.entry(word).or_insert(0) += count;
        }
    }

    /// The `n` highest-count words, ties broken by ascending word order.
    ///
    /// `n = 0` yields an empty vector; `n` larger than the number of
    /// distinct words returns all of them.
    pub fn top_n(&self, n: usize) -> Vec<WordCount> {
        if n == 0 {
            return Vec::new();
        }
        let counts = self.counts.read().expect("word counts lock poisoned");
        let mut ranked: Vec<WordCount> = counts
            .iter()
            .map(|(word, count)| WordCount {
                word: word.clone(),
                count: *count,
            })
            .collect();
        ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        ranked.truncate(n);
        ranked
    }
}
