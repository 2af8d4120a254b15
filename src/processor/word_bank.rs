//! Immutable whitelist of countable words.

use std::collections::HashSet;

/// Set of accepted words: lower-case, ASCII alphabetic, length >= 3.
///
/// Built once from the raw word list and read-only afterward; shared across
/// all processing workers via `Arc`.
#[derive(Debug, Default)]
pub struct WordBank {
    words: HashSet<String>,
}

impl WordBank {
    /// Build the bank from raw candidate words.
    ///
    /// Each word is lower-cased and accepted iff it is at least 3 characters
    /// long and entirely ASCII alphabetic. Rejected words are silently
    /// dropped.
    pub fn build<I, S>(raw_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = HashSet::new();
        for raw in raw_words {
            let word = raw.as_ref().to_ascii_lowercase();
            if word.len() >= 3 && word.bytes().all(|b| b.is_ascii_lowercase()) {
                words.insert(word);
            }
        }
        Self { words }
    }

    /// Membership test for a normalized token.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of accepted words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the bank is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Render the bank as sorted newline-delimited text, for inspection.
    pub fn to_sorted_lines(&self) -> String {
        let mut words: Vec<&str> = self.words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words.join("\n")
    }
}
