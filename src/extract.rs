//! Content extraction from fetched documents.
//!
//! Extraction is a pure `raw document -> normalized text` function, pluggable
//! at [`crate::fetcher::Fetcher`] construction. [`ArticleExtractor`] knows the
//! news-article markup the URL lists point at; [`PlainTextExtractor`] passes
//! text documents through with whitespace normalization.

use scraper::{ElementRef, Html, Selector};

/// Pure transformation from a raw fetched document to normalized text.
pub trait ContentExtractor: Send + Sync {
    /// Extract the textual content of `raw`, normalized to single-space
    /// separated words.
    fn extract(&self, raw: &str) -> String;
}

/// Fragments that are navigation, media, or embed chrome rather than content.
const NOISE_SELECTORS: &str =
    ".caas-figure, .caas-img, .t-meta, .caas-carousel, .caas-iframe-wrapper, .twitter-tweet-wrapper";

/// Fragments that constitute the article body.
const CONTENT_SELECTORS: &str = "#caas-lead-header-undefined, .caas-subheadline, .caas-body p";

/// Extracts article text from the fetched HTML documents.
pub struct ArticleExtractor {
    content: Selector,
    noise: Selector,
}

impl ArticleExtractor {
    /// Create an extractor for the article markup.
    pub fn new() -> Self {
        Self {
            // Both selector lists are literals, so parsing cannot fail.
            content: Selector::parse(CONTENT_SELECTORS).expect("content selector"),
            noise: Selector::parse(NOISE_SELECTORS).expect("noise selector"),
        }
    }

    /// Whether the element is itself noise or nested inside a noise element.
    fn in_noise(&self, element: ElementRef<'_>) -> bool {
        if self.noise.matches(&element) {
            return true;
        }
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.noise.matches(&ancestor))
    }

    fn collect_text(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                out.push_str(text);
                out.push(' ');
            } else if let Some(child_element) = ElementRef::wrap(child) {
                if !self.noise.matches(&child_element) {
                    self.collect_text(child_element, out);
                }
            }
        }
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for ArticleExtractor {
    fn extract(&self, raw: &str) -> String {
        let document = Html::parse_document(raw);
        let mut collected = String::new();
        for element in document.select(&self.content) {
            if self.in_noise(element) {
                continue;
            }
            self.collect_text(element, &mut collected);
        }
        normalize_whitespace(&collected)
    }
}

/// Passes documents through unchanged apart from whitespace normalization.
pub struct PlainTextExtractor;

impl ContentExtractor for PlainTextExtractor {
    fn extract(&self, raw: &str) -> String {
        normalize_whitespace(raw)
    }
}

/// Collapse all whitespace runs into single spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
