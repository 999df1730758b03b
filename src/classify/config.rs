//! Classifier thresholds.

use serde::{Deserialize, Serialize};

use super::semantic::DEFAULT_REFERENCE_PHRASES;

/// Thresholds used by [`HeadingClassifier`](super::HeadingClassifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of distinct heading sizes mapped to H1..HK
    pub max_levels: usize,

    /// A heading size must exceed the body size by more than this (points)
    pub min_size_delta: f32,

    /// Bucket width of the font-size histogram (points)
    pub size_precision: f32,

    /// Minimum heading length in characters
    pub min_chars: usize,

    /// Maximum heading length in characters
    pub max_chars: usize,

    /// Maximum heading length in words
    pub max_words: usize,

    /// Maximum words for a style-override candidate
    pub style_max_words: usize,

    /// Minimum share of alphabetic characters among non-space characters
    pub min_alpha_ratio: f32,

    /// Gap to both neighbours, relative to the font size, that makes a line
    /// isolated
    pub isolation_ratio: f32,

    /// Minimum similarity for an ambiguous line to be accepted
    pub semantic_threshold: f32,

    /// Heading phrasings ambiguous lines are compared against
    pub reference_phrases: Vec<String>,

    /// Reject page numbers, running headers, captions and similar lines
    pub filter_headers_footers: bool,

    /// Keep only the best-scoring headings of each page
    pub max_headings_per_page: Option<usize>,
}

impl ClassifierConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of font-ranked levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Set the minimum size difference over body text.
    pub fn with_min_size_delta(mut self, delta: f32) -> Self {
        self.min_size_delta = delta;
        self
    }

    /// Set the similarity threshold for ambiguous lines.
    pub fn with_semantic_threshold(mut self, threshold: f32) -> Self {
        self.semantic_threshold = threshold;
        self
    }

    /// Replace the reference phrases.
    pub fn with_reference_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable header/footer and caption filtering.
    pub fn with_header_footer_filter(mut self, enabled: bool) -> Self {
        self.filter_headers_footers = enabled;
        self
    }

    /// Cap the number of headings per page.
    pub fn with_max_headings_per_page(mut self, max: usize) -> Self {
        self.max_headings_per_page = Some(max);
        self
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_levels: 4,
            min_size_delta: 1.0,
            size_precision: 0.5,
            min_chars: 2,
            max_chars: 150,
            max_words: 12,
            style_max_words: 8,
            min_alpha_ratio: 0.5,
            isolation_ratio: 1.5,
            semantic_threshold: 0.5,
            reference_phrases: DEFAULT_REFERENCE_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            filter_headers_footers: true,
            max_headings_per_page: None,
        }
    }
}
