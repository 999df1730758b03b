//! Extraction configuration.
//!
//! All thresholds live here. Every field has a default, so a JSON config
//! file only needs the values it changes:
//!
//! ```json
//! { "classifier": { "max_levels": 3 }, "output": { "format": "compact" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::{Error, Result};
use crate::layout::LayoutOptions;
use crate::model::MAX_HEADING_LEVEL;
use crate::render::{JsonFormat, OutputOptions};

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Line aggregation
    pub layout: LayoutOptions,
    /// Heading classification
    pub classifier: ClassifierConfig,
    /// JSON output
    pub output: OutputOptions,
}

impl OutlineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Replace the layout options.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the classifier configuration.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the output options.
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Set the number of font-ranked heading levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.classifier.max_levels = levels;
        self
    }

    /// Set the header/footer margin (fraction of the page height).
    pub fn with_header_footer_margin(mut self, margin: f32) -> Self {
        self.layout.header_footer_margin = margin;
        self
    }

    /// Set the JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.output.format = format;
        self
    }

    /// Include the detected title in the output.
    pub fn with_title(mut self, include: bool) -> Self {
        self.output.include_title = include;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        let classifier = &self.classifier;

        // One level stays free for style and semantic headings below the
        // deepest ranked size.
        let deepest_ranked = MAX_HEADING_LEVEL as usize - 1;
        check(
            (1..=deepest_ranked).contains(&classifier.max_levels),
            format!("max_levels must be between 1 and {deepest_ranked}"),
        )?;
        check(classifier.size_precision > 0.0, "size_precision must be positive")?;
        check(classifier.min_size_delta >= 0.0, "min_size_delta must not be negative")?;
        check(
            classifier.min_chars <= classifier.max_chars,
            "min_chars must not exceed max_chars",
        )?;
        check(classifier.max_words > 0, "max_words must be positive")?;
        check(
            (0.0..=1.0).contains(&classifier.min_alpha_ratio),
            "min_alpha_ratio must be between 0 and 1",
        )?;
        check(classifier.isolation_ratio >= 0.0, "isolation_ratio must not be negative")?;
        check(
            (-1.0..=1.0).contains(&classifier.semantic_threshold),
            "semantic_threshold must be between -1 and 1",
        )?;
        check(
            classifier.max_headings_per_page != Some(0),
            "max_headings_per_page must be positive when set",
        )?;

        check(layout.tolerance_ratio >= 0.0, "tolerance_ratio must not be negative")?;
        check(layout.min_tolerance >= 0.0, "min_tolerance must not be negative")?;
        check(layout.space_gap_ratio >= 0.0, "space_gap_ratio must not be negative")?;
        check(
            (0.0..0.5).contains(&layout.header_footer_margin),
            "header_footer_margin must be in [0, 0.5)",
        )?;

        check(
            self.output.title_scan_lines > 0,
            "title_scan_lines must be positive",
        )
    }
}

fn check(ok: bool, message: impl Into<String>) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::Config(message.into()))
    }
}
