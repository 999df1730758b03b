//! Output options.

use serde::{Deserialize, Serialize};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Options for writing outlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Pretty or compact JSON
    pub format: JsonFormat,

    /// Emit `{ "title", "outline" }` instead of a bare array
    pub include_title: bool,

    /// Number of leading lines searched for the title
    pub title_scan_lines: usize,
}

impl OutputOptions {
    /// Create output options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Single-line JSON.
    pub fn compact(mut self) -> Self {
        self.format = JsonFormat::Compact;
        self
    }

    /// Include the detected title in the output.
    pub fn with_title(mut self, include: bool) -> Self {
        self.include_title = include;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: JsonFormat::Pretty,
            include_title: false,
            title_scan_lines: 4,
        }
    }
}
