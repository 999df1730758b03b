//! Line aggregation options.

use serde::{Deserialize, Serialize};

/// Options controlling how fragments are grouped into lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Baseline tolerance as a fraction of the font size
    pub tolerance_ratio: f32,

    /// Lower bound of the baseline tolerance, in points
    pub min_tolerance: f32,

    /// Horizontal gap, relative to the average glyph width, above which a
    /// space is inserted between fragments
    pub space_gap_ratio: f32,

    /// Fraction of the page height at the top and bottom whose lines are
    /// dropped as running headers/footers (0 = keep everything)
    pub header_footer_margin: f32,
}

impl LayoutOptions {
    /// Create layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline tolerance ratio.
    pub fn with_tolerance_ratio(mut self, ratio: f32) -> Self {
        self.tolerance_ratio = ratio;
        self
    }

    /// Set the minimum baseline tolerance.
    pub fn with_min_tolerance(mut self, points: f32) -> Self {
        self.min_tolerance = points;
        self
    }

    /// Set the space insertion threshold.
    pub fn with_space_gap_ratio(mut self, ratio: f32) -> Self {
        self.space_gap_ratio = ratio;
        self
    }

    /// Drop lines within `margin` (fraction of page height) of the top or
    /// bottom edge.
    pub fn with_header_footer_margin(mut self, margin: f32) -> Self {
        self.header_footer_margin = margin;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            tolerance_ratio: 0.3,
            min_tolerance: 1.0,
            space_gap_ratio: 0.2,
            header_footer_margin: 0.0,
        }
    }
}
