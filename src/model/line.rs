//! Text lines.

use serde::Serialize;

/// Axis-aligned box in PDF user space (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Create a box, normalizing the corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A logical line of text on one page, with its dominant font attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    /// 0-based page index
    pub page_index: usize,
    /// Normalized text of the line
    pub text: String,
    /// Dominant font size in points
    pub font_size: f32,
    /// Whether the dominant face is bold
    pub is_bold: bool,
    /// Extent of the line on the page
    pub bounding_box: BoundingBox,
    /// Baseline of the line (y of its anchor fragment)
    pub baseline: f32,
}

impl TextLine {
    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
