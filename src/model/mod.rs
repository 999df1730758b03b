//! Data model shared by the pipeline stages.
//!
//! Lines flow from the aggregator into the classifier, candidates from the
//! classifier into the outline builder, and the [`Outline`] is what gets
//! written to disk.

mod heading;
mod line;
mod outline;

pub use heading::{Evidence, HeadingCandidate, HeadingLevel, MAX_HEADING_LEVEL};
pub use line::{BoundingBox, TextLine};
pub use outline::{Outline, OutlineEntry};
