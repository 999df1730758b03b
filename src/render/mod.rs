//! Rendering outlines to JSON.

mod json;
mod options;

pub use json::{render_outline, to_json, to_json_with_title};
pub use options::{JsonFormat, OutputOptions};
