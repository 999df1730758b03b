//! JSON rendering for outlines.

use serde::Serialize;

use super::{JsonFormat, OutputOptions};
use crate::error::{Error, Result};
use crate::model::{Outline, OutlineEntry};

#[derive(Serialize)]
struct TitledOutline<'a> {
    title: &'a str,
    outline: &'a [OutlineEntry],
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Render the outline entries as a JSON array of `{level, text, page}`.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    serialize(outline.entries.as_slice(), format)
}

/// Render `{ "title": ..., "outline": [...] }`; a missing title is `""`.
pub fn to_json_with_title(outline: &Outline, format: JsonFormat) -> Result<String> {
    serialize(
        &TitledOutline {
            title: outline.title.as_deref().unwrap_or_default(),
            outline: &outline.entries,
        },
        format,
    )
}

/// Render according to `options`.
pub fn render_outline(outline: &Outline, options: &OutputOptions) -> Result<String> {
    if options.include_title {
        to_json_with_title(outline, options.format)
    } else {
        to_json(outline, options.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;

    fn sample() -> Outline {
        Outline {
            title: Some("Annual Report".to_string()),
            entries: vec![
                OutlineEntry::new(HeadingLevel::H1, "Introduction", 1),
                OutlineEntry::new(HeadingLevel::H2, "Scope", 2),
            ],
        }
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"[{"level":"H1","text":"Introduction","page":1},{"level":"H2","text":"Scope","page":2}]"#
        );
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n')); // Pretty has newlines
        let parsed: Vec<OutlineEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample().entries);
    }

    #[test]
    fn test_empty_outline_is_empty_array() {
        let json = to_json(&Outline::new(), JsonFormat::Compact).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_with_title_shape() {
        let options = OutputOptions::new().compact().with_title(true);
        let json = render_outline(&sample(), &options).unwrap();
        assert!(json.starts_with(r#"{"title":"Annual Report","outline":[{"level":"H1""#));

        let json = render_outline(&Outline::new(), &options).unwrap();
        assert_eq!(json, r#"{"title":"","outline":[]}"#);
    }
}
