//! Synthetic PDF fixtures built with lopdf's writer API.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const BODY: &str = "The quick brown fox jumps over the lazy dog again today.";

struct Run {
    text: String,
    size: f32,
    bold: bool,
    y: f32,
}

/// Builds a PDF page by page. Every text run is placed at x = 72 on its own
/// baseline. `y` is always given bottom-up.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<Vec<Run>>,
    top_down: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write pages the way browser engines do: flip the page with `cm` and
    /// place each run with a mirrored `Tm`.
    pub fn top_down(mut self) -> Self {
        self.top_down = true;
        self
    }

    /// Start a new page.
    pub fn page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// Add a run of regular text to the current page.
    pub fn text(self, text: &str, size: f32, y: f32) -> Self {
        self.run(text, size, false, y)
    }

    /// Add a run of bold text to the current page.
    pub fn bold(self, text: &str, size: f32, y: f32) -> Self {
        self.run(text, size, true, y)
    }

    /// Add `count` 10pt body lines, 14pt apart, starting at `y`.
    pub fn body(mut self, count: usize, y: f32) -> Self {
        for i in 0..count {
            self = self.text(BODY, 10.0, y - 14.0 * i as f32);
        }
        self
    }

    fn run(mut self, text: &str, size: f32, bold: bool, y: f32) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(Run {
                text: text.to_string(),
                size,
                bold,
                y,
            });
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for runs in &self.pages {
            let mut operations = Vec::new();
            if self.top_down {
                operations.push(Operation::new(
                    "cm",
                    vec![1.into(), 0.into(), 0.into(), (-1).into(), 0.into(), 792.into()],
                ));
            }
            for run in runs {
                let font = if run.bold { "F2" } else { "F1" };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![font.into(), run.size.into()]));
                if self.top_down {
                    let flipped_y: f32 = 792.0 - run.y;
                    operations.push(Operation::new(
                        "Tm",
                        vec![1.into(), 0.into(), 0.into(), (-1).into(), 72.into(), flipped_y.into()],
                    ));
                } else {
                    operations.push(Operation::new("Td", vec![72.into(), run.y.into()]));
                }
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(run.text.as_str())],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encodable content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("serializable document");
        bytes
    }

    pub fn save(&self, path: &Path) {
        std::fs::write(path, self.build()).expect("writable fixture path");
    }
}

/// 24pt bold "Introduction" followed by body text.
pub fn introduction() -> PdfBuilder {
    PdfBuilder::new()
        .page()
        .bold("Introduction", 24.0, 720.0)
        .body(6, 680.0)
}

/// Two chapters with 20pt and 16pt headings across two pages.
pub fn two_levels() -> PdfBuilder {
    PdfBuilder::new()
        .page()
        .text("Overview", 20.0, 720.0)
        .body(5, 690.0)
        .text("Background", 16.0, 600.0)
        .body(5, 575.0)
        .page()
        .text("Methods", 20.0, 720.0)
        .body(5, 690.0)
        .text("Data Collection", 16.0, 600.0)
        .body(5, 575.0)
}

/// A page with no text at all.
pub fn blank() -> PdfBuilder {
    PdfBuilder::new().page()
}

/// A file that passes the header check but cannot be parsed.
pub const CORRUPT: &[u8] = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> garbage without xref";
