//! # pdf-outline
//!
//! Offline heading and outline extraction from PDF documents.
//!
//! Text is pulled out of each page together with its font size and weight,
//! grouped into lines, and classified as headings by font-size rank, style
//! cues and, optionally, similarity to typical heading phrasings computed by
//! a local sentence-embedding model. The result is a flat outline of
//! `{ level, text, page }` entries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline, render, JsonFormat};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let outline = extract_outline("document.pdf")?;
//!     for entry in &outline {
//!         println!("{} {} (p. {})", entry.level, entry.text, entry.page);
//!     }
//!
//!     let json = render::to_json(&outline, JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`]: opens the PDF and interprets page content streams
//! - [`layout`]: groups text fragments into lines
//! - [`classify`]: decides which lines are headings and at what level
//! - [`outline`]: collects headings in reading order
//! - [`render`]: writes the outline as JSON
//! - [`runner`]: processes a whole directory of PDFs

pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod outline;
pub mod parser;
pub mod render;
pub mod runner;

// Re-export commonly used types
pub use classify::{
    Classification, ClassifierConfig, Embedder, HeadingClassifier, ReferenceSimilarity,
    SimilarityScorer,
};
#[cfg(feature = "embeddings")]
pub use classify::MiniLmEmbedder;
pub use config::OutlineConfig;
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf};
pub use error::{Error, Result};
pub use layout::{LayoutOptions, LineAggregator};
pub use model::{HeadingCandidate, HeadingLevel, Outline, OutlineEntry, TextLine};
pub use outline::OutlineBuilder;
pub use parser::PdfDocument;
pub use render::{JsonFormat, OutputOptions};
pub use runner::{RunEvent, RunSummary, Runner};

use std::path::Path;

use parser::PdfBackend;

/// Extract the outline of a PDF file with the default configuration and no
/// semantic scoring.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// println!("{} headings", outline.len());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Ok(OutlineExtractor::default().extract_file(path)?.outline)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_from_bytes(data: &[u8]) -> Result<Outline> {
    Ok(OutlineExtractor::default().extract_bytes(data)?.outline)
}

/// Extract the outline of a PDF file and render it as a JSON array.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{outline_to_json, JsonFormat};
///
/// let json = outline_to_json("document.pdf", JsonFormat::Compact).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn outline_to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let outline = extract_outline(path)?;
    render::to_json(&outline, format)
}

/// Result of running the pipeline over one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The outline
    pub outline: Outline,
    /// Every line with its verdict
    pub classification: Classification,
    /// Number of pages in the document
    pub page_count: usize,
    /// Pages whose content could not be decoded
    pub failed_pages: usize,
}

/// Runs the load → aggregate → classify → build pipeline.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{OutlineConfig, OutlineExtractor};
///
/// let config = OutlineConfig::new().with_max_levels(3);
/// let extraction = OutlineExtractor::new(config).extract_file("document.pdf")?;
/// println!("{} headings on {} pages",
///     extraction.outline.len(),
///     extraction.page_count);
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub struct OutlineExtractor<'a> {
    config: OutlineConfig,
    scorer: Option<&'a dyn SimilarityScorer>,
}

impl<'a> OutlineExtractor<'a> {
    /// Create an extractor without semantic scoring.
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            config,
            scorer: None,
        }
    }

    /// Settle ambiguous lines with `scorer`.
    pub fn with_scorer(mut self, scorer: &'a dyn SimilarityScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Open and process a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        let document = PdfDocument::open(path)?;
        Ok(self.extract_document(&document))
    }

    /// Process a PDF held in memory.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Extraction> {
        let document = PdfDocument::from_bytes(data)?;
        Ok(self.extract_document(&document))
    }

    /// Process an opened document.
    ///
    /// Pages whose content cannot be decoded are logged and treated as
    /// empty.
    pub fn extract_document<B: PdfBackend>(&self, document: &PdfDocument<B>) -> Extraction {
        let aggregator = LineAggregator::new(self.config.layout.clone());
        let mut lines = Vec::new();
        let mut page_count = 0;
        let mut failed_pages = 0;

        for page in document.pages() {
            page_count += 1;
            match page {
                Ok(page) => lines.extend(aggregator.aggregate(&page)),
                Err(e) => {
                    failed_pages += 1;
                    log::warn!("Skipping page {}: {}", page_count, e);
                }
            }
        }

        let mut classifier = HeadingClassifier::new(self.config.classifier.clone());
        if let Some(scorer) = self.scorer {
            classifier = classifier.with_scorer(scorer);
        }
        let classification = classifier.classify(&lines);

        let mut builder = OutlineBuilder::new();
        if self.config.output.include_title {
            builder = builder.with_title(self.config.output.title_scan_lines);
        }
        let outline = builder.build(&classification.candidates);

        Extraction {
            outline,
            classification,
            page_count,
            failed_pages,
        }
    }
}

impl Default for OutlineExtractor<'_> {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::{BackendFontInfo, ContentOp, PageId, PdfValue};
    use std::collections::BTreeMap;

    /// Two pages: a heading plus body text, then an undecodable page.
    struct Report;

    impl PdfBackend for Report {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (3, 0)), (2, (4, 0))])
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![
                BackendFontInfo {
                    name: b"F1".to_vec(),
                    base_font: "Helvetica".to_string(),
                },
                BackendFontInfo {
                    name: b"F2".to_vec(),
                    base_font: "Helvetica-Bold".to_string(),
                },
            ])
        }

        fn page_size(&self, _page: PageId) -> (f32, f32) {
            (612.0, 792.0)
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            match page.0 {
                3 => Ok(b"BT ET".to_vec()),
                _ => Err(Error::PdfParse("broken stream".to_string())),
            }
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            let name = |s: &str| PdfValue::Name(s.as_bytes().to_vec());
            let text = |s: &str| PdfValue::Str(s.as_bytes().to_vec());
            Ok(vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tf", vec![name("F2"), PdfValue::Integer(24)]),
                ContentOp::new("Td", vec![PdfValue::Integer(72), PdfValue::Integer(700)]),
                ContentOp::new("Tj", vec![text("Introduction")]),
                ContentOp::new("Tf", vec![name("F1"), PdfValue::Integer(10)]),
                ContentOp::new("Td", vec![PdfValue::Integer(0), PdfValue::Integer(-40)]),
                ContentOp::new("Tj", vec![text("This document describes the system in detail.")]),
                ContentOp::new("ET", vec![]),
            ])
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }
    }

    #[test]
    fn test_extract_document() {
        let document = PdfDocument::with_backend(Report, "1.7");
        let extraction = OutlineExtractor::default().extract_document(&document);

        assert_eq!(extraction.page_count, 2);
        assert_eq!(extraction.failed_pages, 1);
        assert_eq!(
            extraction.outline.entries,
            vec![OutlineEntry::new(HeadingLevel::H1, "Introduction", 1)]
        );
        assert_eq!(extraction.classification.candidates.len(), 2);
        assert_eq!(extraction.outline.title, None);
    }

    #[test]
    fn test_extract_document_with_title() {
        let document = PdfDocument::with_backend(Report, "1.7");
        let config = OutlineConfig::new().with_title(true);
        let extraction = OutlineExtractor::new(config).extract_document(&document);
        assert_eq!(extraction.outline.title.as_deref(), Some("Introduction"));
    }

    #[test]
    fn test_extract_bytes_rejects_non_pdf() {
        assert!(matches!(
            extract_outline_from_bytes(b"GIF89a"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(extract_outline_from_bytes(b""), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_extract_missing_file() {
        let err = extract_outline("/no/such/file.pdf").unwrap_err();
        assert!(err.is_document_error());
    }
}
