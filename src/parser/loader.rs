//! Document loading with lazy page iteration.

use std::collections::btree_map;
use std::path::Path;

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::content::{extract_fragments, TextFragment};
use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::Result;

/// One page's raw text fragments plus its geometry.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// 0-based page index
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text fragments in content-stream order
    pub fragments: Vec<TextFragment>,
}

/// An opened PDF document.
///
/// Generic over the backend so the page walk can run against a mock.
pub struct PdfDocument<B: PdfBackend = LopdfBackend> {
    backend: B,
    version: String,
}

impl PdfDocument<LopdfBackend> {
    /// Open a PDF file.
    ///
    /// The header is checked first; the file is then read and parsed in
    /// one go, so no handle outlives this call.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let version = detect_format_from_path(path)?;
        let backend = LopdfBackend::load_file(path)?;
        log::debug!("Opened {} (PDF {})", path.display(), version);
        Ok(Self { backend, version })
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version = detect_format_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self { backend, version })
    }
}

impl<B: PdfBackend> PdfDocument<B> {
    /// Wrap an already loaded backend.
    pub fn with_backend(backend: B, version: impl Into<String>) -> Self {
        Self {
            backend,
            version: version.into(),
        }
    }

    /// PDF version from the file header.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.backend.pages().len()
    }

    /// Iterate pages in order; each page's content is decoded on demand.
    pub fn pages(&self) -> Pages<'_, B> {
        Pages {
            backend: &self.backend,
            inner: self.backend.pages().into_iter(),
            index: 0,
        }
    }
}

/// Lazy page iterator returned by [`PdfDocument::pages`].
pub struct Pages<'a, B: PdfBackend> {
    backend: &'a B,
    inner: btree_map::IntoIter<u32, PageId>,
    index: usize,
}

impl<B: PdfBackend> Iterator for Pages<'_, B> {
    type Item = Result<RawPage>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, page_id) = self.inner.next()?;
        let index = self.index;
        self.index += 1;

        let (width, height) = self.backend.page_size(page_id);
        Some(
            extract_fragments(self.backend, page_id).map(|fragments| RawPage {
                index,
                width,
                height,
                fragments,
            }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::backend::{BackendFontInfo, ContentOp, PdfValue};
    use std::collections::BTreeMap;

    /// Three pages; the second one has a broken content stream.
    struct ThreePages;

    impl PdfBackend for ThreePages {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (10, 0)), (2, (11, 0)), (3, (12, 0))])
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![])
        }

        fn page_size(&self, _page: PageId) -> (f32, f32) {
            (595.0, 842.0)
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            match page.0 {
                11 => Err(Error::PdfParse("bad stream".to_string())),
                12 => Ok(Vec::new()),
                _ => Ok(b"BT (x) Tj ET".to_vec()),
            }
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(vec![
                ContentOp::new("BT", vec![]),
                ContentOp::new("Tj", vec![PdfValue::Str(b"Hello".to_vec())]),
                ContentOp::new("ET", vec![]),
            ])
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }
    }

    #[test]
    fn test_pages_are_lazy_and_ordered() {
        let doc = PdfDocument::with_backend(ThreePages, "1.7");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.version(), "1.7");

        let pages: Vec<_> = doc.pages().collect();
        assert_eq!(pages.len(), 3);

        let first = pages[0].as_ref().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.height, 842.0);
        assert_eq!(first.fragments[0].text, "Hello");

        assert!(matches!(pages[1], Err(Error::PdfParse(_))));

        let third = pages[2].as_ref().unwrap();
        assert_eq!(third.index, 2);
        assert!(third.fragments.is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let result = PdfDocument::open("/definitely/not/here.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let result = PdfDocument::from_bytes(b"PK\x03\x04 zip archive");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
