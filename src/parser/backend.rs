//! The seam between the content-stream interpreter and the PDF library.
//!
//! The interpreter only sees [`PdfBackend`]: page ids, font names, decoded
//! operators and decoded strings. [`LopdfBackend`] is the production
//! implementation; tests substitute hand-built streams.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// US Letter, used when no MediaBox can be found for a page.
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Page tree depth beyond which inherited attributes are not searched.
const MAX_TREE_DEPTH: usize = 32;

/// A font resource of a page.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Resource key used by `Tf` (e.g. `F1`)
    pub name: Vec<u8>,
    /// `BaseFont` of the font dictionary, or the key when missing
    pub base_font: String,
}

/// Content-stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match *self {
            PdfValue::Integer(i) => Some(i as f32),
            PdfValue::Real(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&Object> for PdfValue {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => PdfValue::Integer(*i),
            Object::Real(r) => PdfValue::Real(*r),
            Object::Name(n) => PdfValue::Name(n.clone()),
            Object::String(bytes, _) => PdfValue::Str(bytes.clone()),
            Object::Array(items) => PdfValue::Array(items.iter().map(PdfValue::from).collect()),
            _ => PdfValue::Other,
        }
    }
}

/// One operator with its operands.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// Operand `index` as a number.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(PdfValue::as_number)
    }
}

/// Read access to an opened PDF, page by page.
pub trait PdfBackend {
    /// Page number (1-based) to page object id, in document order.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Font resources available on `page`.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// `(width, height)` in points.
    fn page_size(&self, page: PageId) -> (f32, f32);

    /// Decompressed content of `page`; empty when the page has none.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Tokenize a content stream.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a shown string through the encoding of font `font_name`.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Decode a string without font information: UTF-16BE when it starts with
/// a byte order mark, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().copied().map(char::from).collect(),
    }
}

/// [`PdfBackend`] over a fully loaded `lopdf::Document`.
pub struct LopdfBackend {
    doc: Document,
}

impl LopdfBackend {
    /// Read and parse a file. The file is closed before this returns.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Parse a document held in memory.
    ///
    /// Encrypted documents and documents without a catalog are rejected
    /// here rather than failing page by page later.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        if doc.trailer.get(b"Root").is_err() {
            return Err(Error::Corrupted("document has no catalog".to_string()));
        }
        Ok(Self { doc })
    }

    /// MediaBox of `dict`, inherited from the nearest ancestor when absent.
    fn media_box(&self, dict: &Dictionary) -> Option<[f32; 4]> {
        let mut current = dict;
        for _ in 0..MAX_TREE_DEPTH {
            if let Some(rect) = current
                .get(b"MediaBox")
                .ok()
                .and_then(|obj| self.resolve(obj).as_array().ok())
                .and_then(|items| rect_from(items))
            {
                return Some(rect);
            }
            let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }
}

fn rect_from(items: &[Object]) -> Option<[f32; 4]> {
    let nums: Vec<f32> = items
        .iter()
        .filter_map(|o| PdfValue::from(o).as_number())
        .collect();
    match nums[..] {
        [x0, y0, x1, y1] => Some([x0, y0, x1, y1]),
        _ => None,
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(format!("cannot read page fonts: {e}")))?;

        Ok(fonts
            .iter()
            .map(|(name, dict)| BackendFontInfo {
                name: name.clone(),
                base_font: dict
                    .get(b"BaseFont")
                    .and_then(Object::as_name)
                    .map(|n| String::from_utf8_lossy(n).into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(name).into_owned()),
            })
            .collect())
    }

    fn page_size(&self, page: PageId) -> (f32, f32) {
        self.doc
            .get_dictionary(page)
            .ok()
            .and_then(|dict| self.media_box(dict))
            .map(|[x0, y0, x1, y1]| ((x1 - x0).abs(), (y1 - y0).abs()))
            .filter(|&(w, h)| w > 0.0 && h > 0.0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        self.doc
            .get_page_content(page)
            .map_err(|e| Error::PdfParse(format!("cannot read page content: {e}")))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)
            .map_err(|e| Error::PdfParse(format!("malformed content stream: {e}")))?;

        Ok(content
            .operations
            .iter()
            .map(|op| ContentOp {
                operator: op.operator.clone(),
                operands: op.operands.iter().map(PdfValue::from).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        self.doc
            .get_page_fonts(page)
            .ok()
            .and_then(|fonts| {
                let encoding = fonts.get(font_name)?.get_font_encoding(&self.doc).ok()?;
                Document::decode_text(&encoding, bytes).ok()
            })
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}
