//! PDF parsing: backend access, content-stream interpretation and page
//! loading.

mod backend;
mod content;
mod loader;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
    DEFAULT_PAGE_SIZE,
};
pub use content::{extract_fragments, TextFragment, AVG_GLYPH_WIDTH};
pub(crate) use content::is_spaceless_script_char;
pub use loader::{Pages, PdfDocument, RawPage};
