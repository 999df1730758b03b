//! Content-stream interpretation.
//!
//! Walks the text operators of a page and produces [`TextFragment`]s with
//! position and font information. Positions are taken from the text
//! rendering matrix (text matrix times CTM), so pages drawn under a flipped
//! or scaled `cm` still come out in default user space.

use std::collections::HashMap;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};
use crate::error::Result;

/// Average glyph advance as a fraction of the font size, used when the
/// font's real metrics are not consulted.
pub const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments (thousandths of text space) larger than this read as a
/// word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A run of text shown by a single text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline), default user space (origin bottom-left)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Font size in points, scaled by the text matrix
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font name indicates a bold face
    pub is_bold: bool,
    /// Whether the font name indicates an italic face
    pub is_italic: bool,
}

impl TextFragment {
    /// Create a fragment, estimating its width from the glyph count.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let is_bold = ["bold", "black", "heavy", "semibold", "demi"]
            .iter()
            .any(|w| lower.contains(w));
        let is_italic = lower.contains("italic") || lower.contains("oblique");
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }

    /// Right edge of the fragment.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Approximate bottom (descender) of the fragment.
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Approximate top (ascender) of the fragment.
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }
}

/// Text matrix plus line matrix, as maintained between `BT` and `ET`.
#[derive(Debug, Clone, Copy)]
struct TextState {
    tm: [f32; 6],
    tlm: [f32; 6],
    leading: Option<f32>,
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` followed by `n`, both in PDF's `[a b c d e f]` row-vector form.
fn multiply(m: [f32; 6], n: [f32; 6]) -> [f32; 6] {
    let [a, b, c, d, e, f] = m;
    let [na, nb, nc, nd, ne, nf] = n;
    [
        a * na + b * nc,
        a * nb + b * nd,
        c * na + d * nc,
        c * nb + d * nd,
        e * na + f * nc + ne,
        e * nb + f * nd + nf,
    ]
}

/// Length of the image of the unit x and y vectors under `m`.
fn scales(m: &[f32; 6]) -> (f32, f32) {
    (m[0].hypot(m[1]), m[2].hypot(m[3]))
}

/// Graphics state: the CTM with its `q`/`Q` save stack.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: [f32; 6],
    saved: Vec<[f32; 6]>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl GraphicsState {
    fn save(&mut self) {
        self.saved.push(self.ctm);
    }

    /// Unbalanced `Q` operators leave the CTM untouched.
    fn restore(&mut self) {
        if let Some(ctm) = self.saved.pop() {
            self.ctm = ctm;
        }
    }

    fn concat(&mut self, m: [f32; 6]) {
        self.ctm = multiply(m, self.ctm);
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
            leading: None,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.tm = IDENTITY;
        self.tlm = IDENTITY;
    }

    fn set_matrix(&mut self, m: [f32; 6]) {
        self.tm = m;
        self.tlm = m;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.tlm;
        self.tlm = [a, b, c, d, e + tx * a + ty * c, f + tx * b + ty * d];
        self.tm = self.tlm;
    }

    fn next_line(&mut self, font_size: f32) {
        // Without TL the leading defaults to a typical 1.2 line height.
        let leading = self.leading.unwrap_or(font_size * 1.2);
        self.translate(0.0, -leading);
    }

    /// Move the pen right by `dx` text-space units.
    fn advance(&mut self, dx: f32) {
        let [a, b, ..] = self.tm;
        self.tm[4] += dx * a;
        self.tm[5] += dx * b;
    }

    /// Text rendering matrix under the current transformation `ctm`.
    fn rendering_matrix(&self, ctm: [f32; 6]) -> [f32; 6] {
        multiply(self.tm, ctm)
    }
}

/// Six numeric operands as a matrix.
fn matrix_operands(op: &ContentOp) -> Option<[f32; 6]> {
    let mut m = [0.0; 6];
    for (i, slot) in m.iter_mut().enumerate() {
        *slot = op.number(i)?;
    }
    Some(m)
}

/// Extract all text fragments of a page, in content-stream order.
pub fn extract_fragments<B: PdfBackend + ?Sized>(
    backend: &B,
    page: PageId,
) -> Result<Vec<TextFragment>> {
    let data = backend.page_content(page)?;
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    let ops = backend.decode_content(&data)?;

    let fonts: HashMap<Vec<u8>, String> = backend
        .page_fonts(page)
        .map(|fonts| fonts.into_iter().map(|f| (f.name, f.base_font)).collect())
        .unwrap_or_default();

    Ok(interpret(&ops, &fonts, |font, bytes| {
        backend.decode_text(page, font, bytes)
    }))
}

/// Run the text operators of `ops`, decoding strings with `decode`.
fn interpret<F>(
    ops: &[ContentOp],
    fonts: &HashMap<Vec<u8>, String>,
    decode: F,
) -> Vec<TextFragment>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    let mut fragments = Vec::new();
    let mut state = TextState::default();
    let mut graphics = GraphicsState::default();
    let mut in_text_block = false;
    let mut font_key: Vec<u8> = Vec::new();
    let mut font_name = String::new();
    let mut font_size: f32 = 12.0;

    for op in ops {
        let num = |i: usize| op.number(i);

        match op.operator.as_str() {
            "q" => graphics.save(),
            "Q" => graphics.restore(),
            "cm" => {
                if let Some(m) = matrix_operands(op) {
                    graphics.concat(m);
                }
            }
            "BT" => {
                in_text_block = true;
                state.begin();
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    font_key = name.clone();
                    font_name = fonts
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                }
                font_size = num(1).unwrap_or(font_size);
            }
            "TL" => state.leading = num(0),
            "Td" => state.translate(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
            "TD" => {
                let ty = num(1).unwrap_or(0.0);
                state.leading = Some(-ty);
                state.translate(num(0).unwrap_or(0.0), ty);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(op) {
                    state.set_matrix(m);
                }
            }
            "T*" => state.next_line(font_size),
            "Tj" | "'" | "\"" => {
                if op.operator != "Tj" {
                    state.next_line(font_size);
                }
                let index = if op.operator == "\"" { 2 } else { 0 };
                if !in_text_block {
                    continue;
                }
                if let Some(PdfValue::Str(bytes)) = op.operands.get(index) {
                    let text = decode(&font_key, bytes);
                    let trm = state.rendering_matrix(graphics.ctm);
                    show_text(&mut fragments, &mut state, trm, text, font_size, &font_name);
                }
            }
            "TJ" => {
                if !in_text_block {
                    continue;
                }
                let Some(PdfValue::Array(items)) = op.operands.first() else {
                    continue;
                };
                let mut combined = String::new();
                let mut kerning = 0.0;
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => combined.push_str(&decode(&font_key, bytes)),
                        other => {
                            let Some(n) = other.as_number() else {
                                continue;
                            };
                            // Negative values advance the pen to the right.
                            let adjustment = -n;
                            kerning += adjustment / 1000.0 * font_size;
                            if adjustment > TJ_SPACE_THRESHOLD
                                && !combined.is_empty()
                                && !combined.ends_with(' ')
                                && !combined.ends_with('\u{00A0}')
                                && !combined.chars().last().is_some_and(is_spaceless_script_char)
                            {
                                combined.push(' ');
                            }
                        }
                    }
                }
                let trm = state.rendering_matrix(graphics.ctm);
                show_text(&mut fragments, &mut state, trm, combined, font_size, &font_name);
                state.advance(kerning);
            }
            _ => {}
        }
    }

    fragments
}

/// Emit `text` at the origin of the rendering matrix `trm`, then move the
/// pen past it in text space.
fn show_text(
    fragments: &mut Vec<TextFragment>,
    state: &mut TextState,
    trm: [f32; 6],
    text: String,
    font_size: f32,
    font_name: &str,
) {
    let glyphs = text.chars().count() as f32;
    if !text.trim().is_empty() {
        let (sx, sy) = scales(&trm);
        let mut fragment = TextFragment::new(text, trm[4], trm[5], font_size * sy, font_name);
        fragment.width = glyphs * font_size * AVG_GLYPH_WIDTH * sx;
        fragments.push(fragment);
    }
    state.advance(glyphs * font_size * AVG_GLYPH_WIDTH);
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
