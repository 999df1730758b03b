//! Line text normalization.

use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Normalize extracted text: NFC, ligatures expanded, replacement
/// characters removed, whitespace collapsed and trimmed.
pub fn normalize_text(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len());
    for c in text.nfc() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, replacement)) => expanded.push_str(replacement),
            None if c == '\u{FFFD}' => {}
            None => expanded.push(c),
        }
    }

    expanded.split_whitespace().collect::<Vec<_>>().join(" ")
}
