//! Text plausibility rules and textual heading indicators.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};

use super::ClassifierConfig;

/// Running headers, footers and page furniture. Matched case-insensitively.
static HEADER_FOOTER: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)^[-–—]?\s*\d+\s*[-–—]?$",
        r"(?i)^page\s*\d+(\s*(of|/)\s*\d+)?$",
        r"(?i)copyright|©|\(c\)\s*\d{4}",
        r"(?i)^www\.|https?://",
        r"(?i)[\w.+-]+@\w+\.\w+",
        r"(?i)^(confidential|proprietary)\b",
        r"(?i)^draft\b",
    ])
    .expect("header/footer patterns are valid")
});

/// Captions, notes and stray fragments.
static SKIP: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)^(figure|fig\.)\s*\d+",
        r"(?i)^table\s+\d+",
        r"(?i)^(source|note)s?:",
        r"^[a-z][a-z\s]{0,10}$",
    ])
    .expect("skip patterns are valid")
});

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)*\.?\s+\p{Lu}").expect("valid pattern"));

static ROMAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[IVXLC]+\.\s+\S").expect("valid pattern"));

static LETTERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.\s+\S").expect("valid pattern"));

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(chapter|section|part|appendix)\s+([0-9]+|[ivxlc]+|[a-z])\b")
        .expect("valid pattern")
});

/// Whether the text looks like page furniture (page numbers, copyright
/// notices, URLs, ...).
pub fn is_header_footer(text: &str) -> bool {
    HEADER_FOOTER.is_match(text.trim())
}

/// Whether the text is a caption, note or short lowercase fragment.
pub fn is_skipped(text: &str) -> bool {
    SKIP.is_match(text.trim())
}

/// Share of alphabetic characters among non-space characters.
pub fn alpha_ratio(text: &str) -> f32 {
    let (alpha, total) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(a, t), c| {
            (a + usize::from(c.is_alphabetic()), t + 1)
        });
    if total == 0 {
        0.0
    } else {
        alpha as f32 / total as f32
    }
}

/// Whether a line of text could be a heading at all.
pub fn is_plausible(text: &str, config: &ClassifierConfig) -> bool {
    let chars = text.chars().count();
    if chars < config.min_chars || chars > config.max_chars {
        return false;
    }
    if text.split_whitespace().count() > config.max_words {
        return false;
    }
    if alpha_ratio(text) < config.min_alpha_ratio {
        return false;
    }
    if config.filter_headers_footers && (is_header_footer(text) || is_skipped(text)) {
        return false;
    }
    true
}

/// At least two letters, all uppercase.
fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

/// Whether the text carries a textual heading marker: section numbering,
/// a chapter/section keyword, all caps, or a trailing colon.
pub fn has_textual_indicator(text: &str) -> bool {
    let text = text.trim();
    NUMBERED.is_match(text)
        || ROMAN.is_match(text)
        || LETTERED.is_match(text)
        || KEYWORD.is_match(text)
        || is_all_caps(text)
        || text.ends_with(':')
}

/// Sum of the textual features, clamped to `[0, 1]`.
pub fn text_score(text: &str) -> f32 {
    let text = text.trim();
    let mut score: f32 = 0.0;
    if is_all_caps(text) {
        score += 0.2;
    }
    if text.ends_with(':') {
        score += 0.1;
    }
    if NUMBERED.is_match(text) {
        score += 0.1;
    }
    if text.split_whitespace().count() <= 5 {
        score += 0.1;
    }
    if KEYWORD.is_match(text) {
        score += 0.2;
    }
    score.min(1.0)
}
