//! Outline building.

use crate::model::{HeadingCandidate, Outline, OutlineEntry, TextLine};

/// Collects classified headings into an [`Outline`].
#[derive(Debug, Clone, Default)]
pub struct OutlineBuilder {
    title_scan_lines: Option<usize>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also detect a title among the first `scan_lines` lines of the first
    /// page with text.
    pub fn with_title(mut self, scan_lines: usize) -> Self {
        self.title_scan_lines = Some(scan_lines);
        self
    }

    /// Build the outline from candidates in document order.
    ///
    /// Non-headings are skipped, pages become 1-based, and an entry equal to
    /// the one right before it is dropped.
    pub fn build(&self, candidates: &[HeadingCandidate]) -> Outline {
        let mut entries: Vec<OutlineEntry> = Vec::new();

        for candidate in candidates {
            let Some(level) = candidate.assigned_level else {
                continue;
            };
            let entry = OutlineEntry::new(level, &candidate.line.text, candidate.line.page_index + 1);
            if entries.last() == Some(&entry) {
                log::debug!("Dropping repeated heading {:?}", entry.text);
                continue;
            }
            entries.push(entry);
        }

        let title = self.title_scan_lines.and_then(|n| {
            detect_title(candidates.iter().map(|c| &c.line), n)
        });

        Outline { title, entries }
    }
}

/// Largest-font line among the first `scan_lines` lines of the first page
/// that has any; the earlier line wins ties.
pub fn detect_title<'a, I>(lines: I, scan_lines: usize) -> Option<String>
where
    I: IntoIterator<Item = &'a TextLine>,
{
    let mut lines = lines.into_iter().peekable();
    let first_page = lines.peek()?.page_index;

    lines
        .take_while(|l| l.page_index == first_page)
        .take(scan_lines)
        .fold(None::<&TextLine>, |best, line| match best {
            Some(b) if b.font_size >= line.font_size => Some(b),
            _ => Some(line),
        })
        .map(|l| l.text.clone())
}
