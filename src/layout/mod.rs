//! Line aggregation.
//!
//! Groups the raw fragments of a page into logical [`TextLine`]s, each
//! carrying the dominant font size and weight of the fragments it was built
//! from.

mod normalize;
mod options;

use std::cmp::Ordering;
use std::collections::BTreeMap;

pub use normalize::normalize_text;
pub use options::LayoutOptions;

use crate::model::{BoundingBox, TextLine};
use crate::parser::{is_spaceless_script_char, RawPage, TextFragment, AVG_GLYPH_WIDTH};

/// Groups fragments into lines, page by page.
#[derive(Debug, Clone, Default)]
pub struct LineAggregator {
    options: LayoutOptions,
}

impl LineAggregator {
    /// Create an aggregator with the given options.
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Aggregate one page into lines, top of the page first.
    pub fn aggregate(&self, page: &RawPage) -> Vec<TextLine> {
        self.aggregate_fragments(page.index, page.fragments.clone(), page.height)
    }

    /// Aggregate loose fragments belonging to page `page_index`.
    ///
    /// `page_height` is only used for the header/footer margin.
    pub fn aggregate_fragments(
        &self,
        page_index: usize,
        fragments: Vec<TextFragment>,
        page_height: f32,
    ) -> Vec<TextLine> {
        let mut fragments: Vec<TextFragment> = fragments
            .into_iter()
            .filter(|f| !f.text.trim().is_empty())
            .collect();
        if fragments.is_empty() {
            return Vec::new();
        }

        // PDF y grows upward: descending y is top-to-bottom.
        fragments.sort_by(|a, b| match b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
            other => other,
        });

        let mut groups: Vec<Vec<TextFragment>> = Vec::new();
        let mut current: Vec<TextFragment> = Vec::new();
        let mut anchor: Option<(f32, f32)> = None;

        for fragment in fragments {
            match anchor {
                Some((y, size)) if (fragment.y - y).abs() <= self.tolerance(size, &fragment) => {
                    current.push(fragment);
                }
                _ => {
                    if !current.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    anchor = Some((fragment.y, fragment.font_size));
                    current.push(fragment);
                }
            }
        }
        if !current.is_empty() {
            groups.push(current);
        }

        let lines: Vec<TextLine> = groups
            .into_iter()
            .filter_map(|group| self.build_line(page_index, group))
            .filter(|line| self.outside_margins(line, page_height))
            .collect();

        log::debug!("Page {}: {} lines", page_index + 1, lines.len());
        lines
    }

    fn tolerance(&self, anchor_size: f32, fragment: &TextFragment) -> f32 {
        let size = anchor_size.max(fragment.font_size);
        (size * self.options.tolerance_ratio).max(self.options.min_tolerance)
    }

    fn outside_margins(&self, line: &TextLine, page_height: f32) -> bool {
        let margin = self.options.header_footer_margin;
        if margin <= 0.0 || page_height <= 0.0 {
            return true;
        }
        let band = page_height * margin;
        line.baseline > band && line.baseline < page_height - band
    }

    fn build_line(&self, page_index: usize, mut group: Vec<TextFragment>) -> Option<TextLine> {
        let baseline = group.first()?.y;
        group.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let text = normalize_text(&self.join_fragments(&group));
        if text.is_empty() {
            return None;
        }

        let (font_size, is_bold) = dominant_font(&group);
        let bounding_box = group
            .iter()
            .map(|f| BoundingBox::new(f.x, f.bottom(), f.right(), f.top()))
            .reduce(|a, b| a.union(&b))?;

        Some(TextLine {
            page_index,
            text,
            font_size,
            is_bold,
            bounding_box,
            baseline,
        })
    }

    /// Concatenate x-sorted fragments, inserting spaces at visible gaps.
    fn join_fragments(&self, fragments: &[TextFragment]) -> String {
        let mut result = String::new();

        for (i, fragment) in fragments.iter().enumerate() {
            if i == 0 {
                result.push_str(&fragment.text);
                continue;
            }
            let prev = &fragments[i - 1];
            let gap = fragment.x - prev.right();

            let chars = fragment.text.chars().count();
            let avg_char_width = if chars > 0 && fragment.width > 0.0 {
                fragment.width / chars as f32
            } else {
                fragment.font_size * AVG_GLYPH_WIDTH
            };

            let both_spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                && fragment
                    .text
                    .chars()
                    .next()
                    .is_some_and(is_spaceless_script_char);
            let has_space = prev.text.ends_with(char::is_whitespace)
                || fragment.text.starts_with(char::is_whitespace);

            if gap > avg_char_width * self.options.space_gap_ratio && !both_spaceless && !has_space
            {
                result.push(' ');
            }
            result.push_str(&fragment.text);
        }

        result
    }
}

/// Mode of the fragment sizes (0.1pt precision, ties to the larger size),
/// and the majority weight among fragments of that size (ties to bold).
fn dominant_font(fragments: &[TextFragment]) -> (f32, bool) {
    let mut sizes: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
    for f in fragments {
        let key = (f.font_size * 10.0).round() as i32;
        let entry = sizes.entry(key).or_default();
        entry.0 += 1;
        if f.is_bold {
            entry.1 += 1;
        }
    }

    // Iterating ascending and keeping `>=` lets the larger size win ties.
    let mut best = (0, 0, 0);
    for (&key, &(count, bold)) in &sizes {
        if count >= best.1 {
            best = (key, count, bold);
        }
    }
    let (key, count, bold) = best;
    (key as f32 / 10.0, bold * 2 >= count)
}
