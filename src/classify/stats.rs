//! Document-wide font statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::TextLine;

/// Body size assumed for a document without text.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font-size histogram of a document and the heading sizes derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontStatistics {
    /// Bucket width in points
    pub precision: f32,
    /// Body text size (most common bucket)
    pub body_size: f32,
    /// Bucketed sizes above the heading threshold, largest first
    pub heading_sizes: Vec<f32>,
    /// Largest line size seen
    pub max_size: f32,
    /// Character count per bucket
    histogram: BTreeMap<i64, usize>,
}

impl FontStatistics {
    /// Create empty statistics with the given bucket width.
    pub fn new(precision: f32) -> Self {
        Self {
            precision: if precision > 0.0 { precision } else { 0.5 },
            body_size: DEFAULT_BODY_SIZE,
            heading_sizes: Vec::new(),
            max_size: 0.0,
            histogram: BTreeMap::new(),
        }
    }

    /// Build statistics over all lines of a document.
    pub fn from_lines(lines: &[TextLine], precision: f32, min_size_delta: f32) -> Self {
        let mut stats = Self::new(precision);
        for line in lines {
            stats.add(line.font_size, line.char_count());
        }
        stats.analyze(min_size_delta);
        stats
    }

    fn bucket(&self, size: f32) -> i64 {
        (size / self.precision).round() as i64
    }

    fn size_of(&self, bucket: i64) -> f32 {
        bucket as f32 * self.precision
    }

    /// Record `weight` characters set at `size`.
    pub fn add(&mut self, size: f32, weight: usize) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        self.max_size = self.max_size.max(size);
        *self.histogram.entry(self.bucket(size)).or_insert(0) += weight.max(1);
    }

    /// Compute body size and ranked heading sizes.
    pub fn analyze(&mut self, min_size_delta: f32) {
        // Ascending iteration with a strict `>` keeps the smaller size on ties.
        let mut body: Option<(i64, usize)> = None;
        for (&bucket, &count) in &self.histogram {
            if body.map_or(true, |(_, best)| count > best) {
                body = Some((bucket, count));
            }
        }

        let Some((body_bucket, _)) = body else {
            self.body_size = DEFAULT_BODY_SIZE;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = self.size_of(body_bucket);

        let threshold = self.body_size + min_size_delta;
        self.heading_sizes = self
            .histogram
            .keys()
            .rev()
            .map(|&b| self.size_of(b))
            .filter(|&size| size > threshold)
            .collect();
    }

    /// Rank of `size` among the heading sizes (0 = largest), if it is one.
    pub fn rank_of(&self, size: f32) -> Option<usize> {
        let bucketed = self.size_of(self.bucket(size));
        self.heading_sizes
            .iter()
            .position(|&s| (s - bucketed).abs() < self.precision / 2.0)
    }
}
