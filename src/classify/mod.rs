//! Heading classification.
//!
//! Every line of a document is scored against document-wide font
//! statistics. The decision runs in tiers:
//!
//! 1. **Font rank**: lines set in one of the `max_levels` largest heading
//!    sizes become H1..HK. This signal is never second-guessed.
//! 2. **Style override**: short lines below the ranked sizes that are both
//!    bold and isolated become headings one level below the deepest ranked
//!    level.
//! 3. **Semantic tie-break**: lines with a single style cue plus a textual
//!    marker (numbering, keyword, caps, colon) are accepted only when a
//!    [`SimilarityScorer`] rates them close enough to typical headings.
//!
//! Scoring failures never abort classification: the affected lines are
//! treated as plain text and the degradation is reported.

mod config;
#[cfg(feature = "embeddings")]
mod embedder;
pub mod rules;
mod semantic;
mod stats;

use std::collections::BTreeMap;

pub use config::ClassifierConfig;
#[cfg(feature = "embeddings")]
pub use embedder::MiniLmEmbedder;
pub use semantic::{
    cosine_similarity, Embedder, ReferenceSimilarity, SimilarityScorer,
    DEFAULT_REFERENCE_PHRASES,
};
pub use stats::FontStatistics;

use crate::model::{Evidence, HeadingCandidate, HeadingLevel, TextLine};

/// Result of classifying one document.
#[derive(Debug, Clone)]
pub struct Classification {
    /// One candidate per input line, same order
    pub candidates: Vec<HeadingCandidate>,
    /// Font statistics the decision was based on
    pub stats: FontStatistics,
    /// Number of ambiguous lines whose semantic scoring failed
    pub degraded: usize,
}

impl Classification {
    /// Candidates that were assigned a level.
    pub fn headings(&self) -> impl Iterator<Item = &HeadingCandidate> {
        self.candidates.iter().filter(|c| c.is_heading())
    }
}

/// Line-level verdict before semantic scoring.
enum Tier {
    Ranked(usize),
    Style,
    Ambiguous,
    Plain,
}

/// Decides which lines are headings and at what level.
pub struct HeadingClassifier<'a> {
    config: ClassifierConfig,
    scorer: Option<&'a dyn SimilarityScorer>,
}

impl<'a> HeadingClassifier<'a> {
    /// Create a font/style-only classifier.
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            scorer: None,
        }
    }

    /// Use `scorer` to settle ambiguous lines.
    pub fn with_scorer(mut self, scorer: &'a dyn SimilarityScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify all lines of a document.
    pub fn classify(&self, lines: &[TextLine]) -> Classification {
        let config = &self.config;
        let stats = FontStatistics::from_lines(lines, config.size_precision, config.min_size_delta);

        let max_levels = config.max_levels.max(1);
        let ranked_levels = stats.heading_sizes.len().min(max_levels);
        let style_level = HeadingLevel::clamped(ranked_levels + 1);

        log::debug!(
            "Body size {:.1}pt, heading sizes {:?}",
            stats.body_size,
            stats.heading_sizes
        );

        let mut degraded = 0;
        let mut candidates = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            let score = self.score(line, &stats);
            let candidate = match self.tier(lines, i, &stats, max_levels) {
                Tier::Ranked(rank) => HeadingCandidate {
                    line: line.clone(),
                    score,
                    assigned_level: Some(HeadingLevel::clamped(rank + 1)),
                    evidence: Evidence::FontRank { rank },
                },
                Tier::Style => HeadingCandidate {
                    line: line.clone(),
                    score,
                    assigned_level: Some(style_level),
                    evidence: Evidence::StyleOverride,
                },
                Tier::Ambiguous => match self.scorer.map(|s| s.similarity(&line.text)) {
                    Some(Ok(similarity)) if similarity >= config.semantic_threshold => {
                        HeadingCandidate {
                            line: line.clone(),
                            score,
                            assigned_level: Some(style_level),
                            evidence: Evidence::Semantic { similarity },
                        }
                    }
                    Some(Ok(_)) | None => HeadingCandidate::rejected(line.clone(), score),
                    Some(Err(e)) => {
                        if degraded == 0 {
                            log::warn!(
                                "Semantic scoring failed, falling back to font-only classification: {}",
                                e
                            );
                        }
                        degraded += 1;
                        HeadingCandidate::rejected(line.clone(), score)
                    }
                },
                Tier::Plain => HeadingCandidate::rejected(line.clone(), score),
            };

            if let Some(level) = candidate.assigned_level {
                log::debug!(
                    "{} p{} {:.1}pt {:?}: {}",
                    level,
                    line.page_index + 1,
                    line.font_size,
                    candidate.evidence,
                    line.text
                );
            }
            candidates.push(candidate);
        }

        if let Some(max) = config.max_headings_per_page {
            cap_per_page(&mut candidates, max);
        }

        Classification {
            candidates,
            stats,
            degraded,
        }
    }

    fn tier(&self, lines: &[TextLine], i: usize, stats: &FontStatistics, max_levels: usize) -> Tier {
        let line = &lines[i];
        if !rules::is_plausible(&line.text, &self.config) {
            return Tier::Plain;
        }

        if let Some(rank) = stats.rank_of(line.font_size).filter(|&r| r < max_levels) {
            return Tier::Ranked(rank);
        }

        if line.word_count() > self.config.style_max_words {
            return Tier::Plain;
        }

        let bold = line.is_bold;
        let isolated = self.is_isolated(lines, i);
        if bold && isolated {
            Tier::Style
        } else if (bold || isolated) && rules::has_textual_indicator(&line.text) {
            Tier::Ambiguous
        } else {
            Tier::Plain
        }
    }

    /// Whether the vertical distance to both neighbours on the same page is
    /// at least `isolation_ratio` times the line's font size.
    fn is_isolated(&self, lines: &[TextLine], i: usize) -> bool {
        let line = &lines[i];
        let min_gap = line.font_size * self.config.isolation_ratio;
        let far_from = |other: Option<&TextLine>| match other {
            Some(o) if o.page_index == line.page_index => {
                (o.baseline - line.baseline).abs() >= min_gap
            }
            _ => true,
        };
        let prev = i.checked_sub(1).and_then(|p| lines.get(p));
        far_from(prev) && far_from(lines.get(i + 1))
    }

    fn score(&self, line: &TextLine, stats: &FontStatistics) -> f32 {
        let font_ratio = if stats.max_size > 0.0 {
            (line.font_size / stats.max_size).min(1.0)
        } else {
            0.5
        };
        0.6 * font_ratio + 0.4 * rules::text_score(&line.text)
    }
}

/// Keep the `max` best-scoring headings of each page (ties to the earlier
/// line); demote the rest.
fn cap_per_page(candidates: &mut [HeadingCandidate], max: usize) {
    let mut pages: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, c) in candidates.iter().enumerate() {
        if c.is_heading() {
            pages.entry(c.line.page_index).or_default().push(i);
        }
    }

    for indices in pages.values_mut() {
        if indices.len() <= max {
            continue;
        }
        // Stable sort keeps document order among equal scores.
        indices.sort_by(|&a, &b| {
            candidates[b]
                .score
                .partial_cmp(&candidates[a].score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for &i in &indices[max..] {
            candidates[i].reject();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::BoundingBox;

    /// Build a page of lines, top to bottom, from `(text, size, bold, baseline)`.
    fn page(index: usize, spec: &[(&str, f32, bool, f32)]) -> Vec<TextLine> {
        spec.iter()
            .map(|&(text, size, bold, baseline)| TextLine {
                page_index: index,
                text: text.to_string(),
                font_size: size,
                is_bold: bold,
                bounding_box: BoundingBox::new(72.0, baseline, 300.0, baseline + size),
                baseline,
            })
            .collect()
    }

    fn body(count: usize, start: f32) -> Vec<(&'static str, f32, bool, f32)> {
        (0..count)
            .map(|i| {
                (
                    "Lorem ipsum dolor sit amet, consectetur adipiscing elit sed do.",
                    10.0,
                    false,
                    start - i as f32 * 12.0,
                )
            })
            .collect()
    }

    /// Headings as `"H1 Text"`.
    fn levels(c: &Classification) -> Vec<String> {
        c.headings()
            .map(|h| format!("{} {}", h.assigned_level.unwrap(), h.line.text))
            .collect()
    }

    fn classify(lines: &[TextLine]) -> Classification {
        HeadingClassifier::new(ClassifierConfig::default()).classify(lines)
    }

    #[test]
    fn test_single_large_heading() {
        let mut spec = vec![("Introduction", 24.0, true, 700.0)];
        spec.extend(body(5, 660.0));
        let result = classify(&page(0, &spec));

        assert_eq!(levels(&result), vec!["H1 Introduction"]);
        assert_eq!(result.stats.body_size, 10.0);
        assert_eq!(result.degraded, 0);
        assert!(matches!(
            result.candidates[0].evidence,
            Evidence::FontRank { rank: 0 }
        ));
    }

    #[test]
    fn test_two_sizes_nest() {
        let mut spec = vec![("Chapter One", 20.0, false, 700.0)];
        spec.extend(body(3, 660.0));
        spec.push(("Background", 16.0, false, 600.0));
        spec.extend(body(3, 570.0));
        let result = classify(&page(0, &spec));

        assert_eq!(levels(&result), vec!["H1 Chapter One", "H2 Background"]);
    }

    #[test]
    fn test_ranks_beyond_max_levels_fall_to_style() {
        let mut spec = vec![
            ("Part", 30.0, false, 760.0),
            ("Chapter", 24.0, false, 720.0),
            ("Section", 18.0, false, 680.0),
        ];
        spec.extend(body(4, 640.0));
        let config = ClassifierConfig::default().with_max_levels(2);
        let result = HeadingClassifier::new(config).classify(&page(0, &spec));

        // The 18pt line is neither bold nor marked: plain text.
        assert_eq!(levels(&result), vec!["H1 Part", "H2 Chapter"]);
    }

    #[test]
    fn test_bold_isolated_line_is_style_heading() {
        let mut spec = vec![("Report", 20.0, false, 740.0)];
        spec.extend(body(3, 700.0));
        spec.push(("Key Findings", 10.0, true, 640.0));
        spec.extend(body(3, 620.0));
        let result = classify(&page(0, &spec));

        let found = levels(&result);
        assert_eq!(found[1], "H2 Key Findings");
        let style = result.headings().nth(1).unwrap();
        assert_eq!(style.evidence, Evidence::StyleOverride);
    }

    #[test]
    fn test_bold_inline_line_is_not_heading() {
        let mut spec = body(2, 700.0);
        spec.push(("Important note here", 10.0, true, 676.0));
        spec.extend(body(2, 664.0));
        let result = classify(&page(0, &spec));
        assert_eq!(result.headings().count(), 0);
    }

    #[test]
    fn test_ambiguous_line_uses_scorer() {
        let mut spec = body(2, 700.0);
        spec.push(("2.1 Scope", 10.0, true, 676.0));
        spec.extend(body(2, 664.0));
        let lines = page(0, &spec);

        let accept = |_: &str| -> Result<f32> { Ok(0.9) };
        let result = HeadingClassifier::new(ClassifierConfig::default())
            .with_scorer(&accept)
            .classify(&lines);
        let heading = result.headings().next().unwrap();
        assert_eq!(heading.line.text, "2.1 Scope");
        assert_eq!(heading.assigned_level, Some(HeadingLevel::H1));
        assert!(matches!(heading.evidence, Evidence::Semantic { .. }));

        let reject = |_: &str| -> Result<f32> { Ok(0.1) };
        let result = HeadingClassifier::new(ClassifierConfig::default())
            .with_scorer(&reject)
            .classify(&lines);
        assert_eq!(result.headings().count(), 0);

        let result = classify(&lines);
        assert_eq!(result.headings().count(), 0);
        assert_eq!(result.degraded, 0);
    }

    #[test]
    fn test_scorer_failure_degrades() {
        let mut spec = vec![("Title", 24.0, false, 760.0)];
        spec.extend(body(2, 700.0));
        spec.push(("2.1 Scope", 10.0, true, 676.0));
        spec.push(("2.2 Limits", 10.0, true, 664.0));
        spec.extend(body(2, 652.0));
        let failing = |_: &str| -> Result<f32> { Err(Error::Embedding("no model".into())) };

        let result = HeadingClassifier::new(ClassifierConfig::default())
            .with_scorer(&failing)
            .classify(&page(0, &spec));

        assert_eq!(result.degraded, 2);
        assert_eq!(levels(&result), vec!["H1 Title"]);
    }

    #[test]
    fn test_scorer_not_consulted_for_ranked_sizes() {
        let mut spec = vec![("Overview", 18.0, false, 700.0)];
        spec.extend(body(3, 660.0));
        let never = |_: &str| -> Result<f32> { Err(Error::Embedding("called".into())) };

        let result = HeadingClassifier::new(ClassifierConfig::default())
            .with_scorer(&never)
            .classify(&page(0, &spec));
        assert_eq!(result.degraded, 0);
        assert_eq!(result.headings().count(), 1);
    }

    #[test]
    fn test_implausible_large_text_rejected() {
        let mut spec = vec![("42", 24.0, true, 760.0), ("Figure 2", 18.0, false, 720.0)];
        spec.extend(body(3, 680.0));
        let result = classify(&page(0, &spec));
        assert_eq!(result.headings().count(), 0);
    }

    #[test]
    fn test_monotonic_levels() {
        let mut lines = Vec::new();
        for p in 0..3 {
            let mut spec = vec![
                ("Major Part", 26.0, false, 760.0),
                ("Minor Section", 14.0, false, 720.0),
                ("Bold Aside", 10.0, true, 690.0),
            ];
            spec.extend(body(4, 660.0));
            lines.extend(page(p, &spec));
        }
        let result = classify(&lines);
        let headings: Vec<_> = result.headings().collect();
        assert_eq!(headings.len(), 9);
        for a in &headings {
            for b in &headings {
                if a.line.font_size > b.line.font_size {
                    assert!(a.assigned_level < b.assigned_level);
                }
            }
        }
    }

    #[test]
    fn test_per_page_cap_keeps_best() {
        let mut spec = vec![
            ("Alpha", 14.0, false, 760.0),
            ("BETA", 14.0, false, 730.0),
            ("Gamma", 18.0, false, 700.0),
        ];
        spec.extend(body(6, 670.0));
        let config = ClassifierConfig::default().with_max_headings_per_page(2);
        let result = HeadingClassifier::new(config).classify(&page(0, &spec));

        let texts: Vec<_> = result.headings().map(|h| h.line.text.as_str()).collect();
        assert_eq!(texts, vec!["BETA", "Gamma"]);
    }

    #[test]
    fn test_empty_document() {
        let result = classify(&[]);
        assert!(result.candidates.is_empty());
        assert!(result.stats.heading_sizes.is_empty());
    }
}
