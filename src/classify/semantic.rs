//! Semantic similarity used to settle ambiguous style candidates.

use crate::error::{Error, Result};

/// Typical heading phrasings ambiguous lines are compared against.
pub const DEFAULT_REFERENCE_PHRASES: &[&str] = &[
    "Introduction",
    "Overview",
    "Background",
    "Summary",
    "Abstract",
    "Conclusion",
    "Methodology",
    "Results and discussion",
    "Related work",
    "References",
    "Appendix",
    "Table of contents",
    "Acknowledgements",
    "Chapter 1: Getting started",
    "Section 2. Requirements",
];

/// Turns texts into fixed-size vectors.
pub trait Embedder {
    /// Embed a batch of texts; one vector per input, same order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }
}

/// Scores how much a text reads like a heading.
pub trait SimilarityScorer {
    /// Similarity in `[-1, 1]`; higher means more heading-like.
    fn similarity(&self, text: &str) -> Result<f32>;
}

impl<F> SimilarityScorer for F
where
    F: Fn(&str) -> Result<f32>,
{
    fn similarity(&self, text: &str) -> Result<f32> {
        self(text)
    }
}

/// Cosine similarity of two vectors; 0 when either is zero or the lengths
/// differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Maximum similarity of a text to a fixed set of reference phrases.
///
/// The references are embedded once, at construction.
pub struct ReferenceSimilarity<E: Embedder> {
    embedder: E,
    references: Vec<Vec<f32>>,
}

impl<E: Embedder> ReferenceSimilarity<E> {
    /// Embed `phrases` with `embedder`.
    pub fn new<S: AsRef<str>>(embedder: E, phrases: &[S]) -> Result<Self> {
        let phrases: Vec<&str> = phrases
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !p.trim().is_empty())
            .collect();
        if phrases.is_empty() {
            return Err(Error::Embedding("no reference phrases".to_string()));
        }
        let references = embedder.embed(&phrases)?;
        log::debug!("Embedded {} reference phrases", references.len());
        Ok(Self {
            embedder,
            references,
        })
    }

    /// The wrapped embedder.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}

impl<E: Embedder> SimilarityScorer for ReferenceSimilarity<E> {
    fn similarity(&self, text: &str) -> Result<f32> {
        if text.trim().is_empty() {
            return Err(Error::Embedding("cannot embed empty text".to_string()));
        }
        let embedded = self.embedder.embed(&[text])?;
        let vector = embedded
            .first()
            .ok_or_else(|| Error::Embedding("embedder returned no vector".to_string()))?;

        Ok(self
            .references
            .iter()
            .map(|r| cosine_similarity(vector, r))
            .fold(f32::MIN, f32::max))
    }
}
