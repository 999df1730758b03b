//! Heading levels and classified candidates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::line::TextLine;
use crate::error::Error;

/// Deepest level a heading can be assigned.
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Heading nesting depth, rendered as `H1`, `H2`, ...
///
/// Ordering follows depth: `H1 < H2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const H1: HeadingLevel = HeadingLevel(1);
    pub const H2: HeadingLevel = HeadingLevel(2);
    pub const H3: HeadingLevel = HeadingLevel(3);

    /// Create a level; `None` outside `1..=MAX_HEADING_LEVEL`.
    pub fn new(depth: u8) -> Option<Self> {
        (1..=MAX_HEADING_LEVEL)
            .contains(&depth)
            .then_some(HeadingLevel(depth))
    }

    /// Create a level, clamping into the valid range.
    pub fn clamped(depth: usize) -> Self {
        HeadingLevel(depth.clamp(1, MAX_HEADING_LEVEL as usize) as u8)
    }

    /// Numeric depth (1 for H1).
    pub fn depth(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

impl FromStr for HeadingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('H')
            .or_else(|| s.strip_prefix('h'))
            .ok_or_else(|| Error::Render(format!("invalid heading level: {s}")))?;
        digits
            .parse::<u8>()
            .ok()
            .and_then(HeadingLevel::new)
            .ok_or_else(|| Error::Render(format!("invalid heading level: {s}")))
    }
}

impl From<HeadingLevel> for String {
    fn from(level: HeadingLevel) -> Self {
        level.to_string()
    }
}

impl TryFrom<String> for HeadingLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which rule decided a candidate's level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    /// The line's size is one of the top-ranked heading sizes (0 = largest).
    FontRank { rank: usize },
    /// Bold and isolated short line below the ranked sizes.
    StyleOverride,
    /// Ambiguous style candidate accepted by semantic similarity.
    Semantic { similarity: f32 },
    /// Not a heading.
    Rejected,
}

/// A line plus the classifier's verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingCandidate {
    pub line: TextLine,
    /// Heuristic importance in `[0, 1]`
    pub score: f32,
    /// `None` when the line is not a heading
    pub assigned_level: Option<HeadingLevel>,
    pub evidence: Evidence,
}

impl HeadingCandidate {
    /// A candidate that is not a heading.
    pub fn rejected(line: TextLine, score: f32) -> Self {
        Self {
            line,
            score,
            assigned_level: None,
            evidence: Evidence::Rejected,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.assigned_level.is_some()
    }

    /// Demote to "none", keeping the score.
    pub(crate) fn reject(&mut self) {
        self.assigned_level = None;
        self.evidence = Evidence::Rejected;
    }
}
