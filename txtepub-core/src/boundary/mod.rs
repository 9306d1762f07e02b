//! Chapter boundary detection
//!
//! Two detectors share one trait: [`HeuristicDetector`] walks the
//! [`HeadingTable`] line by line, [`PatternDetector`] reports every match
//! of a caller-supplied regex. Both return candidates sorted by offset with
//! no duplicate offsets.

mod heuristic;
mod pattern;
pub mod table;

pub use heuristic::HeuristicDetector;
pub use pattern::PatternDetector;
pub use table::{HeadingRule, HeadingTable, HeadingTableConfig, LineContext};

use crate::error::Result;
use crate::normalize::split_terminator;
use crate::progress::CancellationToken;
use crate::types::BoundaryCandidate;

/// Locates chapter headings in normalized text
pub trait BoundaryDetector: Send + Sync {
    /// Find heading candidates, checking `cancel` as the scan goes
    fn detect(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<BoundaryCandidate>>;
}

/// Detector selected by the conversion configuration
#[derive(Debug, Clone)]
pub enum DetectionMode {
    /// Ordered heading table with guards
    Heuristic(HeuristicDetector),
    /// Caller-supplied pattern, no guards
    Pattern(PatternDetector),
}

impl DetectionMode {
    /// Whether the heuristics are in use
    pub fn is_heuristic(&self) -> bool {
        matches!(self, DetectionMode::Heuristic(_))
    }
}

impl BoundaryDetector for DetectionMode {
    fn detect(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<BoundaryCandidate>> {
        match self {
            DetectionMode::Heuristic(detector) => detector.detect(text, cancel),
            DetectionMode::Pattern(detector) => detector.detect(text, cancel),
        }
    }
}

/// Sort candidates by offset and keep the first one at each offset
pub fn dedup_candidates(mut candidates: Vec<BoundaryCandidate>) -> Vec<BoundaryCandidate> {
    candidates.sort_by_key(|c| c.offset);
    candidates.dedup_by_key(|c| c.offset);
    candidates
}

/// Cut `text` to at most `max_chars` characters
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// One line of text with its byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// Offset of the first byte
    pub start: usize,
    /// Offset just past the terminator
    pub end: usize,
    /// Line content without terminator
    pub content: &'a str,
}

impl Line<'_> {
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Split text into lines, keeping track of offsets
pub(crate) fn lines(text: &str) -> impl Iterator<Item = Line<'_>> + '_ {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let (content, _) = split_terminator(raw);
        Line {
            start,
            end: offset,
            content,
        }
    })
}
