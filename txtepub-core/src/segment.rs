//! Partitioning text into chapters

use crate::boundary::dedup_candidates;
use crate::types::{BoundaryCandidate, Chapter, ChapterSet, DecodedDocument, PatternClass};
use std::sync::Arc;

/// Default title of text before the first heading
pub const DEFAULT_PREAMBLE_TITLE: &str = "Preamble";
/// Default title of a document without headings
pub const DEFAULT_UNTITLED_TITLE: &str = "Content";

/// Turns boundary candidates into a gap-free [`ChapterSet`]
#[derive(Debug, Clone)]
pub struct Segmenter {
    preamble_title: String,
    untitled_title: String,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            preamble_title: DEFAULT_PREAMBLE_TITLE.to_string(),
            untitled_title: DEFAULT_UNTITLED_TITLE.to_string(),
        }
    }
}

impl Segmenter {
    /// Segmenter with the default synthetic titles
    pub fn new() -> Self {
        Self::default()
    }

    /// Title used for text before the first heading
    pub fn with_preamble_title(mut self, title: impl Into<String>) -> Self {
        self.preamble_title = title.into();
        self
    }

    /// Title used when no heading was found
    pub fn with_untitled_title(mut self, title: impl Into<String>) -> Self {
        self.untitled_title = title.into();
        self
    }

    /// Build chapters from `candidates`
    ///
    /// Candidates are sorted and deduplicated first. Offsets past the end
    /// of `text` are ignored, and whitespace-only text yields an empty set.
    pub fn segment(
        &self,
        document: Arc<DecodedDocument>,
        text: String,
        candidates: &[BoundaryCandidate],
    ) -> ChapterSet {
        if text.trim().is_empty() {
            return ChapterSet::new(document, text, Vec::new());
        }

        let len = text.len();
        let candidates = dedup_candidates(
            candidates
                .iter()
                .filter(|c| c.offset < len)
                .cloned()
                .collect(),
        );
        let mut chapters = Vec::with_capacity(candidates.len() + 1);

        let Some(first) = candidates.first() else {
            chapters.push(Chapter {
                index: 0,
                title: self.untitled_title.clone(),
                body_start: 0,
                body_end: len,
                content_start: 0,
                class: PatternClass::Preamble,
            });
            return ChapterSet::new(document, text, chapters);
        };

        if first.offset > 0 {
            chapters.push(Chapter {
                index: 0,
                title: self.preamble_title.clone(),
                body_start: 0,
                body_end: first.offset,
                content_start: 0,
                class: PatternClass::Preamble,
            });
        }

        for (i, candidate) in candidates.iter().enumerate() {
            let body_end = candidates.get(i + 1).map_or(len, |next| next.offset);
            chapters.push(Chapter {
                index: chapters.len(),
                title: candidate.heading_text.clone(),
                body_start: candidate.offset,
                body_end,
                content_start: candidate.heading_end.min(body_end).max(candidate.offset),
                class: candidate.pattern_class,
            });
        }

        ChapterSet::new(document, text, chapters)
    }
}
