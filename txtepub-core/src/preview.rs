//! Read-only preview of a decoded document

use crate::types::{ChapterSet, DecodedDocument};
use serde::Serialize;
use std::fmt;

/// Default number of preview lines
pub const DEFAULT_LINE_COUNT: usize = 20;
/// Default confidence below which the preview flags the encoding
pub const DEFAULT_WARN_THRESHOLD: f32 = 0.5;

/// A numbered line of the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLine {
    /// Line number, starting at 1
    pub number: usize,
    /// Line content
    pub text: String,
}

/// Short description of one chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    /// Chapter index
    pub index: usize,
    /// Chapter title
    pub title: String,
    /// Line of the normalized text the chapter starts on, from 1
    pub start_line: usize,
    /// Body length in characters
    pub body_chars: usize,
}

/// What the user sees before committing to a conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    /// First lines of the decoded text
    pub lines: Vec<PreviewLine>,
    /// Detected encoding label
    pub encoding: String,
    /// Detection confidence
    pub confidence: f32,
    /// Confidence is below the warning threshold
    pub low_confidence: bool,
    /// Chapters, when segmentation was run
    pub chapters: Option<Vec<ChapterSummary>>,
}

/// Builds [`Preview`] values
#[derive(Debug, Clone, Copy)]
pub struct PreviewProjector {
    line_count: usize,
    warn_threshold: f32,
}

impl Default for PreviewProjector {
    fn default() -> Self {
        Self {
            line_count: DEFAULT_LINE_COUNT,
            warn_threshold: DEFAULT_WARN_THRESHOLD,
        }
    }
}

impl PreviewProjector {
    /// Projector showing `line_count` lines
    pub fn new(line_count: usize) -> Self {
        Self {
            line_count,
            ..Self::default()
        }
    }

    /// Flag encodings whose confidence is below `threshold`
    pub fn with_warn_threshold(mut self, threshold: f32) -> Self {
        self.warn_threshold = threshold;
        self
    }

    /// Number of lines shown
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Project a document and, optionally, its chapters
    pub fn project(&self, document: &DecodedDocument, chapters: Option<&ChapterSet>) -> Preview {
        let lines = document
            .text
            .lines()
            .take(self.line_count)
            .enumerate()
            .map(|(i, text)| PreviewLine {
                number: i + 1,
                text: text.to_string(),
            })
            .collect();

        let chapters = chapters.map(|set| {
            let text = set.text();
            // Chapters are sorted, so newlines are counted once
            let mut line = 1;
            let mut counted = 0;
            set.chapters()
                .iter()
                .map(|chapter| {
                    line += text[counted..chapter.body_start].matches('\n').count();
                    counted = chapter.body_start;
                    ChapterSummary {
                        index: chapter.index,
                        title: chapter.title.clone(),
                        start_line: line,
                        body_chars: set.body(chapter).chars().count(),
                    }
                })
                .collect()
        });

        Preview {
            lines,
            encoding: document.encoding.clone(),
            confidence: document.confidence,
            low_confidence: document.confidence < self.warn_threshold,
            chapters,
        }
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Encoding: {} (confidence {:.2})",
            self.encoding, self.confidence
        )?;
        if self.low_confidence {
            writeln!(f, "Warning: encoding detection is uncertain, the text may be garbled")?;
        }
        writeln!(f)?;

        let width = self.lines.last().map_or(1, |l| l.number.to_string().len());
        for line in &self.lines {
            writeln!(f, "{:>width$} | {}", line.number, line.text)?;
        }
        writeln!(f)?;

        match self.chapters.as_deref() {
            Some(chapters) if !chapters.is_empty() => {
                writeln!(f, "Detected chapters ({} found):", chapters.len())?;
                for chapter in chapters {
                    writeln!(f, "- {}", chapter.title)?;
                }
                Ok(())
            }
            _ => writeln!(f, "No chapters detected."),
        }
    }
}
