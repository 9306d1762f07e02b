//! Data model shared by all pipeline stages

use crate::encoding::DetectionStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Raw input bytes plus the name they came from
#[derive(Clone)]
pub struct RawDocument {
    source: String,
    bytes: Vec<u8>,
}

impl RawDocument {
    /// Create a raw document from a source identifier and its bytes
    pub fn new(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }

    /// Source identifier, usually the file name
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw content
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether there are no bytes at all
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("source", &self.source)
            .field("bytes", &format!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Text produced by the encoding detector
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDocument {
    /// Decoded text with any BOM removed
    pub text: String,
    /// Encoding label, e.g. "UTF-8" or "GBK"
    pub encoding: String,
    /// Trust in the detected encoding, always within [0, 1]
    pub confidence: f32,
    /// Detection step that produced the result
    pub stage: DetectionStage,
}

impl DecodedDocument {
    /// Create a decoded document, clamping `confidence` into [0, 1]
    pub fn new(
        text: String,
        encoding: impl Into<String>,
        confidence: f32,
        stage: DetectionStage,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            text,
            encoding: encoding.into(),
            confidence,
            stage,
        }
    }
}

/// Heading convention a boundary was recognized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternClass {
    /// "Chapter 3", "CHAPTER IV", "Ch. 12"
    EnglishNumbered,
    /// "Part 2", "Book One", "Volume III"
    EnglishVolume,
    /// "Prologue", "Epilogue" and similar front/back matter
    EnglishMatter,
    /// "第三章", "第12回", "第一节"
    ChineseNumbered,
    /// "第一卷", "卷三"
    ChineseVolume,
    /// "序章", "楔子", "尾声" and similar front/back matter
    ChineseMatter,
    /// Markdown "# Heading"
    MarkdownHeading,
    /// Standalone line written entirely in capitals
    UppercaseLine,
    /// Short line surrounded by blank lines
    ShortIsolatedLine,
    /// Match of a caller-supplied pattern
    Custom,
    /// Synthesized chapter for text before the first heading
    Preamble,
}

impl PatternClass {
    /// Snake-case name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternClass::EnglishNumbered => "english_numbered",
            PatternClass::EnglishVolume => "english_volume",
            PatternClass::EnglishMatter => "english_matter",
            PatternClass::ChineseNumbered => "chinese_numbered",
            PatternClass::ChineseVolume => "chinese_volume",
            PatternClass::ChineseMatter => "chinese_matter",
            PatternClass::MarkdownHeading => "markdown_heading",
            PatternClass::UppercaseLine => "uppercase_line",
            PatternClass::ShortIsolatedLine => "short_isolated_line",
            PatternClass::Custom => "custom",
            PatternClass::Preamble => "preamble",
        }
    }

    /// Whether this class is produced by the pipeline itself rather than a heading rule
    pub fn is_synthetic(&self) -> bool {
        matches!(self, PatternClass::Custom | PatternClass::Preamble)
    }
}

impl fmt::Display for PatternClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected chapter heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCandidate {
    /// Byte offset of the heading in the normalized text
    pub offset: usize,
    /// Convention that matched
    pub pattern_class: PatternClass,
    /// Cleaned-up heading used as the chapter title
    pub heading_text: String,
    /// Byte offset just past the heading line, terminator included
    pub heading_end: usize,
}

/// One chapter of a [`ChapterSet`]
///
/// `body_start..body_end` is the chapter's span of the normalized text.
/// Spans of consecutive chapters touch and together cover the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Position in the set, starting at 0
    pub index: usize,
    /// Chapter title
    pub title: String,
    /// Start of the span
    pub body_start: usize,
    /// End of the span (exclusive)
    pub body_end: usize,
    /// Start of the content after the heading line
    pub content_start: usize,
    /// How the chapter boundary was found
    pub class: PatternClass,
}

impl Chapter {
    /// Byte range of the chapter's span
    pub fn range(&self) -> Range<usize> {
        self.body_start..self.body_end
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.body_end - self.body_start
    }

    /// Whether the span is empty
    pub fn is_empty(&self) -> bool {
        self.body_start == self.body_end
    }
}

/// Title and body of a chapter, as handed to a container builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterEntry<'a> {
    /// Chapter index
    pub index: usize,
    /// Chapter title
    pub title: &'a str,
    /// Chapter content without its heading line
    pub body: &'a str,
}

/// Ordered, gap-free chapters of one document
#[derive(Debug, Clone)]
pub struct ChapterSet {
    document: Arc<DecodedDocument>,
    text: String,
    chapters: Vec<Chapter>,
}

impl ChapterSet {
    pub(crate) fn new(document: Arc<DecodedDocument>, text: String, chapters: Vec<Chapter>) -> Self {
        Self {
            document,
            text,
            chapters,
        }
    }

    /// Decoded document the chapters were derived from
    pub fn document(&self) -> &DecodedDocument {
        &self.document
    }

    /// Normalized text the chapter offsets refer to
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All chapters in order
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Number of chapters
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether no chapters were produced
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Full span text of a chapter, heading line included
    pub fn raw_text(&self, chapter: &Chapter) -> &str {
        &self.text[chapter.range()]
    }

    /// Content of a chapter after its heading line
    pub fn body(&self, chapter: &Chapter) -> &str {
        &self.text[chapter.content_start..chapter.body_end]
    }

    /// `{title, body}` pairs in chapter order
    pub fn entries(&self) -> impl Iterator<Item = ChapterEntry<'_>> + '_ {
        self.chapters.iter().map(move |chapter| ChapterEntry {
            index: chapter.index,
            title: &chapter.title,
            body: self.body(chapter),
        })
    }

    /// Chapter titles in order
    pub fn titles(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.title.as_str()).collect()
    }
}
