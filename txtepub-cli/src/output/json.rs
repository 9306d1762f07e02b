//! JSON manifest

use super::container_error;
use serde::Serialize;
use std::io::Write;
use txtepub_core::{BookMetadata, ChapterSet, ContainerBuilder, PatternClass, Result};

/// JSON manifest: one pretty-printed object per book
pub struct JsonManifest<W: Write> {
    writer: W,
}

/// Top-level JSON document
#[derive(Debug, Serialize)]
pub struct ManifestData<'a> {
    /// Book title
    pub title: &'a str,
    /// Author, if known
    pub author: Option<&'a str>,
    /// Language tag
    pub language: &'a str,
    /// Size of the cover image, if one was given
    pub cover_bytes: Option<usize>,
    /// Detected source encoding
    pub encoding: &'a str,
    /// Encoding detection confidence
    pub confidence: f32,
    /// Chapters in order
    pub chapters: Vec<ChapterData<'a>>,
}

/// One chapter in the JSON document
#[derive(Debug, Serialize)]
pub struct ChapterData<'a> {
    /// Chapter index
    pub index: usize,
    /// Chapter title
    pub title: &'a str,
    /// Heading convention the chapter was found by
    pub class: PatternClass,
    /// Chapter body without its heading line
    pub body: &'a str,
}

impl<W: Write> JsonManifest<W> {
    /// Create a new JSON manifest writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ContainerBuilder for JsonManifest<W> {
    type Output = ();

    fn build(&mut self, metadata: &BookMetadata, chapters: &ChapterSet) -> Result<()> {
        let document = chapters.document();
        let data = ManifestData {
            title: &metadata.title,
            author: metadata.author.as_deref(),
            language: &metadata.language,
            cover_bytes: metadata.cover.as_ref().map(Vec::len),
            encoding: &document.encoding,
            confidence: document.confidence,
            chapters: chapters
                .chapters()
                .iter()
                .map(|chapter| ChapterData {
                    index: chapter.index,
                    title: &chapter.title,
                    class: chapter.class,
                    body: chapters.body(chapter),
                })
                .collect(),
        };

        serde_json::to_writer_pretty(&mut self.writer, &data).map_err(container_error)?;
        writeln!(self.writer).map_err(container_error)?;
        self.writer.flush().map_err(container_error)
    }
}
