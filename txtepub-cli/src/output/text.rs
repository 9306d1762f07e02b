//! Plain text manifest

use super::container_error;
use std::io::{self, Write};
use txtepub_core::{BookMetadata, ChapterSet, ContainerBuilder, Result};

/// Plain text manifest: a metadata header, then each chapter under a banner
pub struct TextManifest<W: Write> {
    writer: W,
}

impl<W: Write> TextManifest<W> {
    /// Create a new text manifest writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_all(&mut self, metadata: &BookMetadata, chapters: &ChapterSet) -> io::Result<()> {
        let document = chapters.document();
        writeln!(self.writer, "Title: {}", metadata.title)?;
        if let Some(author) = &metadata.author {
            writeln!(self.writer, "Author: {author}")?;
        }
        writeln!(self.writer, "Language: {}", metadata.language)?;
        writeln!(
            self.writer,
            "Encoding: {} (confidence {:.2})",
            document.encoding, document.confidence
        )?;
        writeln!(self.writer, "Chapters: {}", chapters.len())?;

        for entry in chapters.entries() {
            writeln!(self.writer)?;
            writeln!(self.writer, "=== {}. {} ===", entry.index + 1, entry.title)?;
            let body = entry.body.trim_end();
            if !body.is_empty() {
                writeln!(self.writer, "{body}")?;
            }
        }
        self.writer.flush()
    }
}

impl<W: Write> ContainerBuilder for TextManifest<W> {
    type Output = ();

    fn build(&mut self, metadata: &BookMetadata, chapters: &ChapterSet) -> Result<()> {
        self.write_all(metadata, chapters).map_err(container_error)
    }
}
