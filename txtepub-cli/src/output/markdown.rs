//! Markdown manifest

use super::container_error;
use std::io::{self, Write};
use txtepub_core::{BookMetadata, ChapterSet, ContainerBuilder, Result};

/// Markdown manifest: book title as `#`, chapters as `##`
pub struct MarkdownManifest<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownManifest<W> {
    /// Create a new markdown manifest writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_all(&mut self, metadata: &BookMetadata, chapters: &ChapterSet) -> io::Result<()> {
        writeln!(self.writer, "# {}", metadata.title)?;
        writeln!(self.writer)?;
        if let Some(author) = &metadata.author {
            writeln!(self.writer, "*{author}*")?;
            writeln!(self.writer)?;
        }

        for entry in chapters.entries() {
            writeln!(self.writer, "## {}", entry.title)?;
            writeln!(self.writer)?;
            let body = entry.body.trim();
            if !body.is_empty() {
                writeln!(self.writer, "{body}")?;
                writeln!(self.writer)?;
            }
        }

        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total chapters: {}*", chapters.len())?;
        self.writer.flush()
    }
}

impl<W: Write> ContainerBuilder for MarkdownManifest<W> {
    type Output = ();

    fn build(&mut self, metadata: &BookMetadata, chapters: &ChapterSet) -> Result<()> {
        self.write_all(metadata, chapters).map_err(container_error)
    }
}
