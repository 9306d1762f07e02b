//! Chapter manifest output
//!
//! A manifest is what the CLI hands to an external ebook packager: book
//! metadata plus every chapter's title and body. Each format implements
//! [`ContainerBuilder`] over any writer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use txtepub_core::{ContainerBuilder, Error};

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonManifest;
pub use markdown::MarkdownManifest;
pub use text::TextManifest;

/// Supported manifest formats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text with a banner line per chapter
    #[default]
    Text,
    /// JSON document with metadata and a chapter array
    Json,
    /// Markdown with one second-level heading per chapter
    Markdown,
}

impl OutputFormat {
    /// Every format, in listing order
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Text, OutputFormat::Json, OutputFormat::Markdown];

    /// Name as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        }
    }

    /// File extension of written manifests
    ///
    /// The text extension is compound so a manifest saved next to its
    /// source never replaces it.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "chapters.txt",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }

    /// One-line description for `list formats`
    pub fn description(&self) -> &'static str {
        match self {
            OutputFormat::Text => "Plain text, one banner line per chapter",
            OutputFormat::Json => "JSON with book metadata and a chapter array",
            OutputFormat::Markdown => "Markdown, one `##` heading per chapter",
        }
    }

    /// Manifest builder writing to `writer`
    pub fn builder<'a, W: Write + 'a>(&self, writer: W) -> Box<dyn ContainerBuilder<Output = ()> + 'a> {
        match self {
            OutputFormat::Text => Box::new(TextManifest::new(writer)),
            OutputFormat::Json => Box::new(JsonManifest::new(writer)),
            OutputFormat::Markdown => Box::new(MarkdownManifest::new(writer)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a writer or serializer failure into the core's container error
pub(crate) fn container_error(e: impl fmt::Display) -> Error {
    Error::Container(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use txtepub_core::{BookMetadata, ConversionConfig, Converter, RawDocument};

    #[test]
    fn test_extensions_never_collide_with_txt_input() {
        for format in OutputFormat::ALL {
            assert_ne!(format.extension(), "txt");
        }
    }

    #[test]
    fn test_format_names_round_trip_through_serde() {
        for format in OutputFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format.as_str()));
        }
    }

    #[test]
    fn test_builder_dispatch() {
        let converter = Converter::new(ConversionConfig::default()).unwrap();
        let raw = RawDocument::new("b.txt", b"Chapter 1\nHello\n".to_vec());
        let conversion = converter.convert(&raw).unwrap();
        let metadata = BookMetadata::from_source("b.txt");

        let mut buffer = Vec::new();
        OutputFormat::Markdown
            .builder(&mut buffer)
            .build(&metadata, &conversion.chapters)
            .unwrap();
        assert!(String::from_utf8(buffer).unwrap().starts_with("# b\n"));
    }
}
