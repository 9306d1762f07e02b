//! Hand-off to an ebook container builder

use crate::error::Result;
use crate::types::ChapterSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default book language
pub const DEFAULT_LANGUAGE: &str = "zh";

/// Book-level metadata passed along with the chapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Book title
    pub title: String,
    /// Author, if known
    pub author: Option<String>,
    /// Language tag
    pub language: String,
    /// Cover image bytes
    #[serde(skip)]
    pub cover: Option<Vec<u8>>,
}

impl BookMetadata {
    /// Metadata with the given title and defaults for everything else
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            language: DEFAULT_LANGUAGE.to_string(),
            cover: None,
        }
    }

    /// Metadata titled after the file stem of `source`
    pub fn from_source(source: &str) -> Self {
        let title = Path::new(source)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.trim().is_empty())
            .unwrap_or_else(|| source.to_string());
        Self::new(title)
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the language tag
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Attach cover image bytes
    pub fn with_cover(mut self, cover: Vec<u8>) -> Self {
        self.cover = Some(cover);
        self
    }
}

/// Packages a [`ChapterSet`] into some container format
///
/// Implementations live outside this crate; they receive chapters through
/// [`ChapterSet::entries`] and report failures as [`crate::Error::Container`].
pub trait ContainerBuilder {
    /// What the builder produces, e.g. bytes or a written path
    type Output;

    /// Build one container
    fn build(&mut self, metadata: &BookMetadata, chapters: &ChapterSet) -> Result<Self::Output>;
}
