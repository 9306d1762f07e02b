//! File reading utilities

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use txtepub_core::RawDocument;

/// Reads input files as raw bytes; decoding is left to the core
pub struct FileReader;

impl FileReader {
    /// Read a file into a [`RawDocument`] named after its path
    pub fn read_document(path: &Path) -> Result<RawDocument> {
        let bytes = Self::read_bytes(path)?;
        Ok(RawDocument::new(path.display().to_string(), bytes))
    }

    /// Read a file's raw bytes
    pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }
}
