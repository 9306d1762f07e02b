//! Error and warning types
//!
//! Only [`Error`] stops a conversion. Everything in [`Warning`] is attached
//! to a best-effort result so the caller can surface it.

use std::fmt;
use thiserror::Error;

/// Fatal errors for a single conversion
#[derive(Debug, Error)]
pub enum Error {
    /// The custom chapter pattern is empty or does not compile
    #[error("invalid chapter pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern as supplied by the caller
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed heading table
    #[error("heading table error: {0}")]
    HeadingTable(String),

    /// The batch was cancelled before this file finished
    #[error("conversion cancelled")]
    Cancelled,

    /// Worker pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// Error reported by an external container builder
    #[error("container error: {0}")]
    Container(String),
}

impl Error {
    /// Build an [`Error::InvalidPattern`] for `pattern`
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal conditions attached to a conversion
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Input was empty or whitespace-only, no chapters were produced
    EmptyDocument,
    /// Heuristic mode found no headings, the whole text is one chapter
    NoChapterFound,
    /// Detected encoding is below the trust threshold
    LowConfidenceEncoding {
        /// Encoding label that was used anyway
        encoding: String,
        /// Reported confidence
        confidence: f32,
        /// Threshold it fell below
        threshold: f32,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyDocument => write!(f, "Document is empty, no chapters produced"),
            Warning::NoChapterFound => write!(
                f,
                "No chapter headings found, the whole document is one chapter \
                 (try a custom pattern)"
            ),
            Warning::LowConfidenceEncoding {
                encoding,
                confidence,
                threshold,
            } => write!(
                f,
                "Low confidence encoding detection: {encoding} ({confidence:.2} < {threshold:.2})"
            ),
        }
    }
}
