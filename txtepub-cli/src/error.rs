//! Error handling for the CLI application

use std::fmt;

/// Custom error type for CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// No input file matched the given patterns
    NoInputFiles(Vec<String>),
    /// Invalid file pattern
    InvalidGlob(String),
    /// Configuration error
    ConfigError(String),
    /// Some files of a batch did not convert
    ConversionFailed {
        /// Files that failed or were cancelled
        failed: usize,
        /// Files in the batch
        total: usize,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NoInputFiles(patterns) => {
                write!(f, "No files found matching: {}", patterns.join(", "))
            }
            CliError::InvalidGlob(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::ConversionFailed { failed, total } => {
                write!(f, "{failed} of {total} files could not be converted")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
