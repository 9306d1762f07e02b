//! Configuration module

use crate::error::CliError;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use txtepub_core::container::DEFAULT_LANGUAGE;
use txtepub_core::ConversionConfig;

/// Default directory for written manifests
pub const DEFAULT_OUTPUT_DIR: &str = "epub_output";

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CliConfig {
    /// Conversion pipeline configuration
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| CliError::ConfigError(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default manifest format
    pub default_format: OutputFormat,

    /// Directory manifests are written to
    pub output_dir: PathBuf,

    /// Book language tag
    pub language: String,

    /// Book author
    pub author: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            language: DEFAULT_LANGUAGE.to_string(),
            author: None,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}

impl PerformanceConfig {
    /// Thread count for the batch driver, `None` meaning one per CPU
    pub fn threads(&self) -> Option<usize> {
        match self.worker_threads {
            0 => None,
            n => Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert!(config.conversion.heuristic_mode);
        assert_eq!(config.output.default_format, OutputFormat::Text);
        assert_eq!(config.output.output_dir, PathBuf::from("epub_output"));
        assert_eq!(config.output.language, "zh");
        assert_eq!(config.performance.threads(), None);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[conversion]
heuristic_mode = false
pattern = "^第.+章"
collapse_spaces = true

[output]
default_format = "json"
author = "佚名"

[performance]
worker_threads = 3
"#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert!(!config.conversion.heuristic_mode);
        assert_eq!(config.conversion.pattern.as_deref(), Some("^第.+章"));
        assert!(config.conversion.collapse_spaces);
        assert!(config.conversion.merge_blank_lines);
        assert_eq!(config.output.default_format, OutputFormat::Json);
        assert_eq!(config.output.author.as_deref(), Some("佚名"));
        assert_eq!(config.output.language, "zh");
        assert_eq!(config.performance.threads(), Some(3));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[output]\ndefault_format = \"epub\"\n").unwrap();

        let error = CliConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::ConfigError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let error = CliConfig::from_file(Path::new("/nonexistent/txtepub.toml")).unwrap_err();
        assert!(error.to_string().contains("Failed to read config file"));
    }
}
