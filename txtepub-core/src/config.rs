//! Conversion configuration

use crate::boundary::PatternDetector;
use crate::encoding::EncodingOptions;
use crate::error::{Error, Result};
use crate::normalize::NormalizeOptions;
use serde::{Deserialize, Serialize};

/// Default configuration constants
pub mod defaults {
    /// Longest line, in characters, still accepted as a heading
    pub const MAX_HEADING_CHARS: usize = 60;

    /// Titles are cut to this many characters
    pub const MAX_TITLE_CHARS: usize = 50;

    /// Minimum distance, in characters, between two headings with no body in between
    pub const PROXIMITY_CHARS: usize = 120;
}

/// Guard thresholds for heuristic heading detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicOptions {
    /// Length guard
    pub max_heading_chars: usize,
    /// Title truncation
    pub max_title_chars: usize,
    /// Proximity guard
    pub proximity_chars: usize,
}

impl Default for HeuristicOptions {
    fn default() -> Self {
        Self {
            max_heading_chars: defaults::MAX_HEADING_CHARS,
            max_title_chars: defaults::MAX_TITLE_CHARS,
            proximity_chars: defaults::PROXIMITY_CHARS,
        }
    }
}

impl HeuristicOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_heading_chars == 0 {
            return Err(Error::Configuration(
                "max_heading_chars must be greater than 0".into(),
            ));
        }
        if self.max_title_chars == 0 {
            return Err(Error::Configuration(
                "max_title_chars must be greater than 0".into(),
            ));
        }
        if self.proximity_chars == 0 {
            return Err(Error::Configuration(
                "proximity_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Everything a caller can configure about one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Use the heading table; `false` selects the custom pattern
    pub heuristic_mode: bool,
    /// Custom chapter pattern, required when `heuristic_mode` is off
    pub pattern: Option<String>,
    /// Merge runs of blank lines
    pub merge_blank_lines: bool,
    /// Trim every line
    pub trim_whitespace: bool,
    /// Collapse runs of spaces inside lines
    pub collapse_spaces: bool,
    /// Number of lines shown by the preview
    pub preview_line_count: Option<usize>,
    /// Heuristic guard thresholds
    pub heuristics: HeuristicOptions,
    /// Encoding detection thresholds
    pub encoding: EncodingOptions,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            heuristic_mode: true,
            pattern: None,
            merge_blank_lines: true,
            trim_whitespace: true,
            collapse_spaces: false,
            preview_line_count: None,
            heuristics: HeuristicOptions::default(),
            encoding: EncodingOptions::default(),
        }
    }
}

impl ConversionConfig {
    /// Create a configuration builder
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    /// Configuration for custom-pattern mode
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            heuristic_mode: false,
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Normalization toggles
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            merge_blank_lines: self.merge_blank_lines,
            trim_whitespace: self.trim_whitespace,
            collapse_spaces: self.collapse_spaces,
        }
    }

    /// Validate the configuration
    ///
    /// A custom pattern is compiled here so a malformed one is reported
    /// before any document is read.
    pub fn validate(&self) -> Result<()> {
        if self.heuristic_mode {
            if self.pattern.is_some() {
                return Err(Error::Configuration(
                    "a custom pattern requires heuristic_mode = false".into(),
                ));
            }
        } else {
            let pattern = self.pattern.as_deref().unwrap_or_default();
            PatternDetector::new(pattern)?;
        }

        if self.preview_line_count == Some(0) {
            return Err(Error::Configuration(
                "preview_line_count must be greater than 0".into(),
            ));
        }

        self.heuristics.validate()?;
        self.encoding.validate()?;
        Ok(())
    }
}

/// Fluent builder for [`ConversionConfig`]
#[derive(Debug, Default)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to custom-pattern mode with `pattern`
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.heuristic_mode = false;
        self.config.pattern = Some(pattern.into());
        self
    }

    /// Switch back to heuristic mode, dropping any pattern
    pub fn heuristic(mut self) -> Self {
        self.config.heuristic_mode = true;
        self.config.pattern = None;
        self
    }

    /// Merge runs of blank lines
    pub fn merge_blank_lines(mut self, enabled: bool) -> Self {
        self.config.merge_blank_lines = enabled;
        self
    }

    /// Trim every line
    pub fn trim_whitespace(mut self, enabled: bool) -> Self {
        self.config.trim_whitespace = enabled;
        self
    }

    /// Collapse runs of spaces inside lines
    pub fn collapse_spaces(mut self, enabled: bool) -> Self {
        self.config.collapse_spaces = enabled;
        self
    }

    /// Number of preview lines
    pub fn preview_line_count(mut self, lines: Option<usize>) -> Self {
        self.config.preview_line_count = lines;
        self
    }

    /// Heuristic guard thresholds
    pub fn heuristics(mut self, options: HeuristicOptions) -> Self {
        self.config.heuristics = options;
        self
    }

    /// Encoding detection thresholds
    pub fn encoding(mut self, options: EncodingOptions) -> Self {
        self.config.encoding = options;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ConversionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_heuristic_mode() {
        let config = ConversionConfig::default();
        assert!(config.heuristic_mode);
        assert!(config.merge_blank_lines);
        assert!(config.trim_whitespace);
        assert!(!config.collapse_spaces);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern_switches_mode() {
        let config = ConversionConfig::builder()
            .pattern(r"^第.+章")
            .merge_blank_lines(false)
            .build()
            .unwrap();
        assert!(!config.heuristic_mode);
        assert_eq!(config.pattern.as_deref(), Some(r"^第.+章"));
        assert!(!config.normalize_options().merge_blank_lines);
    }

    #[test]
    fn test_invalid_pattern_rejected_on_build() {
        let result = ConversionConfig::builder().pattern("(unclosed").build();
        assert!(matches!(result, Err(Error::InvalidPattern { pattern, .. }) if pattern == "(unclosed"));
    }

    #[test]
    fn test_custom_mode_without_pattern() {
        let config = ConversionConfig {
            heuristic_mode: false,
            ..ConversionConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_pattern_in_heuristic_mode_is_rejected() {
        let config = ConversionConfig {
            pattern: Some("^x".into()),
            ..ConversionConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let result = ConversionConfig::builder()
            .preview_line_count(Some(0))
            .build();
        assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("preview_line_count")));

        let result = ConversionConfig::builder()
            .heuristics(HeuristicOptions {
                max_heading_chars: 0,
                ..HeuristicOptions::default()
            })
            .build();
        assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("max_heading_chars")));

        let result = ConversionConfig::builder()
            .encoding(EncodingOptions {
                statistical_threshold: 1.5,
                ..EncodingOptions::default()
            })
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: ConversionConfig = toml::from_str(
            r#"
            heuristic_mode = false
            pattern = '^Chapter \d+'
            collapse_spaces = true

            [heuristics]
            proximity_chars = 80
            "#,
        )
        .unwrap();
        assert!(!config.heuristic_mode);
        assert!(config.collapse_spaces);
        assert!(config.trim_whitespace);
        assert_eq!(config.heuristics.proximity_chars, 80);
        assert_eq!(config.heuristics.max_heading_chars, defaults::MAX_HEADING_CHARS);
        assert!(config.validate().is_ok());
    }
}
