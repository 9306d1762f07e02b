//! Preview command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use txtepub_core::preview::DEFAULT_LINE_COUNT;
use txtepub_core::ConversionConfig;

use super::{init_logging, DetectionArgs};
use crate::config::CliConfig;
use crate::input::FileReader;

/// Arguments for the preview command
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// File to preview
    #[arg(short, long, value_name = "FILE", required = true)]
    pub input: PathBuf,

    /// Number of lines to show
    #[arg(short = 'n', long, value_name = "K", default_value_t = DEFAULT_LINE_COUNT)]
    pub lines: usize,

    #[command(flatten)]
    pub detection: DetectionArgs,

    /// Print the preview as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl PreviewArgs {
    /// Execute the preview command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, false);

        let cli_config = CliConfig::load(self.config.as_deref())?;
        let (converter, _) = self.detection.converter(self.conversion_config(&cli_config))?;
        let document = FileReader::read_document(&self.input)?;
        let preview = converter
            .preview(&document)
            .with_context(|| format!("Failed to preview {}", self.input.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            print!("{preview}");
        }
        Ok(())
    }

    fn conversion_config(&self, cli_config: &CliConfig) -> ConversionConfig {
        let mut config = cli_config.conversion.clone();
        config.preview_line_count = Some(self.lines);
        self.detection.apply(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(lines: usize) -> PreviewArgs {
        PreviewArgs {
            input: PathBuf::from("a.txt"),
            lines,
            detection: DetectionArgs::default(),
            json: false,
            config: None,
            verbose: 0,
        }
    }

    #[test]
    fn test_line_count_reaches_config() {
        let config = args(5).conversion_config(&CliConfig::default());
        assert_eq!(config.preview_line_count, Some(5));
    }

    #[test]
    fn test_zero_lines_is_rejected() {
        let config = args(0).conversion_config(&CliConfig::default());
        assert!(DetectionArgs::default().converter(config).is_err());
    }
}
