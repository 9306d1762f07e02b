//! CLI command implementations

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use txtepub_core::{ConversionConfig, Converter, HeadingTable};

use crate::output::OutputFormat;

pub mod convert;
pub mod generate_config;
pub mod preview;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split text files into chapters and write chapter manifests
    Convert(convert::ConvertArgs),

    /// Show the first lines, detected encoding and chapters of a file
    Preview(preview::PreviewArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },

    /// Write a heading table template to start a custom table from
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Check a heading table file
    Validate(validate::ValidateArgs),
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List built-in heading patterns in matching order
    Patterns,

    /// List available output formats
    Formats,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Convert(args) => args.execute(),
            Commands::Preview(args) => args.execute(),
            Commands::List { subcommand } => subcommand.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
        }
    }
}

impl ListCommands {
    /// Print the requested listing
    pub fn execute(&self) -> Result<()> {
        match self {
            ListCommands::Patterns => {
                let table = HeadingTable::builtin()?;
                println!("Built-in heading patterns (first match wins):");
                for rule in table.rules() {
                    println!(
                        "  {:<20} {}",
                        rule.class().as_str(),
                        rule.description().unwrap_or(rule.pattern())
                    );
                }
            }
            ListCommands::Formats => {
                println!("Available output formats:");
                for format in OutputFormat::ALL {
                    println!("  {:<10} {}", format.as_str(), format.description());
                }
            }
        }
        Ok(())
    }
}

/// Chapter detection flags shared by `convert` and `preview`
#[derive(Debug, Clone, Default, Args)]
pub struct DetectionArgs {
    /// Custom chapter pattern (regex, matched per line); disables the heuristics
    #[arg(short, long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Heading table replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub headings: Option<PathBuf>,
}

impl DetectionArgs {
    /// Switch `config` to custom-pattern mode if a pattern was given
    pub fn apply(&self, config: &mut ConversionConfig) {
        if let Some(pattern) = &self.pattern {
            config.heuristic_mode = false;
            config.pattern = Some(pattern.clone());
        }
    }

    /// Build a converter for `config`, loading the heading table if one was given
    pub fn converter(&self, config: ConversionConfig) -> Result<(Converter, Option<Arc<HeadingTable>>)> {
        let table = match &self.headings {
            Some(path) if config.heuristic_mode => {
                let table = HeadingTable::from_file(path)
                    .with_context(|| format!("Failed to load heading table {}", path.display()))?;
                log::info!("Using heading table {}", path.display());
                Some(Arc::new(table))
            }
            Some(path) => {
                log::warn!(
                    "Ignoring heading table {} in custom pattern mode",
                    path.display()
                );
                None
            }
            None => None,
        };

        let converter = match &table {
            Some(table) => Converter::with_heading_table(config, Arc::clone(table)),
            None => Converter::new(config),
        }
        .context("Invalid conversion settings")?;
        Ok((converter, table))
    }
}

/// Initialize logging based on verbosity level
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if !quiet {
        // A second init in the same process (tests) is harmless
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .try_init();
    }
}
