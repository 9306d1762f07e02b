//! Validate command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use txtepub_core::HeadingTable;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the heading table file to validate
    #[arg(short = 'c', long = "headings-config", value_name = "FILE", required = true)]
    pub headings_config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!(
            "Validating heading table: {}",
            self.headings_config.display()
        );

        match HeadingTable::from_file(&self.headings_config) {
            Ok(table) => {
                println!("✓ Heading table is valid!");
                println!("  Rules: {}", table.rules().len());
                let classes: Vec<_> = table.classes().iter().map(|c| c.as_str()).collect();
                println!("  Classes: {}", classes.join(", "));
                println!("  Tail ratio: {}", table.tail_ratio());
                Ok(())
            }
            Err(e) => {
                println!("✗ Heading table is invalid!");
                println!("  Error: {e}");
                Err(anyhow::anyhow!("Validation failed: {}", e))
            }
        }
    }
}
