//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use txtepub_core::boundary::table::BUILTIN_HEADINGS;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating heading table template...");
        println!("  Output file: {}", self.output.display());

        fs::write(&self.output, self.generate_template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Heading table template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the rules; they are tried top to bottom");
        println!("2. Validate your table:");
        println!("   txtepub validate -c {}", self.output.display());
        println!("3. Use it for conversion:");
        println!(
            "   txtepub convert -i book.txt --headings {}",
            self.output.display()
        );

        Ok(())
    }

    /// Template content: the built-in table under a short banner
    fn generate_template(&self) -> String {
        format!(
            "# Generated by txtepub {}. This is the built-in table;\n\
             # reorder, remove or add rules to fit your books.\n\n{BUILTIN_HEADINGS}",
            env!("CARGO_PKG_VERSION")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use txtepub_core::{HeadingTable, PatternClass};

    #[test]
    fn test_generate_template() {
        let args = GenerateConfigArgs {
            output: PathBuf::from("headings.toml"),
        };

        let template = args.generate_template();
        assert!(template.starts_with("# Generated by txtepub"));
        assert!(template.contains("[[rules]]"));
        assert!(template.contains("tail_ratio"));
    }

    #[test]
    fn test_generated_file_is_a_valid_table() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("headings.toml");

        let args = GenerateConfigArgs {
            output: output_path.clone(),
        };
        assert!(args.execute().is_ok());

        let table = HeadingTable::from_file(&output_path).unwrap();
        assert!(table.classes().contains(&PatternClass::ChineseNumbered));
        assert_eq!(
            table.rules().len(),
            HeadingTable::builtin().unwrap().rules().len()
        );
    }

    #[test]
    fn test_unwritable_destination() {
        let args = GenerateConfigArgs {
            output: PathBuf::from("/nonexistent/dir/headings.toml"),
        };
        let error = args.execute().unwrap_err();
        assert!(error.to_string().contains("Failed to write"));
    }
}
