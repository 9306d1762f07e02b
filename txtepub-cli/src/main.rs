//! txtepub command-line entry point

use clap::Parser;
use std::process::ExitCode;
use txtepub_cli::commands::Commands;

/// Split plain-text novels into chapters ready for ebook packaging
#[derive(Debug, Parser)]
#[command(name = "txtepub", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
