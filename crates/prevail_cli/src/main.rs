//! Prevail CLI
//!
//! Command-line tools for Prevail database files. The tools read the raw
//! artifacts and need none of the application's record types.
//!
//! # Commands
//!
//! - `inspect` - Display record counts, index definitions and bucket counts
//! - `verify` - Check the index artifact against the data artifact

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Prevail command-line database tools.
#[derive(Parser)]
#[command(name = "prevail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display database statistics and index metadata
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify the index artifact against the data artifact
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Data file path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Data file path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Version => {
            println!("Prevail CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Prevail Core v{}", prevail_core::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn path_is_global() {
        let cli = Cli::parse_from(["prevail", "inspect", "--path", "db.prevail", "-f", "json"]);
        assert_eq!(cli.path, Some(PathBuf::from("db.prevail")));
        assert!(matches!(cli.command, Commands::Inspect { ref format } if format == "json"));
    }
}
