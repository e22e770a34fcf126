//! bimdiff CLI
//!
//! Command-line interface for comparing building-model snapshots

use bimdiff_core::logging_facility::{init, Profile};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "bimdiff")]
#[command(about = "bimdiff - Building model version comparison", long_about = None)]
struct Cli {
    /// Emit logs to stderr with this profile (dev or prod)
    #[arg(long, global = true)]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two snapshot files
    Diff(commands::diff::DiffArgs),
    /// Report structural changes between two snapshot files
    Critical(commands::critical::CriticalArgs),
    /// Compare every ordered pair of snapshot files
    Matrix(commands::matrix::MatrixArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(profile) = cli.log {
        init(profile);
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args).await,
        Commands::Critical(args) => commands::critical::execute(args).await,
        Commands::Matrix(args) => commands::matrix::execute(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
