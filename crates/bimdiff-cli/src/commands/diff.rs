//! Pairwise diff command

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use super::{load_config, service_for, CliResult};
use bimdiff_core::identity::IdentityMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Structured comparison result
    Json,
    /// Markdown summary for review
    Summary,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Snapshot file of the old version
    pub old: PathBuf,

    /// Snapshot file of the new version
    pub new: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Fail on duplicate identity keys instead of warning
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: DiffArgs) -> CliResult {
    let mut config = load_config(args.config.as_deref())?;
    if args.strict {
        config.identity_mode = IdentityMode::Strict;
    }

    let (service, ids) = service_for(&[args.old, args.new], config)?;
    let outcome = service.compare(&ids[0], &ids[1]).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome.result)?),
        OutputFormat::Summary => print!("{}", outcome.human_summary),
    }
    Ok(())
}
