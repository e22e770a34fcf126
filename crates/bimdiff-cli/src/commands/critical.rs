//! Critical change report command

use clap::Args;
use std::path::PathBuf;

use super::{load_config, service_for, CliResult};

#[derive(Debug, Args)]
pub struct CriticalArgs {
    /// Snapshot file of the old version
    pub old: PathBuf,

    /// Snapshot file of the new version
    pub new: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: CriticalArgs) -> CliResult {
    let config = load_config(args.config.as_deref())?;
    let (service, ids) = service_for(&[args.old, args.new], config)?;
    let outcome = service.compare(&ids[0], &ids[1]).await?;

    println!("{}", serde_json::to_string_pretty(&outcome.critical)?);
    Ok(())
}
