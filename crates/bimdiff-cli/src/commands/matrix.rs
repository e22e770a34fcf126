//! Multi-version matrix command

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use super::{load_config, service_for, CliResult};

#[derive(Debug, Args)]
pub struct MatrixArgs {
    /// Snapshot files, one per version, in matrix order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Include the normalized heatmap in the output
    #[arg(long)]
    pub heatmap: bool,

    /// Compute cells on the calling thread only
    #[arg(long)]
    pub sequential: bool,

    /// Give up on the matrix after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

pub async fn execute(args: MatrixArgs) -> CliResult {
    let mut config = load_config(args.config.as_deref())?;
    if args.sequential {
        config.matrix.parallel = false;
    }

    let (service, ids) = service_for(&args.files, config)?;
    let outcome = service
        .compare_many(&ids, args.timeout_ms.map(Duration::from_millis))
        .await?;

    let rendered = if args.heatmap {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string_pretty(&outcome.result)?
    };
    println!("{}", rendered);
    Ok(())
}
