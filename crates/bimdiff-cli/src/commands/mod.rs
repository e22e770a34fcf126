//! Subcommands and the file loading they share.

pub mod critical;
pub mod diff;
pub mod matrix;

use bimdiff_core::classify::CriticalChangeReport;
use bimdiff_core::diff::ComparisonIdentity;
use bimdiff_core::errors::ExError;
use bimdiff_core::notify::ChangeNotifier;
use bimdiff_core::{ElementSnapshot, EngineConfig};
use bimdiff_engine::{ComparisonService, InMemorySnapshotProvider};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Prints a one-line alert on stderr for HIGH severity reports.
pub struct StderrNotifier;

impl ChangeNotifier for StderrNotifier {
    fn notify_critical_changes(
        &self,
        comparison: &ComparisonIdentity,
        report: &CriticalChangeReport,
    ) -> Result<(), ExError> {
        eprintln!(
            "critical: {} high severity change(s) between {} and {}",
            report.summary.high_severity, comparison.old_version_id, comparison.new_version_id
        );
        Ok(())
    }
}

/// Read one snapshot file. An empty `versionId` takes the file stem.
pub fn load_snapshot(path: &Path) -> Result<ElementSnapshot, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut snapshot: ElementSnapshot =
        serde_json::from_slice(&bytes).map_err(|e| format!("{}: {}", path.display(), e))?;
    if snapshot.version_id.is_empty() {
        snapshot.version_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(snapshot)
}

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(EngineConfig::load(path).map_err(ExError::from)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Load snapshot files into a comparison service.
///
/// Returns the service and the version ids in file order.
pub fn service_for(
    files: &[PathBuf],
    config: EngineConfig,
) -> Result<
    (
        ComparisonService<InMemorySnapshotProvider, StderrNotifier>,
        Vec<String>,
    ),
    Box<dyn std::error::Error>,
> {
    let mut loaded: HashMap<String, ElementSnapshot> = HashMap::new();
    let mut version_ids = Vec::with_capacity(files.len());
    for file in files {
        let snapshot = load_snapshot(file)?;
        // the same snapshot may be named twice; a different one under a taken id may not
        if let Some(existing) = loaded.get(&snapshot.version_id) {
            if existing != &snapshot {
                return Err(format!(
                    "{}: duplicate versionId '{}'",
                    file.display(),
                    snapshot.version_id
                )
                .into());
            }
        }
        version_ids.push(snapshot.version_id.clone());
        loaded.insert(snapshot.version_id.clone(), snapshot);
    }

    let provider = loaded
        .into_values()
        .fold(InMemorySnapshotProvider::new(), |provider, snapshot| {
            provider.with_snapshot(snapshot)
        });
    Ok((
        ComparisonService::new(provider, StderrNotifier, config),
        version_ids,
    ))
}
