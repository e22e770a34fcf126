//! Snapshot providers.
//!
//! A provider returns the element snapshot stored for a version id. The
//! engine only trusts the record shape; it never validates beyond parsing.

use async_trait::async_trait;
use bimdiff_core::errors::{BimDiffError, ExError, ExErrorKind};
use bimdiff_core::ElementSnapshot;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of element snapshots, keyed by version id.
///
/// Fetches are independent reads; callers issue them concurrently.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Fetch the snapshot of one version.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the provider has no snapshot for `version_id`
    /// - `Io` / `Serialization` if the stored snapshot cannot be read
    async fn fetch(&self, version_id: &str) -> Result<ElementSnapshot, ExError>;
}

fn missing(version_id: &str) -> ExError {
    ExError::from(BimDiffError::MissingSnapshot {
        role: "requested".to_string(),
        version_id: version_id.to_string(),
    })
    .with_op("fetch_snapshot")
}

/// Snapshots held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotProvider {
    snapshots: HashMap<String, ElementSnapshot>,
}

impl InMemorySnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot under its own version id, replacing any previous one
    pub fn insert(&mut self, snapshot: ElementSnapshot) {
        self.snapshots.insert(snapshot.version_id.clone(), snapshot);
    }

    pub fn with_snapshot(mut self, snapshot: ElementSnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[async_trait]
impl SnapshotProvider for InMemorySnapshotProvider {
    async fn fetch(&self, version_id: &str) -> Result<ElementSnapshot, ExError> {
        self.snapshots
            .get(version_id)
            .cloned()
            .ok_or_else(|| missing(version_id))
    }
}

/// One JSON file per version: `<root>/<version_id>.json`.
///
/// A file whose `versionId` is empty takes the requested id; a file that
/// declares a different id is rejected.
#[derive(Debug, Clone)]
pub struct FsSnapshotProvider {
    root: PathBuf,
}

impl FsSnapshotProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `version_id`
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the id is empty or could escape the root directory.
    pub fn path_for(&self, version_id: &str) -> Result<PathBuf, ExError> {
        let escapes = version_id.is_empty()
            || version_id.contains(['/', '\\'])
            || version_id == "."
            || version_id == "..";
        if escapes {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("fetch_snapshot")
                .with_version_id(version_id)
                .with_message("version id is not a valid file name"));
        }
        Ok(self.root.join(format!("{version_id}.json")))
    }
}

#[async_trait]
impl SnapshotProvider for FsSnapshotProvider {
    async fn fetch(&self, version_id: &str) -> Result<ElementSnapshot, ExError> {
        let path = self.path_for(version_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(missing(version_id)),
            Err(e) => {
                return Err(ExError::from(BimDiffError::from(e))
                    .with_op("fetch_snapshot")
                    .with_version_id(version_id))
            }
        };

        let mut snapshot: ElementSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            ExError::from(BimDiffError::from(e))
                .with_op("fetch_snapshot")
                .with_version_id(version_id)
        })?;

        if snapshot.version_id.is_empty() {
            snapshot.version_id = version_id.to_string();
        } else if snapshot.version_id != version_id {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("fetch_snapshot")
                .with_version_id(version_id)
                .with_message(format!(
                    "{} declares versionId '{}'",
                    path.display(),
                    snapshot.version_id
                )));
        }

        tracing::debug!(
            component = module_path!(),
            version_id,
            element_count = snapshot.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}
