//! N-way pairwise comparison matrix.
//!
//! Every ordered pair `(i, j)` with `i != j` is compared by the diff engine;
//! the diagonal is the zero cell and never runs the engine. Cells share no
//! state, so they are computed on the rayon pool unless
//! [`MatrixOptions::parallel`] is off.

use crate::diff::engine::compare_indexed;
use crate::diff::model::{ComparisonIdentity, ComparisonStatistics};
use crate::diff::DiffOptions;
use crate::errors::{BimDiffError, ExError};
use crate::heatmap::generate_heatmap;
use crate::identity::{IdentityWarning, SnapshotIndex};
use crate::model::ElementSnapshot;
use crate::{log_op_end, log_op_error, log_op_start};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Change counts for one ordered snapshot pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiComparisonCell {
    pub old_version_id: String,
    pub new_version_id: String,
    pub total_changes: usize,
    pub added_count: usize,
    pub removed_count: usize,
    pub modified_count: usize,
}

impl MultiComparisonCell {
    /// Cell with no changes
    pub fn zero(old_version_id: impl Into<String>, new_version_id: impl Into<String>) -> Self {
        Self::from_statistics(old_version_id, new_version_id, ComparisonStatistics::default())
    }

    pub fn from_statistics(
        old_version_id: impl Into<String>,
        new_version_id: impl Into<String>,
        statistics: ComparisonStatistics,
    ) -> Self {
        Self {
            old_version_id: old_version_id.into(),
            new_version_id: new_version_id.into(),
            total_changes: statistics.total_changes,
            added_count: statistics.added_count,
            removed_count: statistics.removed_count,
            modified_count: statistics.modified_count,
        }
    }
}

/// Aggregates over off-diagonal cells that have at least one change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixSummary {
    /// Always `N * (N - 1)`
    pub total_comparisons: usize,
    pub max_changes: usize,
    pub min_changes: usize,
    pub avg_changes: f64,
}

impl MatrixSummary {
    fn from_matrix(matrix: &[Vec<MultiComparisonCell>]) -> Self {
        let n = matrix.len();
        let changed: Vec<usize> = matrix
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(move |(j, _)| *j != i)
                    .map(|(_, cell)| cell.total_changes)
            })
            .filter(|&total| total > 0)
            .collect();

        let total_comparisons = n * n.saturating_sub(1);
        if changed.is_empty() {
            return Self {
                total_comparisons,
                ..Self::default()
            };
        }

        let sum: usize = changed.iter().sum();
        Self {
            total_comparisons,
            max_changes: changed.iter().copied().max().unwrap_or(0),
            min_changes: changed.iter().copied().min().unwrap_or(0),
            avg_changes: sum as f64 / changed.len() as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiComparisonResult {
    /// Input order; row and column `i` belong to `version_ids[i]`
    pub version_ids: Vec<String>,
    /// `matrix[i][j]` compares `version_ids[i]` (old) to `version_ids[j]` (new)
    pub matrix: Vec<Vec<MultiComparisonCell>>,
    pub summary: MatrixSummary,
    /// Duplicate identity keys, once per snapshot in input order
    #[serde(default)]
    pub warnings: Vec<IdentityWarning>,
}

impl MultiComparisonResult {
    pub fn cell(&self, old: usize, new: usize) -> Option<&MultiComparisonCell> {
        self.matrix.get(old).and_then(|row| row.get(new))
    }

    pub fn heatmap(&self) -> Vec<Vec<f64>> {
        generate_heatmap(&self.matrix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    /// Compute cells on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Per-cell comparison options; set from the engine config
    #[serde(skip)]
    pub diff: DiffOptions,
}

fn default_parallel() -> bool {
    true
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            diff: DiffOptions::default(),
        }
    }
}

impl MatrixOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Cooperative cancellation shared between a caller and a running matrix.
///
/// Checked before each cell; cells already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Compare every ordered pair of snapshots with default options.
///
/// # Errors
///
/// - `InvalidInput` for an empty list or any element without identity
/// - any error of a single pair; the matrix is all-or-nothing
pub fn compare_multiple_versions(
    snapshots: &[ElementSnapshot],
) -> Result<MultiComparisonResult, ExError> {
    compare_multiple_versions_with(snapshots, &MatrixOptions::default(), &CancellationFlag::new())
}

/// Compare every ordered pair of snapshots.
///
/// # Errors
///
/// - `InvalidInput` for an empty list or any element without identity
/// - `Cancelled` if `cancel` is set before all cells are computed
/// - any error of a single pair; the matrix is all-or-nothing
pub fn compare_multiple_versions_with(
    snapshots: &[ElementSnapshot],
    options: &MatrixOptions,
    cancel: &CancellationFlag,
) -> Result<MultiComparisonResult, ExError> {
    let started = Instant::now();
    log_op_start!(
        "compare_multiple_versions",
        version_count = snapshots.len(),
        parallel = options.parallel
    );

    match build_matrix(snapshots, options, cancel) {
        Ok(result) => {
            log_op_end!(
                "compare_multiple_versions",
                duration_ms = started.elapsed().as_millis() as u64,
                version_count = result.version_ids.len(),
                max_changes = result.summary.max_changes,
                warning_count = result.warnings.len()
            );
            Ok(result)
        }
        Err(err) => {
            let ex = ExError::from(err).with_op("compare_multiple_versions");
            log_op_error!(
                "compare_multiple_versions",
                ex.clone(),
                duration_ms = started.elapsed().as_millis() as u64
            );
            Err(ex)
        }
    }
}

fn build_matrix(
    snapshots: &[ElementSnapshot],
    options: &MatrixOptions,
    cancel: &CancellationFlag,
) -> Result<MultiComparisonResult, BimDiffError> {
    if snapshots.is_empty() {
        return Err(BimDiffError::EmptyVersionList);
    }

    let n = snapshots.len();
    let version_ids: Vec<String> = snapshots.iter().map(|s| s.version_id.clone()).collect();
    let digests: Vec<String> = snapshots
        .iter()
        .map(ElementSnapshot::content_digest)
        .collect::<Result<_, _>>()?;

    // one index per snapshot, so each duplicate is warned about once
    let indexes: Vec<SnapshotIndex<'_>> = snapshots
        .iter()
        .map(|snapshot| SnapshotIndex::build(snapshot, options.diff.identity_mode))
        .collect::<Result<_, _>>()?;
    let warnings: Vec<IdentityWarning> = indexes.iter().flat_map(|index| index.warnings(None)).collect();

    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect();
    let total = pairs.len();
    let completed = AtomicUsize::new(0);

    let compute_cell = |&(i, j): &(usize, usize)| -> Result<(usize, usize, ComparisonStatistics), BimDiffError> {
        if cancel.is_cancelled() {
            return Err(BimDiffError::Cancelled {
                completed: completed.load(Ordering::SeqCst),
                total,
            });
        }
        let identity = ComparisonIdentity {
            old_version_id: version_ids[i].clone(),
            new_version_id: version_ids[j].clone(),
            old_digest: digests[i].clone(),
            new_digest: digests[j].clone(),
        };
        let result = compare_indexed(&indexes[i], &indexes[j], identity);
        completed.fetch_add(1, Ordering::SeqCst);
        Ok((i, j, result.statistics))
    };

    let cells: Vec<(usize, usize, ComparisonStatistics)> = if options.parallel {
        pairs.par_iter().map(compute_cell).collect::<Result<_, _>>()?
    } else {
        pairs.iter().map(compute_cell).collect::<Result<_, _>>()?
    };

    let mut matrix: Vec<Vec<MultiComparisonCell>> = version_ids
        .iter()
        .map(|old| {
            version_ids
                .iter()
                .map(|new| MultiComparisonCell::zero(old.as_str(), new.as_str()))
                .collect()
        })
        .collect();
    for (i, j, statistics) in cells {
        matrix[i][j] =
            MultiComparisonCell::from_statistics(version_ids[i].as_str(), version_ids[j].as_str(), statistics);
    }

    let summary = MatrixSummary::from_matrix(&matrix);
    Ok(MultiComparisonResult {
        version_ids,
        matrix,
        summary,
        warnings,
    })
}
