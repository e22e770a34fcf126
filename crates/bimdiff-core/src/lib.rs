//! bimdiff core - version diffing for building-model element snapshots
//!
//! This crate provides the pure, synchronous comparison kernel:
//! - Element snapshot model with structurally compared property values
//! - Identity resolution across snapshots (globalId first, expressId fallback)
//! - Pairwise diff producing added, removed and modified element changes
//! - Critical change classification by structural type and touched keys
//! - N-way comparison matrix and its normalized heatmap
//!
//! Nothing here performs I/O apart from [`config::EngineConfig::load`].
//! Snapshot fetching and notification delivery live in `bimdiff-engine`.

pub mod classify;
pub mod config;
pub mod diff;
pub mod errors;
pub mod heatmap;
pub mod identity;
pub mod logging_facility;
pub mod matrix;
pub mod model;
pub mod notify;

// Re-export commonly used types
pub use classify::{classify, CriticalChange, CriticalChangeReport, CriticalChangeSummary, Severity};
pub use config::{CriticalTypeConfig, CriticalTypeSet, EngineConfig};
pub use diff::{compare_models, compare_models_with, ComparisonResult, DiffOptions};
pub use errors::{BimDiffError, ExError, ExErrorKind, Result};
pub use heatmap::generate_heatmap;
pub use identity::{IdentityKey, IdentityMode, IdentityWarning, SnapshotIndex};
pub use matrix::{
    compare_multiple_versions, compare_multiple_versions_with, CancellationFlag, MatrixOptions,
    MultiComparisonCell, MultiComparisonResult,
};
pub use model::{Element, ElementSnapshot, PropertyValue};
pub use notify::{ChangeNotifier, NoopChangeNotifier, RecordingChangeNotifier};
