//! bimdiff engine - orchestration layer
//!
//! Fetches snapshots through a [`provider::SnapshotProvider`], runs the core
//! comparison kernel and hands high-severity reports to a
//! [`bimdiff_core::notify::ChangeNotifier`].

pub mod commands;
pub mod provider;

pub use commands::compare::{ComparisonOutcome, ComparisonService, MatrixOutcome};
pub use provider::{FsSnapshotProvider, InMemorySnapshotProvider, SnapshotProvider};
