//! Pairwise snapshot diff.
//!
//! Compares two element snapshots and produces a structured, deterministic
//! change set suitable for tables, reports and viewport highlighting.
//!
//! ## Entry point
//!
//! ```
//! use bimdiff_core::diff::{compare_models, render_human_summary};
//! use bimdiff_core::model::{Element, ElementSnapshot};
//!
//! let old = ElementSnapshot::new("v1").with_element(Element::new(1, "IfcWall"));
//! let new = ElementSnapshot::new("v2");
//! let result = compare_models(&old, &new).unwrap();
//! assert_eq!(result.statistics.removed_count, 1);
//! let summary = render_human_summary(&result);
//! assert!(summary.contains("Removed"));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce byte-identical serialized output.
//! - **Count consistency**: `totalChanges` is always the sum of the three lists.
//! - **Symmetry**: what is added from A to B is removed from B to A.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{compare_models, compare_models_with, diff_properties, DiffOptions};
pub use human_summary::render_human_summary;
pub use model::{
    ChangeType, ComparisonIdentity, ComparisonResult, ComparisonStatistics, ElementChange,
    PropertyChange, PropertyChangeKind,
};
