//! Pairwise snapshot comparison.
//!
//! The entry point is [`compare_models`], which resolves element identity
//! across two snapshots and diffs the property bags of matched elements.

use crate::diff::model::{
    ChangeType, ComparisonIdentity, ComparisonResult, ElementChange, PropertyChange,
};
use crate::errors::{BimDiffError, ExError};
use crate::identity::{resolve_indexed, IdentityMode, SnapshotIndex};
use crate::model::{ElementSnapshot, Properties};
use crate::{log_op_end, log_op_error, log_op_start};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

/// Options for a pairwise comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub identity_mode: IdentityMode,
}

impl DiffOptions {
    pub fn strict() -> Self {
        Self {
            identity_mode: IdentityMode::Strict,
        }
    }
}

/// Diff two property bags over the union of their keys.
///
/// Both maps are sorted, so a single merge walk visits every key once and the
/// returned changes are in key order. Values are compared structurally.
pub fn diff_properties(old: &Properties, new: &Properties) -> Vec<PropertyChange> {
    let mut changes = Vec::new();
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        let order = match (old_iter.peek(), new_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((old_key, _)), Some((new_key, _))) => old_key.cmp(new_key),
        };

        match order {
            Ordering::Less => {
                if let Some((key, value)) = old_iter.next() {
                    changes.push(PropertyChange {
                        property_name: key.clone(),
                        old_value: Some(value.clone()),
                        new_value: None,
                    });
                }
            }
            Ordering::Greater => {
                if let Some((key, value)) = new_iter.next() {
                    changes.push(PropertyChange {
                        property_name: key.clone(),
                        old_value: None,
                        new_value: Some(value.clone()),
                    });
                }
            }
            Ordering::Equal => {
                if let (Some((key, old_value)), Some((_, new_value))) =
                    (old_iter.next(), new_iter.next())
                {
                    if old_value != new_value {
                        changes.push(PropertyChange {
                            property_name: key.clone(),
                            old_value: Some(old_value.clone()),
                            new_value: Some(new_value.clone()),
                        });
                    }
                }
            }
        }
    }

    changes
}

pub(crate) fn comparison_identity(
    old: &ElementSnapshot,
    new: &ElementSnapshot,
) -> Result<ComparisonIdentity, BimDiffError> {
    Ok(ComparisonIdentity {
        old_version_id: old.version_id.clone(),
        new_version_id: new.version_id.clone(),
        old_digest: old.content_digest()?,
        new_digest: new.content_digest()?,
    })
}

/// Compare two snapshots whose identity block is already known.
pub(crate) fn compare_with_identity(
    old: &ElementSnapshot,
    new: &ElementSnapshot,
    identity: ComparisonIdentity,
    options: &DiffOptions,
) -> Result<ComparisonResult, BimDiffError> {
    let old_index = SnapshotIndex::build(old, options.identity_mode)?;
    let new_index = SnapshotIndex::build(new, options.identity_mode)?;
    Ok(compare_indexed(&old_index, &new_index, identity))
}

/// Diff two indexed snapshots. No logging here: the matrix builder calls
/// this once per cell.
pub(crate) fn compare_indexed<'a>(
    old: &SnapshotIndex<'a>,
    new: &SnapshotIndex<'a>,
    identity: ComparisonIdentity,
) -> ComparisonResult {
    let resolution = resolve_indexed(old, new);

    let removed: Vec<ElementChange> = resolution
        .removed
        .iter()
        .map(|(_, element)| ElementChange::from_element(element, ChangeType::Removed))
        .collect();

    let modified: Vec<ElementChange> = resolution
        .matched
        .iter()
        .filter_map(|pair| {
            let changes = diff_properties(&pair.old.properties, &pair.new.properties);
            (!changes.is_empty()).then(|| ElementChange::modified(pair.new, changes))
        })
        .collect();

    let added: Vec<ElementChange> = resolution
        .added
        .iter()
        .map(|(_, element)| ElementChange::from_element(element, ChangeType::Added))
        .collect();

    ComparisonResult::new(identity, added, removed, modified, resolution.warnings)
}

/// Compare two snapshots with default options.
///
/// Comparing a snapshot with itself is valid and yields an empty result.
///
/// # Errors
///
/// - `InvalidInput` if an element has neither `globalId` nor `expressId`
/// - `Serialization` if a snapshot digest cannot be computed
pub fn compare_models(
    old: &ElementSnapshot,
    new: &ElementSnapshot,
) -> Result<ComparisonResult, ExError> {
    compare_models_with(old, new, &DiffOptions::default())
}

/// Compare two snapshots.
///
/// Removed and modified entries follow the old snapshot's element order,
/// added entries follow the new snapshot's order, so identical inputs give
/// byte-identical serialized output.
///
/// # Errors
///
/// - `InvalidInput` if an element has neither `globalId` nor `expressId`
/// - `AmbiguousIdentity` for duplicate keys under strict identity mode
/// - `Serialization` if a snapshot digest cannot be computed
pub fn compare_models_with(
    old: &ElementSnapshot,
    new: &ElementSnapshot,
    options: &DiffOptions,
) -> Result<ComparisonResult, ExError> {
    let started = Instant::now();
    log_op_start!(
        "compare_models",
        old_version = %old.version_id,
        new_version = %new.version_id
    );

    let outcome = comparison_identity(old, new)
        .and_then(|identity| compare_with_identity(old, new, identity, options));
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            log_op_end!(
                "compare_models",
                duration_ms = duration_ms,
                total_changes = result.statistics.total_changes,
                warning_count = result.warnings.len()
            );
            Ok(result)
        }
        Err(err) => {
            let ex = ExError::from(err).with_op("compare_models");
            log_op_error!("compare_models", ex.clone(), duration_ms = duration_ms);
            Err(ex)
        }
    }
}
