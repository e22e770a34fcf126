//! Element identity resolution across two snapshots.
//!
//! An element is identified by its `globalId` when it has a non-blank one and
//! by its `expressId` otherwise. The two key spaces are separate enum variants,
//! so a global id can never collide with an express id. Both snapshots are
//! indexed by the same rule and matched by exact key equality, which makes the
//! matching relation symmetric: resolving (A, B) and (B, A) yields the same
//! matched pairs with old and new swapped.

use crate::errors::BimDiffError;
use crate::model::{Element, ElementSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity of an element within one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "space", content = "value", rename_all = "camelCase")]
pub enum IdentityKey {
    Global(String),
    Express(u64),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Global(g) => write!(f, "globalId:{}", g),
            IdentityKey::Express(e) => write!(f, "expressId:{}", e),
        }
    }
}

impl IdentityKey {
    /// Key for a pair of raw ids: a non-blank global id wins, then the
    /// express id. `None` when neither is usable.
    pub fn from_ids(global_id: Option<&str>, express_id: Option<u64>) -> Option<Self> {
        match (global_id.filter(|g| !g.trim().is_empty()), express_id) {
            (Some(g), _) => Some(IdentityKey::Global(g.to_string())),
            (None, Some(e)) => Some(IdentityKey::Express(e)),
            (None, None) => None,
        }
    }
}

/// Identity key of an element, or `None` when it has no usable id at all.
pub fn identity_key(element: &Element) -> Option<IdentityKey> {
    IdentityKey::from_ids(element.global_id.as_deref(), element.express_id)
}

/// How duplicate identity keys inside one snapshot are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Keep the first occurrence and attach a warning to the result
    #[default]
    Lenient,
    /// Fail the comparison with `AmbiguousIdentity`
    Strict,
}

/// Which side of a comparison a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSide {
    Old,
    New,
}

/// A non-fatal identity problem found while indexing a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdentityWarning {
    /// Two elements share a key; the later one was ignored.
    #[serde(rename_all = "camelCase")]
    AmbiguousIdentity {
        /// Absent for snapshot-level warnings, such as those of a matrix
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<SnapshotSide>,
        version_id: String,
        key: IdentityKey,
        first_position: usize,
        duplicate_position: usize,
    },
}

/// A later element that repeats an earlier element's key.
#[derive(Debug, Clone, PartialEq)]
struct Duplicate {
    key: IdentityKey,
    first_position: usize,
    duplicate_position: usize,
}

/// One snapshot keyed by identity, reduced to first-occurrence elements in
/// input order.
///
/// Indexing depends on the snapshot alone, so a snapshot that takes part in
/// many comparisons is indexed once and its duplicates are reported once.
#[derive(Debug, Clone)]
pub struct SnapshotIndex<'a> {
    version_id: &'a str,
    entries: Vec<(IdentityKey, &'a Element)>,
    positions: HashMap<IdentityKey, usize>,
    duplicates: Vec<Duplicate>,
}

impl<'a> SnapshotIndex<'a> {
    /// Index a snapshot. Each skipped duplicate is logged once, at warn.
    ///
    /// # Errors
    ///
    /// - `ElementWithoutIdentity` if any element has neither id
    /// - `DuplicateIdentity` for a repeated key under [`IdentityMode::Strict`]
    pub fn build(snapshot: &'a ElementSnapshot, mode: IdentityMode) -> Result<Self, BimDiffError> {
        let capacity = snapshot.elements.len();
        let mut entries = Vec::with_capacity(capacity);
        let mut positions: HashMap<IdentityKey, usize> = HashMap::with_capacity(capacity);
        let mut duplicates = Vec::new();
        // input position of each kept entry
        let mut input_positions: Vec<usize> = Vec::with_capacity(capacity);

        for (position, element) in snapshot.elements.iter().enumerate() {
            let key = identity_key(element).ok_or_else(|| BimDiffError::ElementWithoutIdentity {
                version_id: snapshot.version_id.clone(),
                position,
            })?;

            if let Some(&kept) = positions.get(&key) {
                let first_position = input_positions[kept];
                if mode == IdentityMode::Strict {
                    return Err(BimDiffError::DuplicateIdentity {
                        version_id: snapshot.version_id.clone(),
                        key: key.to_string(),
                        first_position,
                        duplicate_position: position,
                    });
                }
                tracing::warn!(
                    component = module_path!(),
                    version_id = %snapshot.version_id,
                    key = %key,
                    first_position,
                    duplicate_position = position,
                    "duplicate identity key, keeping first occurrence"
                );
                duplicates.push(Duplicate {
                    key,
                    first_position,
                    duplicate_position: position,
                });
                continue;
            }

            positions.insert(key.clone(), entries.len());
            input_positions.push(position);
            entries.push((key, element));
        }

        Ok(Self {
            version_id: &snapshot.version_id,
            entries,
            positions,
            duplicates,
        })
    }

    pub fn version_id(&self) -> &'a str {
        self.version_id
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Duplicate keys as warnings. `side` is `None` when the snapshot is not
    /// tied to one side of a pair.
    pub fn warnings(&self, side: Option<SnapshotSide>) -> Vec<IdentityWarning> {
        self.duplicates
            .iter()
            .map(|d| IdentityWarning::AmbiguousIdentity {
                side,
                version_id: self.version_id.to_string(),
                key: d.key.clone(),
                first_position: d.first_position,
                duplicate_position: d.duplicate_position,
            })
            .collect()
    }
}

/// An element present in both snapshots.
#[derive(Debug, Clone)]
pub struct MatchedPair<'a> {
    pub key: IdentityKey,
    pub old: &'a Element,
    pub new: &'a Element,
}

/// Partition of two snapshots into matched, removed and added elements.
///
/// `matched` and `removed` follow the old snapshot's order, `added` follows
/// the new snapshot's order.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub matched: Vec<MatchedPair<'a>>,
    pub removed: Vec<(IdentityKey, &'a Element)>,
    pub added: Vec<(IdentityKey, &'a Element)>,
    pub warnings: Vec<IdentityWarning>,
}

/// Match elements of `old` against `new` by identity key.
///
/// Runs in O(n) over both snapshots using hash lookups.
///
/// # Errors
///
/// - `ElementWithoutIdentity` if any element has neither id
/// - `DuplicateIdentity` for a repeated key under [`IdentityMode::Strict`]
pub fn resolve<'a>(
    old: &'a ElementSnapshot,
    new: &'a ElementSnapshot,
    mode: IdentityMode,
) -> Result<Resolution<'a>, BimDiffError> {
    let old_index = SnapshotIndex::build(old, mode)?;
    let new_index = SnapshotIndex::build(new, mode)?;
    Ok(resolve_indexed(&old_index, &new_index))
}

/// Match two already indexed snapshots. Warnings carry the side each
/// snapshot plays here.
pub fn resolve_indexed<'a>(old: &SnapshotIndex<'a>, new: &SnapshotIndex<'a>) -> Resolution<'a> {
    let mut matched_new = vec![false; new.entries.len()];
    let mut matched = Vec::new();
    let mut removed = Vec::new();

    for (key, old_element) in &old.entries {
        match new.positions.get(key) {
            Some(&idx) => {
                matched_new[idx] = true;
                matched.push(MatchedPair {
                    key: key.clone(),
                    old: *old_element,
                    new: new.entries[idx].1,
                });
            }
            None => removed.push((key.clone(), *old_element)),
        }
    }

    let added = new
        .entries
        .iter()
        .zip(matched_new)
        .filter_map(|((key, element), was_matched)| (!was_matched).then(|| (key.clone(), *element)))
        .collect();

    let mut warnings = old.warnings(Some(SnapshotSide::Old));
    warnings.extend(new.warnings(Some(SnapshotSide::New)));

    Resolution {
        matched,
        removed,
        added,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(version: &str, elements: Vec<Element>) -> ElementSnapshot {
        ElementSnapshot::with_elements(version, elements)
    }

    #[test]
    fn test_global_id_preferred_over_express_id() {
        let el = Element::new(5, "IfcWall").with_global_id("g5");
        assert_eq!(identity_key(&el), Some(IdentityKey::Global("g5".into())));
        let bare = Element::new(5, "IfcWall");
        assert_eq!(identity_key(&bare), Some(IdentityKey::Express(5)));
    }

    #[test]
    fn test_blank_global_id_falls_back_to_express_id() {
        assert_eq!(IdentityKey::from_ids(Some("  "), Some(4)), Some(IdentityKey::Express(4)));
        assert_eq!(IdentityKey::from_ids(Some(""), None), None);
        let el = Element::new(4, "IfcSlab").with_global_id(" ");
        assert_eq!(identity_key(&el), Some(IdentityKey::Express(4)));
    }

    #[test]
    fn test_index_reports_duplicates_once_without_side() {
        let dup = snap(
            "d",
            vec![
                Element::new(1, "IfcWall"),
                Element::new(2, "IfcWall"),
                Element::new(1, "IfcWall"),
            ],
        );
        let index = SnapshotIndex::build(&dup, IdentityMode::Lenient).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.version_id(), "d");
        assert_eq!(
            index.warnings(None),
            vec![IdentityWarning::AmbiguousIdentity {
                side: None,
                version_id: "d".into(),
                key: IdentityKey::Express(1),
                first_position: 0,
                duplicate_position: 2,
            }]
        );
        let json = serde_json::to_value(&index.warnings(None)[0]).unwrap();
        assert!(json.get("side").is_none());
    }

    #[test]
    fn test_resolve_indexed_matches_resolve() {
        let old = snap("a", vec![Element::new(1, "IfcWall"), Element::new(2, "IfcSlab")]);
        let new = snap("b", vec![Element::new(2, "IfcSlab"), Element::new(3, "IfcBeam")]);
        let old_index = SnapshotIndex::build(&old, IdentityMode::Lenient).unwrap();
        let new_index = SnapshotIndex::build(&new, IdentityMode::Lenient).unwrap();
        let indexed = resolve_indexed(&old_index, &new_index);
        let direct = resolve(&old, &new, IdentityMode::Lenient).unwrap();
        assert_eq!(indexed.matched.len(), direct.matched.len());
        assert_eq!(indexed.removed[0].0, direct.removed[0].0);
        assert_eq!(indexed.added[0].0, direct.added[0].0);
    }

    #[test]
    fn test_key_spaces_do_not_collide() {
        // globalId "7" and expressId 7 are different identities
        let old = snap("a", vec![Element::with_global_id_only("7", "IfcWall")]);
        let new = snap("b", vec![Element::new(7, "IfcWall")]);
        let r = resolve(&old, &new, IdentityMode::Lenient).unwrap();
        assert!(r.matched.is_empty());
        assert_eq!(r.removed.len(), 1);
        assert_eq!(r.added.len(), 1);
    }

    #[test]
    fn test_matches_by_global_id_even_when_express_ids_differ() {
        let old = snap("a", vec![Element::new(1, "IfcWall").with_global_id("w")]);
        let new = snap("b", vec![Element::new(99, "IfcWall").with_global_id("w")]);
        let r = resolve(&old, &new, IdentityMode::Lenient).unwrap();
        assert_eq!(r.matched.len(), 1);
        assert_eq!(r.matched[0].new.express_id, Some(99));
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let old = snap(
            "a",
            vec![
                Element::new(3, "IfcWall"),
                Element::new(1, "IfcWall"),
                Element::new(2, "IfcWall"),
            ],
        );
        let new = snap(
            "b",
            vec![
                Element::new(9, "IfcDoor"),
                Element::new(2, "IfcWall"),
                Element::new(8, "IfcDoor"),
            ],
        );
        let r = resolve(&old, &new, IdentityMode::Lenient).unwrap();
        let removed: Vec<_> = r.removed.iter().map(|(k, _)| k.clone()).collect();
        let added: Vec<_> = r.added.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(removed, vec![IdentityKey::Express(3), IdentityKey::Express(1)]);
        assert_eq!(added, vec![IdentityKey::Express(9), IdentityKey::Express(8)]);
        assert_eq!(r.matched[0].key, IdentityKey::Express(2));
    }

    #[test]
    fn test_duplicate_key_keeps_first_and_warns() {
        let old = snap(
            "a",
            vec![
                Element::new(1, "IfcWall").with_global_id("dup").with_name("first"),
                Element::new(2, "IfcWall").with_global_id("dup").with_name("second"),
            ],
        );
        let new = snap("b", vec![]);
        let r = resolve(&old, &new, IdentityMode::Lenient).unwrap();
        assert_eq!(r.removed.len(), 1);
        assert_eq!(r.removed[0].1.name.as_deref(), Some("first"));
        assert_eq!(
            r.warnings,
            vec![IdentityWarning::AmbiguousIdentity {
                side: Some(SnapshotSide::Old),
                version_id: "a".into(),
                key: IdentityKey::Global("dup".into()),
                first_position: 0,
                duplicate_position: 1,
            }]
        );
    }

    #[test]
    fn test_duplicate_key_is_fatal_in_strict_mode() {
        let new = snap(
            "b",
            vec![Element::new(4, "IfcSlab"), Element::new(4, "IfcSlab")],
        );
        let err = resolve(&snap("a", vec![]), &new, IdentityMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            BimDiffError::DuplicateIdentity { first_position: 0, duplicate_position: 1, .. }
        ));
    }

    #[test]
    fn test_element_without_identity_fails_fast() {
        let mut orphan = Element::new(1, "IfcWall");
        orphan.express_id = None;
        let old = snap("a", vec![Element::new(2, "IfcWall"), orphan]);
        let err = resolve(&old, &snap("b", vec![]), IdentityMode::Lenient).unwrap_err();
        assert_eq!(
            err,
            BimDiffError::ElementWithoutIdentity {
                version_id: "a".into(),
                position: 1
            }
        );
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let w = IdentityWarning::AmbiguousIdentity {
            side: Some(SnapshotSide::New),
            version_id: "v2".into(),
            key: IdentityKey::Express(4),
            first_position: 0,
            duplicate_position: 3,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "ambiguousIdentity");
        assert_eq!(json["side"], "new");
        assert_eq!(json["duplicatePosition"], 3);
        assert_eq!(json["key"]["space"], "express");
    }
}
