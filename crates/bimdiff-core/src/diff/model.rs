//! Comparison output types.
//!
//! Field names serialize in camelCase and are a stable contract: table UIs,
//! report generators and 3D highlighting destructure these records by name.

use crate::identity::{IdentityKey, IdentityWarning};
use crate::model::{Element, PropertyValue};
use serde::{Deserialize, Deserializer, Serialize};

/// How an element changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

/// How a single property changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyChangeKind {
    Added,
    Removed,
    Changed,
}

/// Old/new values of one property. An absent side means the property did
/// not exist in that snapshot; a present `null` is a real value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub property_name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub old_value: Option<PropertyValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub new_value: Option<PropertyValue>,
}

/// A key that is present deserializes to `Some`, even when its value is `null`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<PropertyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    PropertyValue::deserialize(deserializer).map(Some)
}

impl PropertyChange {
    pub fn kind(&self) -> PropertyChangeKind {
        match (&self.old_value, &self.new_value) {
            (None, _) => PropertyChangeKind::Added,
            (_, None) => PropertyChangeKind::Removed,
            _ => PropertyChangeKind::Changed,
        }
    }
}

/// One changed element.
///
/// `property_changes` is present and non-empty only for `Modified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub express_id: Option<u64>,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_changes: Option<Vec<PropertyChange>>,
}

impl ElementChange {
    pub(crate) fn from_element(element: &Element, change_type: ChangeType) -> Self {
        Self {
            express_id: element.express_id,
            element_type: element.element_type.clone(),
            global_id: element.global_id.clone(),
            name: element.name.clone(),
            change_type,
            property_changes: None,
        }
    }

    pub(crate) fn modified(element: &Element, changes: Vec<PropertyChange>) -> Self {
        Self {
            property_changes: Some(changes),
            ..Self::from_element(element, ChangeType::Modified)
        }
    }

    /// Identity key by the same rule the resolver uses
    pub fn identity_key(&self) -> Option<IdentityKey> {
        IdentityKey::from_ids(self.global_id.as_deref(), self.express_id)
    }

    pub fn property_changes(&self) -> &[PropertyChange] {
        self.property_changes.as_deref().unwrap_or_default()
    }
}

/// Change counts; `total_changes` is always the sum of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStatistics {
    pub total_changes: usize,
    pub added_count: usize,
    pub removed_count: usize,
    pub modified_count: usize,
}

impl ComparisonStatistics {
    pub fn from_counts(added: usize, removed: usize, modified: usize) -> Self {
        Self {
            total_changes: added + removed + modified,
            added_count: added,
            removed_count: removed,
            modified_count: modified,
        }
    }
}

/// Which snapshots were compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonIdentity {
    pub old_version_id: String,
    pub new_version_id: String,
    /// SHA-256 of the old snapshot's canonical element list
    pub old_digest: String,
    pub new_digest: String,
}

/// Structured comparison of one snapshot pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub identity: ComparisonIdentity,
    pub added: Vec<ElementChange>,
    pub removed: Vec<ElementChange>,
    pub modified: Vec<ElementChange>,
    pub statistics: ComparisonStatistics,
    /// Non-fatal identity problems found in either snapshot
    #[serde(default)]
    pub warnings: Vec<IdentityWarning>,
}

impl ComparisonResult {
    pub(crate) fn new(
        identity: ComparisonIdentity,
        added: Vec<ElementChange>,
        removed: Vec<ElementChange>,
        modified: Vec<ElementChange>,
        warnings: Vec<IdentityWarning>,
    ) -> Self {
        let statistics = ComparisonStatistics::from_counts(added.len(), removed.len(), modified.len());
        Self {
            identity,
            added,
            removed,
            modified,
            statistics,
            warnings,
        }
    }

    /// True when the snapshots hold the same elements with the same properties
    pub fn is_unchanged(&self) -> bool {
        self.statistics.total_changes == 0
    }

    /// All changes: removed, then modified, then added
    pub fn all_changes(&self) -> impl Iterator<Item = &ElementChange> {
        self.removed
            .iter()
            .chain(self.modified.iter())
            .chain(self.added.iter())
    }
}
