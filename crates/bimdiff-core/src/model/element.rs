use crate::model::value::PropertyValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property bag of an element, keyed by property name.
///
/// A sorted map keeps property diffs and serialized output deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

/// One modeled entity at one version.
///
/// `express_id` is only unique within its snapshot; `global_id` is meant to
/// survive re-exports and is preferred for identity when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub express_id: Option<u64>,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl Element {
    pub fn new(express_id: u64, element_type: impl Into<String>) -> Self {
        Self {
            express_id: Some(express_id),
            element_type: element_type.into(),
            global_id: None,
            name: None,
            properties: Properties::new(),
        }
    }

    /// Element identified only by its global id
    pub fn with_global_id_only(global_id: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            express_id: None,
            element_type: element_type.into(),
            global_id: Some(global_id.into()),
            name: None,
            properties: Properties::new(),
        }
    }

    pub fn with_global_id(mut self, global_id: impl Into<String>) -> Self {
        self.global_id = Some(global_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
