use crate::errors::BimDiffError;
use crate::model::element::Element;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// The complete element set of one model version.
///
/// Element order carries no meaning for identity, but comparison output
/// follows it so repeated runs over the same input are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub version_id: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl ElementSnapshot {
    pub fn new(version_id: impl Into<String>) -> Self {
        Self {
            version_id: version_id.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_elements(version_id: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            version_id: version_id.into(),
            elements,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// SHA-256 over the canonical JSON form of the elements.
    ///
    /// Property maps serialize in key order, so two snapshots holding the same
    /// elements in the same order always share a digest. The version id is not
    /// part of the digest.
    pub fn content_digest(&self) -> Result<String, BimDiffError> {
        let canonical = serde_json::to_vec(&self.elements)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }
}
