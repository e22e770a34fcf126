//! Engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! identity_mode = "strict"
//!
//! [critical]
//! critical_types = ["IfcWall", "IfcColumn", "IfcBeam"]
//! dimension_keys = ["height", "thickness", "material"]
//! max_listed = 20
//!
//! [matrix]
//! parallel = false
//! ```

use crate::diff::DiffOptions;
use crate::errors::{BimDiffError, Result};
use crate::identity::IdentityMode;
use crate::matrix::MatrixOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Duplicate identity handling for every comparison
    #[serde(default)]
    pub identity_mode: IdentityMode,

    /// Critical change classification
    #[serde(default)]
    pub critical: CriticalTypeConfig,

    /// Multi-version matrix settings
    #[serde(default)]
    pub matrix: MatrixOptions,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the document does not parse or fails validation.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(source).map_err(|e| BimDiffError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| BimDiffError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        self.critical.validate()
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            identity_mode: self.identity_mode,
        }
    }

    /// Matrix options with this config's identity mode applied
    pub fn matrix_options(&self) -> MatrixOptions {
        MatrixOptions {
            diff: self.diff_options(),
            ..self.matrix
        }
    }
}

/// Which element types are structural and which property keys count as
/// dimension or material changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalTypeConfig {
    /// Type tags. Matching ignores case, separators and a leading `Ifc`.
    #[serde(default = "default_critical_types")]
    pub critical_types: Vec<String>,

    /// Tokens matched against the last segment of a property key
    #[serde(default = "default_dimension_keys")]
    pub dimension_keys: Vec<String>,

    /// Cap on the detailed change list; summary counts are never capped
    #[serde(default = "default_max_listed")]
    pub max_listed: usize,
}

fn default_critical_types() -> Vec<String> {
    [
        "wall",
        "wall standard case",
        "column",
        "column standard case",
        "beam",
        "beam standard case",
        "slab",
        "slab standard case",
        "footing",
        "pile",
        "member",
        "member standard case",
        "plate",
        "plate standard case",
        "roof",
        "stair",
        "ramp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_dimension_keys() -> Vec<String> {
    [
        "height",
        "width",
        "length",
        "thickness",
        "depth",
        "area",
        "volume",
        "span",
        "diameter",
        "elevation",
        "material",
        "loadbearing",
        "profile",
        "section",
        "grade",
        "strength",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_listed() -> usize {
    50
}

impl Default for CriticalTypeConfig {
    fn default() -> Self {
        Self {
            critical_types: default_critical_types(),
            dimension_keys: default_dimension_keys(),
            max_listed: default_max_listed(),
        }
    }
}

/// Critical type tags in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalTypeSet {
    tags: HashSet<String>,
}

impl CriticalTypeSet {
    /// True when `element_type` normalizes to one of the tags. A type with
    /// no letters or digits never matches.
    pub fn contains(&self, element_type: &str) -> bool {
        let wanted = normalize_type_tag(element_type);
        !wanted.is_empty() && self.tags.contains(&wanted)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Canonical form of a type tag: alphanumerics only, lowercased, with a
/// leading `ifc` removed. `IfcWallStandardCase` and `wall standard case`
/// both become `wallstandardcase`.
pub fn normalize_type_tag(tag: &str) -> String {
    let folded: String = tag
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    match folded.strip_prefix("ifc") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => folded,
    }
}

/// Last `.`-separated segment of a property key, lowercased.
/// `Pset_WallCommon.LoadBearing` becomes `loadbearing`.
pub fn property_key_leaf(key: &str) -> String {
    key.rsplit('.').next().unwrap_or(key).to_lowercase()
}

impl CriticalTypeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_listed == 0 {
            return Err(BimDiffError::InvalidConfig {
                reason: "critical.max_listed must be at least 1".to_string(),
            });
        }
        if let Some(tag) = self
            .critical_types
            .iter()
            .find(|t| normalize_type_tag(t).is_empty())
        {
            return Err(BimDiffError::InvalidConfig {
                reason: format!(
                    "critical.critical_types entry '{}' has no letters or digits",
                    tag
                ),
            });
        }
        if self.dimension_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(BimDiffError::InvalidConfig {
                reason: "critical.dimension_keys must not contain blank entries".to_string(),
            });
        }
        Ok(())
    }

    /// Normalized critical type tags, for matching many elements.
    pub fn critical_type_set(&self) -> CriticalTypeSet {
        CriticalTypeSet {
            tags: self
                .critical_types
                .iter()
                .map(|t| normalize_type_tag(t))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_dimension_key(&self, property_name: &str) -> bool {
        let leaf = property_key_leaf(property_name);
        self.dimension_keys
            .iter()
            .any(|token| leaf.contains(&token.to_lowercase()))
    }
}
