//! Builder configuration.

use serde::{Deserialize, Serialize};

/// Attribute holding a state node's stable identifier.
pub const ID_PROPERTY: &str = "id";

/// What to do when several siblings in one child list share an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Keep the first sibling with a given id, skip the later ones.
    #[default]
    Reject,
    /// Let every occurrence claim an existing component (last match first),
    /// creating new ones once the matches run out.
    Allow,
}

/// Tunables for a [`ComponentBuilder`](super::ComponentBuilder).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use component_builder::builder::{BuilderConfig, DuplicateIdPolicy};
///
/// let config = BuilderConfig::from_json(r#"{ "duplicate_ids": "allow" }"#).unwrap();
/// assert_eq!(config.duplicate_ids, DuplicateIdPolicy::Allow);
/// assert_eq!(config.id_attribute, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Attribute read as the stable identifier.
    pub id_attribute: String,
    /// Panic on unknown types and missing ids instead of warning and skipping.
    /// On by default in debug builds.
    pub strict: bool,
    pub duplicate_ids: DuplicateIdPolicy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            id_attribute: ID_PROPERTY.to_string(),
            strict: cfg!(debug_assertions),
            duplicate_ids: DuplicateIdPolicy::default(),
        }
    }
}

impl BuilderConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_duplicate_ids(mut self, policy: DuplicateIdPolicy) -> Self {
        self.duplicate_ids = policy;
        self
    }

    pub fn with_id_attribute(mut self, name: &str) -> Self {
        self.id_attribute = name.to_string();
        self
    }
}
