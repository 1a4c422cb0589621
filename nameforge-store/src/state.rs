//! Serializable registry state.
//!
//! These records are what storage drivers read and write. The in-memory
//! registry in the `nameforge` crate converts to and from [`RegistryState`]
//! and never hands its own types to a driver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// Separator used by profiles that do not set one.
pub const DEFAULT_SEPARATOR: &str = "_";

/// The typed payload of a field.
///
/// The variant is fixed when the field is created and decides how candidate
/// values are coerced into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form text. `value` is a placeholder and is only used as the
    /// synthesized default of an optional field.
    String { value: String },

    /// Short code to display token, e.g. `"l" -> "L"`.
    Mapping { value: BTreeMap<String, String> },

    /// Zero-padded integer. `value` is the seed used as the synthesized
    /// default of an optional field.
    Integer {
        value: i64,
        #[serde(default)]
        padding: usize,
    },
}

impl FieldKind {
    /// Lowercase name of the variant, matching the serialized `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String { .. } => "string",
            FieldKind::Mapping { .. } => "mapping",
            FieldKind::Integer { .. } => "integer",
        }
    }

    /// Whether `other` is the same variant, ignoring payloads.
    pub fn same_type(&self, other: &FieldKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A persisted field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Canonical token used when no input resolves the field
    #[serde(default)]
    pub default: Option<String>,

    /// Informational; the registry derives it from `default` on load
    #[serde(default = "default_true")]
    pub required: bool,

    /// Registration order
    #[serde(default)]
    pub order: usize,
}

/// A persisted profile definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Field names in composition order
    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default = "default_separator")]
    pub separator: String,

    /// Registration order
    #[serde(default)]
    pub order: usize,
}

/// Everything a driver saves and loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRecord>,

    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileRecord>,

    #[serde(default)]
    pub active_profile: Option<String>,
}

impl RegistryState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are no fields, no profiles and no active profile.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.profiles.is_empty() && self.active_profile.is_none()
    }

    /// Fields sorted by registration order, ties broken by name.
    pub fn fields_ordered(&self) -> Vec<(&String, &FieldRecord)> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by(|a, b| (a.1.order, a.0).cmp(&(b.1.order, b.0)));
        fields
    }

    /// Profiles sorted by registration order, ties broken by name.
    pub fn profiles_ordered(&self) -> Vec<(&String, &ProfileRecord)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by(|a, b| (a.1.order, a.0).cmp(&(b.1.order, b.0)));
        profiles
    }

    /// Check cross references between profiles and fields.
    ///
    /// A dangling `active_profile` is not an error here; the registry
    /// clears it when it adopts the state.
    pub fn validate(&self) -> StoreResult<()> {
        for (name, profile) in &self.profiles {
            if profile.separator.is_empty() {
                return Err(StoreError::Invalid(format!(
                    "profile '{name}' has an empty separator"
                )));
            }
            if let Some(missing) = profile
                .fields
                .iter()
                .find(|field| !self.fields.contains_key(*field))
            {
                return Err(StoreError::Invalid(format!(
                    "profile '{name}' references unknown field '{missing}'"
                )));
            }
        }
        Ok(())
    }
}
