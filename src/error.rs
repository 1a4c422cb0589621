//! Typed error types for nameforge.
//!
//! Every expected failure (bad input, unknown names, missing driver) comes
//! back as a [`NamingError`] value; nothing on these paths panics.

use nameforge_store::StoreError;
use thiserror::Error;

/// Errors produced by fields, profiles and the registry.
#[derive(Debug, Error)]
pub enum NamingError {
    // -----------------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------------
    /// A field payload or option set cannot define a field.
    #[error("Invalid field '{name}': {reason}")]
    InvalidField {
        /// Field being defined or updated.
        name: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// A profile definition is unusable.
    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile {
        /// Profile being defined or updated.
        name: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// A field with this name is already registered.
    #[error("Field '{0}' already exists")]
    DuplicateField(String),

    /// A profile with this name is already registered.
    #[error("Profile '{0}' already exists")]
    DuplicateProfile(String),

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------
    /// No field with this name is known.
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// No profile with this name is known.
    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),

    /// An operation needed the active profile but none is set.
    #[error("No active profile")]
    NoActiveProfile,

    // -----------------------------------------------------------------------
    // Composition
    // -----------------------------------------------------------------------
    /// The supplied values cannot produce a well-formed name.
    #[error("Cannot resolve name: {0}")]
    Unresolvable(String),

    /// A name does not decompose into the profile's fields.
    #[error("Malformed name '{name}': {reason}")]
    MalformedName {
        /// The name that was being decomposed.
        name: String,
        /// Which segment or count did not match.
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------
    /// `save` or `load` was called with no driver configured.
    #[error("No persistence driver configured; call set_driver first")]
    NoDriver,

    /// The driver failed to save or load.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for nameforge operations.
pub type Result<T> = std::result::Result<T, NamingError>;

impl NamingError {
    pub(crate) fn invalid_field(name: &str, reason: impl Into<String>) -> Self {
        NamingError::InvalidField {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        NamingError::MalformedName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
