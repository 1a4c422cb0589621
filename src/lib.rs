// Library exports for the nameforge naming engine
//
// A `Registry` holds named fields (string, mapping or zero-padded integer),
// profiles that order those fields behind a separator, and the active
// profile used to compose and decompose names such as `L_rig_001`.
//
// Persisted state, storage drivers and data directory resolution live in the
// `nameforge-store` crate and are re-exported here.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod field;
pub mod profile;
pub mod registry;

pub use error::{NamingError, Result};
pub use field::{Field, FieldOptions, is_candidate, kind_from_payload};
pub use profile::{Decomposed, Profile};
pub use registry::Registry;

pub use nameforge_store::{
    DATA_DIR_ENV, DEFAULT_SEPARATOR, Driver, DriverKind, FieldKind, FieldRecord, JsonDriver,
    MemoryDriver, ProfileRecord, RegistryState, StoreError, data_dir, state_file_path,
};
pub use serde_json::Value;
