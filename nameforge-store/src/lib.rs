//! Persisted state and storage drivers for the nameforge naming engine.
//!
//! This crate owns everything that crosses the process boundary:
//!
//! - Serializable records for fields, profiles and the active profile
//! - The [`Driver`] trait with in-memory and JSON file backends
//! - Data directory resolution (`NAMEFORGE_DATA_DIR` override)
//! - Typed storage errors

pub mod driver;
pub mod error;
pub mod paths;
pub mod state;

pub use driver::{Driver, DriverKind, JsonDriver, MemoryDriver};
pub use error::{StoreError, StoreResult};
pub use paths::{DATA_DIR_ENV, data_dir, state_file_path};
pub use state::{DEFAULT_SEPARATOR, FieldKind, FieldRecord, ProfileRecord, RegistryState};
