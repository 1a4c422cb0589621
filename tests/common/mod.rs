//! Shared integration test helpers for nameforge.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{sample_registry, json_registry};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use nameforge::{FieldOptions, JsonDriver, MemoryDriver, Registry};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Registers the `side`, `description` and `enumerator` fields.
///
/// - `side`: mapping `l/r/m -> L/R/M`, default `m`
/// - `description`: required free text
/// - `enumerator`: required integer padded to 3 digits
pub fn add_sample_fields(registry: &mut Registry) {
    registry
        .add_field(
            "side",
            json!({"l": "L", "r": "R", "m": "M"}),
            FieldOptions::new().with_default("m"),
        )
        .expect("add side");
    registry
        .add_field("description", "", FieldOptions::new())
        .expect("add description");
    registry
        .add_field("enumerator", 0, FieldOptions::new().padding(3))
        .expect("add enumerator");
}

/// Registry with the sample fields and an active `asset` profile using all
/// three, backed by an in-memory driver holding an empty snapshot.
pub fn sample_registry() -> Registry {
    let mut registry = Registry::new().with_driver(Box::new(MemoryDriver::new()));
    registry.save().expect("save empty state");
    add_sample_fields(&mut registry);
    registry
        .add_profile("asset", &["side", "description", "enumerator"], true)
        .expect("add asset profile");
    registry
}

/// Creates a temporary directory and returns the path of a state file
/// inside it.
///
/// The `TempDir` must be kept alive until all file I/O has completed.
pub fn state_path_in_tmp_dir() -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nameforge").join("state.json");
    (path, temp_dir)
}

/// Empty registry backed by a JSON driver writing into a temp dir.
pub fn json_registry() -> (Registry, PathBuf, TempDir) {
    let (path, temp_dir) = state_path_in_tmp_dir();
    let registry = Registry::new().with_driver(Box::new(JsonDriver::with_path(&path)));
    (registry, path, temp_dir)
}
