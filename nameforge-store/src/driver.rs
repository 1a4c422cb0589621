//! Storage drivers for registry state.
//!
//! A [`Driver`] saves and restores a [`RegistryState`]. Two backends exist:
//!
//! - [`MemoryDriver`]: keeps the serialized document in a process-local
//!   buffer. Used by tests; never touches disk.
//! - [`JsonDriver`]: writes the document to a JSON file, by default
//!   `<data dir>/state.json` (see [`crate::paths`]).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::paths;
use crate::state::RegistryState;

/// Which backend a driver is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Memory,
    Json,
}

impl DriverKind {
    /// Returns a human-readable display name for this variant
    pub fn display_name(&self) -> &'static str {
        match self {
            DriverKind::Memory => "in-memory",
            DriverKind::Json => "JSON file",
        }
    }
}

/// A backend that can persist and restore registry state.
pub trait Driver: std::fmt::Debug {
    /// Which backend this is.
    fn kind(&self) -> DriverKind;

    /// Persist `state`, replacing whatever was stored before.
    fn save(&mut self, state: &RegistryState) -> StoreResult<()>;

    /// Restore the last saved state. A backend with nothing stored yields
    /// the empty state.
    fn load(&mut self) -> StoreResult<RegistryState>;
}

fn parse_state(contents: &str) -> StoreResult<RegistryState> {
    if contents.trim().is_empty() {
        return Ok(RegistryState::new());
    }
    let state: RegistryState = serde_json::from_str(contents)?;
    state.validate()?;
    Ok(state)
}

// ============================================================================
// In-memory driver
// ============================================================================

/// Round-trips state through a JSON string held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    buffer: Option<String>,
}

impl MemoryDriver {
    /// Create a driver with nothing saved
    pub fn new() -> Self {
        Self::default()
    }

    /// The serialized document from the last save, if any.
    pub fn contents(&self) -> Option<&str> {
        self.buffer.as_deref()
    }
}

impl Driver for MemoryDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Memory
    }

    fn save(&mut self, state: &RegistryState) -> StoreResult<()> {
        let json = serde_json::to_string(state)?;
        log::debug!(
            "Saved {} fields and {} profiles to memory",
            state.fields.len(),
            state.profiles.len()
        );
        self.buffer = Some(json);
        Ok(())
    }

    fn load(&mut self) -> StoreResult<RegistryState> {
        match &self.buffer {
            Some(json) => parse_state(json),
            None => {
                log::debug!("Memory driver has no saved state, starting empty");
                Ok(RegistryState::new())
            }
        }
    }
}

// ============================================================================
// JSON file driver
// ============================================================================

/// Persists state as a pretty-printed JSON document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDriver {
    path: PathBuf,
}

impl JsonDriver {
    /// Create a driver writing to the default state file path
    pub fn new() -> Self {
        Self::with_path(paths::state_file_path())
    }

    /// Create a driver writing to a specific file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for JsonDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Json
    }

    fn save(&mut self, state: &RegistryState) -> StoreResult<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;

        // Write to a temp file then rename so a crash never leaves half a document
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &json)?;
        fs::rename(&temp_path, &self.path)?;

        log::info!(
            "Saved {} fields and {} profiles to {:?}",
            state.fields.len(),
            state.profiles.len(),
            self.path
        );
        Ok(())
    }

    fn load(&mut self) -> StoreResult<RegistryState> {
        log::debug!("Loading naming state from {:?}", self.path);
        if !self.path.exists() {
            log::info!(
                "No naming state found at {:?}, starting with empty state",
                self.path
            );
            return Ok(RegistryState::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let state = parse_state(&contents)?;
        log::info!(
            "Loaded {} fields and {} profiles from {:?}",
            state.fields.len(),
            state.profiles.len(),
            self.path
        );
        Ok(state)
    }
}
