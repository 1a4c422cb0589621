//! Data directory resolution for the on-disk driver.
//!
//! Priority:
//! 1. `NAMEFORGE_DATA_DIR` when set to a non-empty value
//! 2. The per-user data directory (`~/.local/share/nameforge`, or the
//!    platform local data dir on Windows)

use std::ffi::OsStr;
use std::path::PathBuf;

/// Environment variable that overrides where the state file lives.
pub const DATA_DIR_ENV: &str = "NAMEFORGE_DATA_DIR";

/// File name of the JSON state document inside the data directory.
pub const STATE_FILE_NAME: &str = "state.json";

/// Resolve the data directory from an explicit override value.
///
/// Split out from [`data_dir`] so the precedence can be tested without
/// touching the process environment.
pub fn resolve_data_dir(override_dir: Option<&OsStr>) -> PathBuf {
    if let Some(dir) = override_dir
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    default_data_dir()
}

/// Get the data directory, honoring [`DATA_DIR_ENV`].
pub fn data_dir() -> PathBuf {
    let override_dir = std::env::var_os(DATA_DIR_ENV);
    let dir = resolve_data_dir(override_dir.as_deref());
    log::debug!("Naming data directory: {:?}", dir);
    dir
}

/// Get the default state file path
pub fn state_file_path() -> PathBuf {
    data_dir().join(STATE_FILE_NAME)
}

/// Per-user data directory, ignoring the environment override.
pub fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(data_dir) = dirs::data_local_dir() {
            data_dir.join("nameforge")
        } else {
            PathBuf::from("nameforge")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".local").join("share").join("nameforge")
        } else {
            // Fallback if home directory cannot be determined
            PathBuf::from("nameforge")
        }
    }
}
