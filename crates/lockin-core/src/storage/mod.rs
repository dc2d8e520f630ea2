mod config;
pub mod database;

pub use config::{Config, FocusConfig, FocusSourceKind, ScheduleConfig};
pub use database::{Database, SessionSummary};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `LOCKIN_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/lockin[-dev]/`, where `LOCKIN_ENV=dev` selects the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("LOCKIN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LOCKIN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lockin-dev")
            } else {
                base_dir.join("lockin")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
