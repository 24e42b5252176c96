//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command. Every command
//! opens a tracker over the selected store, works on it, and (for commands
//! that change state) ends the session so the result is written back.

pub mod inspect;
pub mod listen;
pub mod maintain;
pub mod record;

use std::path::Path;
use std::sync::Arc;

use vitamins_core::store::{FileStore, KeyValueStore, SqliteStore};
use vitamins_core::{Tracker, TrackerConfig};

/// Open the store at `path`: a `.db` file is a SQLite store, anything else
/// is a directory of JSON files.
pub fn open_store(path: &Path) -> Result<Arc<dyn KeyValueStore>, String> {
    let is_sqlite = path.extension().map(|e| e == "db").unwrap_or(false);
    if is_sqlite {
        let path_str = path.to_string_lossy();
        let store = SqliteStore::open(&path_str)
            .map_err(|e| format!("Failed to open store '{}': {}", path.display(), e))?;
        Ok(Arc::new(store))
    } else {
        let store = FileStore::open(path)
            .map_err(|e| format!("Failed to open store '{}': {}", path.display(), e))?;
        Ok(Arc::new(store))
    }
}

/// Open a tracker, restoring what the store holds for its namespace/version.
pub fn open_tracker(store_path: &Path, config: TrackerConfig) -> Result<Tracker, String> {
    config.validate().map_err(|e| e.to_string())?;
    let store = open_store(store_path)?;
    Ok(Tracker::new(config, store))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
