//! FileStore — one file per key inside a directory.
//!
//! Storage path: `<dir>/<percent-encoded key>.json`. The encoding is
//! reversible, so distinct keys never share a file.

use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::TrackerError;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| TrackerError::Io(format!("Failed to create store dir: {}", e)))?;
        Ok(Self { dir })
    }

    /// Default location under the user's data directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vitamins")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TrackerError::Io(format!("Failed to read '{}': {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| TrackerError::Io(format!("Failed to write '{}': {}", key, e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| TrackerError::Io(format!("Failed to replace '{}': {}", key, e)))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrackerError::Io(format!("Failed to remove '{}': {}", key, e))),
        }
    }
}
