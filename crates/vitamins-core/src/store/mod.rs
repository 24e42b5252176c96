//! Key-value storage backends for persisted tracker state.
//!
//! The tracker only needs string get/set/remove. Calls are synchronous;
//! the persistence layer decides what to do with failures.

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::TrackerError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError>;

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError>;

    fn remove(&self, key: &str) -> Result<(), TrackerError>;
}
