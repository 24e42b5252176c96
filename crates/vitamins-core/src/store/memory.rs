use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::KeyValueStore;
use crate::error::TrackerError;

/// In-process store. Clones share the same map, so a test can keep a
/// handle and inspect what the tracker wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        match self.data.read() {
            Ok(data) => {
                let mut keys: Vec<String> = data.keys().cloned().collect();
                keys.sort();
                keys
            }
            Err(_) => Vec::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        let data = self
            .data
            .read()
            .map_err(|e| TrackerError::Storage(format!("Lock poisoned: {}", e)))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TrackerError::Storage(format!("Lock poisoned: {}", e)))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TrackerError::Storage(format!("Lock poisoned: {}", e)))?;
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(handle.get("k").unwrap(), Some("v".to_string()));
        handle.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
