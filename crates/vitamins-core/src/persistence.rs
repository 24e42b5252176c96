//! PersistenceBridge — load tracker state at startup, save it at session end.
//!
//! Key layout: `vitamins_<namespace>_<version>_trail` and
//! `vitamins_<namespace>_<version>_errors`, each holding a JSON array
//! ordered newest-first.
//!
//! Nothing here fails the caller:
//! - Missing keys load as empty sequences
//! - Corrupt JSON loads as an empty sequence (logged)
//! - Write failures are logged and dropped; saves are never retried

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;

use crate::config::STORAGE_PREFIX;
use crate::error::TrackerError;
use crate::models::{ErrorNode, TrailEntry};
use crate::store::KeyValueStore;

/// Which persisted sequence a key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Trail,
    Errors,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Trail => "trail",
            StateKind::Errors => "errors",
        }
    }
}

/// State restored from storage, newest-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub trail: Vec<TrailEntry>,
    pub errors: Vec<ErrorNode>,
}

#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    version: String,
}

impl PersistenceBridge {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        namespace: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            version: version.into(),
        }
    }

    pub fn key(&self, kind: StateKind) -> String {
        storage_key(&self.namespace, &self.version, kind)
    }

    /// Load both sequences, dropping entries older than `ttl_hours`.
    pub fn load(&self, ttl_hours: u64) -> PersistedState {
        self.load_at(ttl_hours, Utc::now())
    }

    /// Like [`load`](Self::load) with an explicit clock.
    pub fn load_at(&self, ttl_hours: u64, now: DateTime<Utc>) -> PersistedState {
        let cutoff = i64::try_from(ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_sub_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let trail: Vec<TrailEntry> = self
            .read_sequence::<TrailEntry>(StateKind::Trail)
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect();
        let errors: Vec<ErrorNode> = self
            .read_sequence::<ErrorNode>(StateKind::Errors)
            .into_iter()
            .filter(|n| n.timestamp >= cutoff)
            .collect();

        tracing::info!(
            "[Persistence] Loaded {} crumbs and {} errors for {}/{}",
            trail.len(),
            errors.len(),
            self.namespace,
            self.version
        );

        PersistedState { trail, errors }
    }

    /// Write both sequences. Failures are logged, never returned.
    pub fn save(&self, trail: &[TrailEntry], errors: &[ErrorNode]) {
        self.write_sequence(StateKind::Trail, trail);
        self.write_sequence(StateKind::Errors, errors);
        tracing::info!(
            "[Persistence] Saved {} crumbs and {} errors for {}/{}",
            trail.len(),
            errors.len(),
            self.namespace,
            self.version
        );
    }

    /// Remove both keys from the store. Failures are logged, never returned.
    pub fn purge(&self) {
        for kind in [StateKind::Trail, StateKind::Errors] {
            let key = self.key(kind);
            if let Err(e) = self.store.remove(&key) {
                tracing::warn!("[Persistence] Failed to remove '{}': {}", key, e);
            }
        }
        tracing::info!(
            "[Persistence] Purged state for {}/{}",
            self.namespace,
            self.version
        );
    }

    fn read_sequence<T: DeserializeOwned>(&self, kind: StateKind) -> Vec<T> {
        let key = self.key(kind);
        match self.try_read(&key) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("[Persistence] Ignoring unreadable '{}': {}", key, e);
                Vec::new()
            }
        }
    }

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, TrackerError> {
        match self.store.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_sequence<T: serde::Serialize>(&self, kind: StateKind, items: &[T]) {
        let key = self.key(kind);
        if let Err(e) = self.try_write(&key, items) {
            tracing::warn!("[Persistence] Failed to write '{}': {}", key, e);
        }
    }

    fn try_write<T: serde::Serialize>(&self, key: &str, items: &[T]) -> Result<(), TrackerError> {
        let json = serde_json::to_string(items)?;
        self.store.set(key, &json)
    }
}

/// `vitamins_<namespace>_<version>_<kind>`
pub fn storage_key(namespace: &str, version: &str, kind: StateKind) -> String {
    format!(
        "{}_{}_{}_{}",
        STORAGE_PREFIX,
        namespace,
        version,
        kind.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorDetails, RawError};
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;

    fn bridge(store: &MemoryStore) -> PersistenceBridge {
        PersistenceBridge::new(Arc::new(store.clone()), "test", "1.0")
    }

    fn node_at(timestamp: DateTime<Utc>) -> ErrorNode {
        ErrorNode {
            timestamp,
            error: ErrorDetails {
                name: "type_error".into(),
                message: "test error".into(),
                stack: None,
            },
            tags: vec!["UI".into()],
            environment: BTreeMap::new(),
            breadcrumbs: None,
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, TrackerError> {
            Err(TrackerError::Storage("disabled".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), TrackerError> {
            Err(TrackerError::Storage("quota exceeded".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), TrackerError> {
            Err(TrackerError::Storage("disabled".into()))
        }
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(
            storage_key("test", "1.0", StateKind::Trail),
            "vitamins_test_1.0_trail"
        );
        assert_eq!(
            storage_key("test", "1.0", StateKind::Errors),
            "vitamins_test_1.0_errors"
        );
    }

    #[test]
    fn test_missing_keys_load_empty() {
        let store = MemoryStore::new();
        assert_eq!(bridge(&store).load(24), PersistedState::default());
    }

    #[test]
    fn test_corrupt_json_loads_empty() {
        let store = MemoryStore::new();
        store.set("vitamins_test_1.0_trail", "{not json").unwrap();
        store.set("vitamins_test_1.0_errors", r#"[{"unexpected":true}]"#).unwrap();
        let state = bridge(&store).load(24);
        assert!(state.trail.is_empty());
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_ttl_filtering() {
        let store = MemoryStore::new();
        let old = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let fresh = Utc::now();
        let bridge = bridge(&store);
        bridge.save(
            &[
                TrailEntry::new("fresh", "test").with_timestamp(fresh),
                TrailEntry::new("old", "test").with_timestamp(old),
            ],
            &[node_at(old), node_at(fresh)],
        );

        let state = bridge.load(24);
        assert_eq!(state.trail.len(), 1);
        assert_eq!(state.trail[0].message, "fresh");
        assert_eq!(state.errors.len(), 1);
        assert_eq!(state.errors[0].timestamp, fresh);
    }

    #[test]
    fn test_ttl_window_boundary() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let bridge = bridge(&store);
        bridge.save(
            &[
                TrailEntry::new("inside", "t").with_timestamp(now - Duration::hours(23)),
                TrailEntry::new("outside", "t").with_timestamp(now - Duration::hours(25)),
            ],
            &[],
        );
        let state = bridge.load_at(24, now);
        assert_eq!(state.trail.len(), 1);
        assert_eq!(state.trail[0].message, "inside");
    }

    #[test]
    fn test_round_trip() {
        let store = MemoryStore::new();
        let bridge = bridge(&store);
        let trail = vec![TrailEntry::new("b", "UI"), TrailEntry::new("a", "UI")];
        let mut node = ErrorNode::from_reportable(&RawError::http("gone", 410), &[], BTreeMap::new());
        node.breadcrumbs = Some(vec![TrailEntry::new("c", "Network")]);
        let errors = vec![node];

        bridge.save(&trail, &errors);
        let state = bridge.load(u64::MAX);
        assert_eq!(state.trail, trail);
        assert_eq!(state.errors, errors);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let store = MemoryStore::new();
        let v1 = PersistenceBridge::new(Arc::new(store.clone()), "app", "1.0");
        let v2 = PersistenceBridge::new(Arc::new(store.clone()), "app", "2.0");
        v1.save(&[TrailEntry::new("from v1", "UI")], &[]);

        assert_eq!(v1.load(24).trail.len(), 1);
        assert!(v2.load(24).trail.is_empty());
    }

    #[test]
    fn test_broken_store_never_panics() {
        let bridge = PersistenceBridge::new(Arc::new(BrokenStore), "test", "1.0");
        bridge.save(&[TrailEntry::new("a", "UI")], &[]);
        bridge.purge();
        assert_eq!(bridge.load(24), PersistedState::default());
    }

    #[test]
    fn test_purge_removes_only_own_keys() {
        let store = MemoryStore::new();
        let mine = bridge(&store);
        let other = PersistenceBridge::new(Arc::new(store.clone()), "other", "1.0");
        mine.save(&[TrailEntry::new("a", "UI")], &[node_at(Utc::now())]);
        other.save(&[TrailEntry::new("b", "UI")], &[]);

        mine.purge();
        assert_eq!(
            store.keys(),
            vec![
                "vitamins_other_1.0_errors".to_string(),
                "vitamins_other_1.0_trail".to_string()
            ]
        );
    }
}
