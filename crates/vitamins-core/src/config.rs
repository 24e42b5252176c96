//! Tracker configuration.
//!
//! Loadable from YAML or JSON:
//!
//! ```yaml
//! namespace: checkout
//! version: "1.4"
//! trailCapacity: 20
//! errorCapacity: 50
//! ttlHours: 24
//! debug: false
//! attach: drain      # or "copy"
//! attachLimit: 10    # only used with attach: copy
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::error_log::{AttachPolicy, DEFAULT_ERROR_CAPACITY};
use crate::trail::DEFAULT_TRAIL_CAPACITY;

/// Fixed prefix that marks this library's keys in a shared store.
pub const STORAGE_PREFIX: &str = "vitamins";

pub const DEFAULT_TTL_HOURS: u64 = 24;

pub const DEFAULT_ATTACH_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachMode {
    #[default]
    Drain,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    pub namespace: String,

    pub version: String,

    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,

    #[serde(default = "default_error_capacity")]
    pub error_capacity: usize,

    /// Persisted entries older than this are dropped on load
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    /// Route every crumb and error through the debug sink
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub attach: AttachMode,

    #[serde(default = "default_attach_limit")]
    pub attach_limit: usize,
}

fn default_trail_capacity() -> usize {
    DEFAULT_TRAIL_CAPACITY
}

fn default_error_capacity() -> usize {
    DEFAULT_ERROR_CAPACITY
}

fn default_ttl_hours() -> u64 {
    DEFAULT_TTL_HOURS
}

fn default_attach_limit() -> usize {
    DEFAULT_ATTACH_LIMIT
}

impl TrackerConfig {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            version: version.into(),
            trail_capacity: DEFAULT_TRAIL_CAPACITY,
            error_capacity: DEFAULT_ERROR_CAPACITY,
            ttl_hours: DEFAULT_TTL_HOURS,
            debug: false,
            attach: AttachMode::Drain,
            attach_limit: DEFAULT_ATTACH_LIMIT,
        }
    }

    pub fn with_trail_capacity(mut self, capacity: usize) -> Self {
        self.trail_capacity = capacity;
        self
    }

    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    pub fn with_ttl_hours(mut self, hours: u64) -> Self {
        self.ttl_hours = hours;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_attach(mut self, attach: AttachMode) -> Self {
        self.attach = attach;
        self
    }

    pub fn attach_policy(&self) -> AttachPolicy {
        match self.attach {
            AttachMode::Drain => AttachPolicy::Drain,
            AttachMode::Copy => AttachPolicy::Copy {
                limit: self.attach_limit,
            },
        }
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.namespace.trim().is_empty() {
            return Err(TrackerError::Config("namespace must not be empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(TrackerError::Config("version must not be empty".into()));
        }
        Ok(())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| TrackerError::Config(format!("Invalid YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackerError::Config(format!("Invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
namespace: test
version: "1.0"
"#;
        let config = TrackerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config, TrackerConfig::new("test", "1.0"));
        assert_eq!(config.trail_capacity, 20);
        assert_eq!(config.error_capacity, 50);
        assert_eq!(config.ttl_hours, 24);
        assert!(!config.debug);
        assert_eq!(config.attach_policy(), AttachPolicy::Drain);
    }

    #[test]
    fn test_parse_full_json() {
        let json = r#"{
            "namespace": "checkout",
            "version": "2.1",
            "trailCapacity": 5,
            "errorCapacity": 1,
            "ttlHours": 48,
            "debug": true,
            "attach": "copy",
            "attachLimit": 3
        }"#;
        let config = TrackerConfig::from_json(json).unwrap();
        assert_eq!(config.trail_capacity, 5);
        assert_eq!(config.error_capacity, 1);
        assert_eq!(config.ttl_hours, 48);
        assert!(config.debug);
        assert_eq!(config.attach_policy(), AttachPolicy::Copy { limit: 3 });
    }

    #[test]
    fn test_missing_namespace_rejected() {
        assert!(TrackerConfig::from_yaml("version: '1.0'").is_err());
        let err = TrackerConfig::from_yaml("namespace: ''\nversion: '1.0'").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        std::fs::write(&path, r#"{"namespace":"a","version":"1"}"#).unwrap();
        let config = TrackerConfig::from_file(&path).unwrap();
        assert_eq!(config.namespace, "a");

        let path = dir.path().join("tracker.yaml");
        std::fs::write(&path, "namespace: b\nversion: '2'\n").unwrap();
        assert_eq!(TrackerConfig::from_file(&path).unwrap().namespace, "b");
    }
}
