//! EnvironmentSnapshot — contextual metadata attached to every error node.
//!
//! Agent, platform and language are read once when the snapshot is built.
//! The location is re-read through a [`LocationSource`] on every `get()`.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Supplies the current "location" of the host (a URL in a browser, the
/// working directory or active route in a native program).
pub type LocationSource = Arc<dyn Fn() -> String + Send + Sync>;

/// Host facts captured once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub agent: String,
    pub platform: String,
    pub language: String,
}

impl HostInfo {
    /// Describe the running process.
    pub fn detect() -> Self {
        let language = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .map(|v| normalize_locale(&v))
            .unwrap_or_default();

        Self {
            agent: format!("vitamins/{}", env!("CARGO_PKG_VERSION")),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            language,
        }
    }
}

/// `en_US.UTF-8` -> `en-US`
fn normalize_locale(raw: &str) -> String {
    let base = raw.split(['.', '@']).next().unwrap_or(raw);
    base.replace('_', "-")
}

fn current_dir_location() -> String {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct EnvironmentSnapshot {
    fixed: BTreeMap<String, String>,
    location: LocationSource,
}

impl EnvironmentSnapshot {
    pub fn new(host: HostInfo, namespace: &str, version: &str) -> Self {
        let mut fixed = BTreeMap::new();
        fixed.insert("agent".to_string(), host.agent);
        fixed.insert("platform".to_string(), host.platform);
        fixed.insert("language".to_string(), host.language);
        fixed.insert("version".to_string(), version.to_string());
        fixed.insert("namespace".to_string(), namespace.to_string());

        Self {
            fixed,
            location: Arc::new(current_dir_location),
        }
    }

    /// Snapshot of the running process.
    pub fn detect(namespace: &str, version: &str) -> Self {
        Self::new(HostInfo::detect(), namespace, version)
    }

    pub fn with_location(mut self, location: LocationSource) -> Self {
        self.location = location;
        self
    }

    /// Fixed metadata plus the live location.
    pub fn get(&self) -> BTreeMap<String, String> {
        let mut env = self.fixed.clone();
        env.insert("location".to_string(), (self.location)());
        env
    }
}

impl std::fmt::Debug for EnvironmentSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentSnapshot")
            .field("fixed", &self.fixed)
            .finish_non_exhaustive()
    }
}
