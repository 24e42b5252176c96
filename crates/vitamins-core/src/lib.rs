//! Vitamins Core — breadcrumb trail and error correlation for client-side
//! diagnostics.
//!
//! A [`Tracker`] records breadcrumbs (things the user or the app did) and
//! errors. Every recorded error carries the breadcrumbs that led up to it,
//! its tags and a snapshot of the environment. Both sequences are bounded
//! and evict their oldest entry when full. State survives restarts through
//! a [`store::KeyValueStore`], with entries older than a TTL dropped on load.
//!
//! # Architecture
//!
//! - `buffer` — fixed-capacity newest-first sequence
//! - `trail` — `EventBuffer`, the breadcrumb trail
//! - `error_log` — `ErrorLog` and the correlation routine
//! - `environment` — `EnvironmentSnapshot`
//! - `persistence` — `PersistenceBridge` (load with TTL, save at session end)
//! - `store` — memory, file and SQLite key-value backends
//! - `host` — host notifications and the tokio channel that delivers them
//! - `tracker` — `Tracker`, the public surface

pub mod buffer;
pub mod config;
pub mod environment;
pub mod error;
pub mod error_log;
pub mod host;
pub mod models;
pub mod persistence;
pub mod sink;
pub mod store;
pub mod tracker;
pub mod trail;

// Convenience re-exports
pub use config::{AttachMode, TrackerConfig};
pub use environment::{EnvironmentSnapshot, HostInfo};
pub use error::TrackerError;
pub use error_log::{AttachPolicy, ErrorLog};
pub use host::{ErrorEvent, HostChannel, HostEvent, HostHandle};
pub use models::{ErrorDetails, ErrorNode, Metadata, MetadataValue, RawError, Reportable, TrailEntry};
pub use persistence::{PersistedState, PersistenceBridge};
pub use tracker::Tracker;
pub use trail::EventBuffer;
