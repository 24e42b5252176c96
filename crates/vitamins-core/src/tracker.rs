//! Tracker — the public surface.
//!
//! A tracker owns one breadcrumb trail and one error log, hydrated from a
//! key-value store when it is built and written back when the host reports
//! the end of the session. Host notifications reach it through
//! [`Tracker::handle`] (see [`crate::host`]).

use std::sync::Arc;

use serde_json::Value;

use crate::config::TrackerConfig;
use crate::environment::EnvironmentSnapshot;
use crate::error_log::ErrorLog;
use crate::host::{ErrorEvent, HostEvent};
use crate::models::{ErrorNode, Metadata, RawError, Reportable, TrailEntry};
use crate::persistence::{PersistedState, PersistenceBridge};
use crate::sink::{DebugSink, TracingSink};
use crate::store::KeyValueStore;
use crate::trail::EventBuffer;

/// Called with every newly recorded node.
pub type ErrorHook = Box<dyn FnMut(&ErrorNode) + Send>;

/// Called at session end, after the state has been saved.
pub type SessionEndHook = Box<dyn FnMut(&[TrailEntry], &[ErrorNode]) + Send>;

pub struct Tracker {
    config: TrackerConfig,
    session_id: String,
    environment: EnvironmentSnapshot,
    trail: EventBuffer,
    errors: ErrorLog,
    persistence: PersistenceBridge,
    sink: Option<Box<dyn DebugSink>>,
    error_hook: Option<ErrorHook>,
    session_end_hook: Option<SessionEndHook>,
}

impl Tracker {
    /// Build a tracker and restore whatever the store still holds for this
    /// namespace/version within the TTL window.
    pub fn new(config: TrackerConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let persistence = PersistenceBridge::new(store, &config.namespace, &config.version);
        let state = persistence.load(config.ttl_hours);
        Self::assemble(config, persistence, state)
    }

    /// Build a tracker seeded with explicit state instead of reading the
    /// store. The store is still used at session end.
    pub fn with_initial_state(
        config: TrackerConfig,
        store: Arc<dyn KeyValueStore>,
        state: PersistedState,
    ) -> Self {
        let persistence = PersistenceBridge::new(store, &config.namespace, &config.version);
        Self::assemble(config, persistence, state)
    }

    fn assemble(config: TrackerConfig, persistence: PersistenceBridge, state: PersistedState) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let environment = EnvironmentSnapshot::detect(&config.namespace, &config.version);
        let sink: Option<Box<dyn DebugSink>> = if config.debug {
            Some(Box::new(TracingSink))
        } else {
            None
        };

        tracing::debug!(
            session_id = %session_id,
            "[Tracker] Started {}/{} with {} crumbs and {} errors",
            config.namespace,
            config.version,
            state.trail.len(),
            state.errors.len()
        );

        Self {
            trail: EventBuffer::from_entries(state.trail, config.trail_capacity),
            errors: ErrorLog::from_nodes(state.errors, config.error_capacity),
            config,
            session_id,
            environment,
            persistence,
            sink,
            error_hook: None,
            session_end_hook: None,
        }
    }

    pub fn with_environment(mut self, environment: EnvironmentSnapshot) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the debug sink. Only used when `debug` is enabled.
    pub fn with_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        if self.config.debug {
            self.sink = Some(sink);
        }
        self
    }

    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    pub fn with_session_end_hook(mut self, hook: SessionEndHook) -> Self {
        self.session_end_hook = Some(hook);
        self
    }

    /// Add a breadcrumb.
    pub fn crumb(&mut self, message: &str, category: &str, metadata: Option<Metadata>) {
        if let Some(sink) = self.sink.as_mut() {
            sink.crumb(message, category, metadata.as_ref());
        }
        tracing::debug!(session_id = %self.session_id, "[Tracker] Crumb {}: {}", category, message);
        self.trail.push(message, category, metadata);
    }

    /// Record an error, attaching the current trail. Returns the new node.
    pub fn send(&mut self, error: &dyn Reportable, tags: &[&str]) -> ErrorNode {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let node = self.errors.record(
            error,
            &tags,
            &mut self.trail,
            &self.environment,
            self.config.attach_policy(),
        );

        tracing::debug!(
            session_id = %self.session_id,
            "[Tracker] Recorded {}: {} (tags: {:?})",
            node.error.name,
            node.error.message,
            node.tags
        );
        if let Some(sink) = self.sink.as_mut() {
            sink.error(&node);
        }
        if let Some(hook) = self.error_hook.as_mut() {
            hook(&node);
        }

        node
    }

    /// Recorded errors sharing any tag with `tags`, newest-first.
    pub fn search(&self, tags: &[&str]) -> Vec<ErrorNode> {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        self.errors.search(&tags)
    }

    /// Empty both the trail and the error log.
    pub fn clear(&mut self) {
        self.trail.clear();
        self.errors.clear();
    }

    /// Empty both sequences and delete their persisted keys, instead of
    /// saving empty arrays at session end.
    pub fn purge(&mut self) {
        self.clear();
        self.persistence.purge();
    }

    /// Copy of the trail, newest-first.
    pub fn trail(&self) -> Vec<TrailEntry> {
        self.trail.peek(None)
    }

    /// Copy of the error log, newest-first. Mutating it does not touch the
    /// tracker.
    pub fn logs(&self) -> Vec<ErrorNode> {
        self.errors.snapshot()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Dispatch one host notification.
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::UncaughtError(event) => self.handle_uncaught_error(event),
            HostEvent::UnhandledRejection { reason } => self.handle_unhandled_rejection(&reason),
            HostEvent::SessionEnd => self.handle_session_end(),
        }
    }

    pub fn handle_uncaught_error(&mut self, event: ErrorEvent) {
        let error = event
            .error
            .unwrap_or_else(|| RawError::new(event.message.clone()));
        self.send(&error, &["window"]);
    }

    pub fn handle_unhandled_rejection(&mut self, reason: &Value) {
        let message = serde_json::to_string(reason).unwrap_or_default();
        self.send(&RawError::new(message), &["promise"]);
    }

    /// Persist the current state, then run the session-end hook.
    pub fn handle_session_end(&mut self) {
        let trail = self.trail();
        let logs = self.logs();
        self.persistence.save(&trail, &logs);
        if let Some(hook) = self.session_end_hook.as_mut() {
            hook(&trail, &logs);
        }
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("session_id", &self.session_id)
            .field("trail", &self.trail.len())
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    fn tracker() -> Tracker {
        Tracker::new(TrackerConfig::new("test", "1.0"), Arc::new(MemoryStore::new()))
    }

    #[derive(Default, Clone)]
    struct CountingSink {
        calls: Arc<Mutex<usize>>,
    }

    impl DebugSink for CountingSink {
        fn crumb(&mut self, _message: &str, _category: &str, _metadata: Option<&Metadata>) {
            *self.calls.lock().unwrap() += 1;
        }

        fn error(&mut self, _node: &ErrorNode) {
            *self.calls.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_init_empty() {
        let t = tracker();
        assert!(t.trail().is_empty());
        assert!(t.logs().is_empty());
        assert!(!t.session_id().is_empty());
    }

    #[test]
    fn test_crumbs() {
        let mut t = tracker();
        t.crumb("test crumb", "UI", None);
        assert_eq!(t.trail().len(), 1);
        t.crumb("test crumb", "Network", None);
        assert_eq!(t.trail().len(), 2);
    }

    #[test]
    fn test_error_with_tags_and_crumbs() {
        let mut t = tracker();
        t.crumb("test crumb", "UI", None);
        let error = RawError::new("test");
        t.send(&error, &["UI"]);

        assert!(t.trail().is_empty());
        assert_eq!(t.logs().len(), 1);
        assert!(t.search(&["Network"]).is_empty());
        assert_eq!(t.search(&["UI"]).len(), 1);
        assert_eq!(t.logs()[0].breadcrumbs.as_ref().unwrap().len(), 1);

        t.send(&error, &["Network"]);
        assert_eq!(t.search(&["UI"]).len(), 1);
        assert_eq!(t.search(&["UI", "Network"]).len(), 2);
    }

    #[test]
    fn test_logs_is_a_copy() {
        let mut t = tracker();
        t.send(&RawError::new("test"), &["UI"]);

        let mut logs = t.logs();
        logs[0].tags.push("tampered".into());
        logs.clear();

        assert_eq!(t.logs().len(), 1);
        assert_eq!(t.logs()[0].tags, vec!["UI".to_string()]);
    }

    #[test]
    fn test_clear() {
        let mut t = tracker();
        t.crumb("a", "UI", None);
        t.send(&RawError::new("test"), &["UI"]);
        t.crumb("b", "UI", None);
        t.clear();
        assert!(t.logs().is_empty());
        assert!(t.trail().is_empty());
    }

    #[test]
    fn test_purge_deletes_persisted_keys() {
        let store = MemoryStore::new();
        let mut t = Tracker::new(TrackerConfig::new("test", "1.0"), Arc::new(store.clone()));
        t.send(&RawError::new("test"), &["UI"]);
        t.handle_session_end();
        assert_eq!(store.keys().len(), 2);

        t.purge();
        assert!(t.logs().is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_debug_sink_called_for_crumbs_and_errors() {
        let sink = CountingSink::default();
        let calls = sink.calls.clone();
        let mut t = Tracker::new(
            TrackerConfig::new("test", "1.0").with_debug(true),
            Arc::new(MemoryStore::new()),
        )
        .with_sink(Box::new(sink));

        assert_eq!(*calls.lock().unwrap(), 0);
        t.crumb("test", "test", None);
        assert_eq!(*calls.lock().unwrap(), 1);
        t.send(&RawError::new("test"), &[]);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_sink_ignored_without_debug() {
        let sink = CountingSink::default();
        let calls = sink.calls.clone();
        let mut t = tracker().with_sink(Box::new(sink));
        t.crumb("test", "test", None);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_error_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut t = tracker().with_error_hook(Box::new(move |node: &ErrorNode| {
            sink.lock().unwrap().push(node.error.message.clone());
        }));

        t.send(&RawError::new("first"), &["test"]);
        t.send(&RawError::new("second"), &[]);
        assert_eq!(*seen.lock().unwrap(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_uncaught_error_tagged_window() {
        let mut t = tracker();
        t.handle(HostEvent::UncaughtError(ErrorEvent {
            error: Some(RawError::new("AAAHHHH")),
            message: "A monkey is throwing bananas at me!".into(),
            filename: "closet.html".into(),
            lineno: 402,
            colno: 1,
        }));

        let logs = t.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].error.message, "AAAHHHH");
        assert_eq!(logs[0].tags, vec!["window".to_string()]);
    }

    #[test]
    fn test_uncaught_error_without_error_value() {
        let mut t = tracker();
        t.handle(HostEvent::UncaughtError(ErrorEvent {
            message: "Script error.".into(),
            ..ErrorEvent::default()
        }));
        assert_eq!(t.logs()[0].error.message, "Script error.");
    }

    #[test]
    fn test_rejection_reason_stringified() {
        let mut t = tracker();
        t.handle(HostEvent::UnhandledRejection {
            reason: serde_json::json!({ "code": 42 }),
        });
        t.handle(HostEvent::UnhandledRejection { reason: Value::Null });

        let logs = t.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].error.message, r#"{"code":42}"#);
        assert_eq!(logs[0].error.message, "null");
        assert_eq!(logs[0].tags, vec!["promise".to_string()]);
    }

    #[test]
    fn test_session_end_saves_and_runs_hook() {
        let store = MemoryStore::new();
        let ended = Arc::new(Mutex::new(None));
        let seen = ended.clone();
        let mut t = Tracker::new(TrackerConfig::new("test", "1.0"), Arc::new(store.clone()))
            .with_session_end_hook(Box::new(move |trail: &[TrailEntry], logs: &[ErrorNode]| {
                *seen.lock().unwrap() = Some((trail.len(), logs.len()));
            }));

        t.send(&RawError::new("test"), &[]);
        t.crumb("after", "UI", None);
        t.handle(HostEvent::SessionEnd);

        assert_eq!(*ended.lock().unwrap(), Some((1, 1)));
        assert_eq!(
            store.keys(),
            vec![
                "vitamins_test_1.0_errors".to_string(),
                "vitamins_test_1.0_trail".to_string()
            ]
        );
    }
}
