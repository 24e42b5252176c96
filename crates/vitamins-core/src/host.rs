//! Host notification wiring.
//!
//! The host environment reports three things: an uncaught error, an
//! unhandled async rejection, and the end of the session. [`HostEvent`]
//! carries them and [`crate::tracker::Tracker::handle`] reacts to them.
//!
//! [`HostChannel`] binds that contract to a tokio channel: any number of
//! [`HostHandle`]s can report events from anywhere, and the channel feeds
//! them to the tracker one at a time, so no two tracker mutations
//! interleave. A `HostHandle` can also turn Rust panics into uncaught
//! errors and Ctrl-C into the end of the session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::raw_error::lenient_text;
use crate::models::RawError;
use crate::tracker::Tracker;

/// Payload of an uncaught-error notification. Parsed as leniently as
/// [`RawError`]: a malformed field is substituted, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct ErrorEvent {
    pub error: Option<RawError>,
    pub message: String,
    pub filename: String,
    pub lineno: u32,
    pub colno: u32,
}

impl From<Value> for ErrorEvent {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let text = |key: &str| map.get(key).and_then(lenient_text).unwrap_or_default();
        let position = |key: &str| {
            map.get(key)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };

        Self {
            error: map
                .get("error")
                .filter(|e| !e.is_null())
                .cloned()
                .map(RawError::from),
            message: text("message"),
            filename: text("filename"),
            lineno: position("lineno"),
            colno: position("colno"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    UncaughtError(ErrorEvent),
    UnhandledRejection { reason: Value },
    SessionEnd,
}

/// Sending side of the host channel.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl HostHandle {
    /// Report an event. Returns false once the tracker is gone.
    pub fn report(&self, event: HostEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn report_error(&self, error: RawError) -> bool {
        let message = error.message.clone();
        self.report(HostEvent::UncaughtError(ErrorEvent {
            error: Some(error),
            message,
            ..ErrorEvent::default()
        }))
    }

    pub fn report_rejection(&self, reason: Value) -> bool {
        self.report(HostEvent::UnhandledRejection { reason })
    }

    pub fn end_session(&self) -> bool {
        self.report(HostEvent::SessionEnd)
    }

    /// Report every panic as an uncaught error, then run the previously
    /// installed hook.
    ///
    /// The hook only holds a weak sender: it does not keep the channel
    /// open, and panics after the session ended are not reported.
    pub fn install_panic_hook(&self) {
        let weak = self.tx.downgrade();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();

            let (filename, lineno, colno) = info
                .location()
                .map(|l| (l.file().to_string(), l.line(), l.column()))
                .unwrap_or_default();

            let mut error = RawError::named("Panic", message.clone());
            if !filename.is_empty() {
                error = error.with_stack(format!("at {}:{}:{}", filename, lineno, colno));
            }

            if let Some(tx) = weak.upgrade() {
                let _ = tx.send(HostEvent::UncaughtError(ErrorEvent {
                    error: Some(error),
                    message,
                    filename,
                    lineno,
                    colno,
                }));
            }
            previous(info);
        }));
    }

    /// Report the end of the session when Ctrl-C is received. Must be
    /// called from within a tokio runtime.
    pub fn end_session_on_ctrl_c(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("[Host] Ctrl-C received, ending session");
                    let _ = tx.send(HostEvent::SessionEnd);
                }
                Err(e) => tracing::warn!("[Host] Failed to listen for Ctrl-C: {}", e),
            }
        })
    }
}

pub struct HostChannel {
    tx: mpsc::UnboundedSender<HostEvent>,
    rx: mpsc::UnboundedReceiver<HostEvent>,
}

impl HostChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> HostHandle {
        HostHandle {
            tx: self.tx.clone(),
        }
    }

    /// Feed events to `tracker` one at a time until the session ends, and
    /// hand the tracker back.
    ///
    /// If every handle is dropped before a `SessionEnd` arrives, the session
    /// is ended anyway so the state is still saved.
    pub async fn run(self, mut tracker: Tracker) -> Tracker {
        let Self { tx, mut rx } = self;
        drop(tx);

        while let Some(event) = rx.recv().await {
            let ended = matches!(event, HostEvent::SessionEnd);
            tracker.handle(event);
            if ended {
                return tracker;
            }
        }

        tracing::debug!("[Host] All handles dropped, ending session");
        tracker.handle_session_end();
        tracker
    }
}

impl Default for HostChannel {
    fn default() -> Self {
        Self::new()
    }
}
