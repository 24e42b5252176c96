//! Error-like values accepted by the tracker.
//!
//! The tracker does not care about error hierarchies. Anything that can
//! report a name, a message, an optional stack and an optional HTTP status
//! is recordable; the status is the only part that feeds tag derivation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability view over an error-like value.
pub trait Reportable {
    fn name(&self) -> &str;

    fn message(&self) -> &str;

    /// Raw, newline-separated stack trace.
    fn stack(&self) -> Option<&str> {
        None
    }

    /// HTTP status for the HTTP error family.
    fn status(&self) -> Option<u16> {
        None
    }

    /// Overrides `name` in the recorded node when present.
    fn kind(&self) -> Option<&str> {
        None
    }
}

/// A plain error value, as delivered by host notifications or built by
/// callers.
///
/// Deserialization never fails on shape: missing fields become empty
/// strings, non-string fields are rendered as text, a non-numeric `status`
/// is dropped and a bare value (a thrown string, say) becomes the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct RawError {
    pub name: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl From<Value> for RawError {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::new(lenient_text(&value).unwrap_or_default());
        };
        let text = |key: &str| map.get(key).and_then(lenient_text);

        Self {
            name: text("name").unwrap_or_default(),
            message: text("message").unwrap_or_default(),
            stack: text("stack"),
            status: map
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok()),
            kind: text("type"),
        }
    }
}

/// Text form of a loosely-typed JSON field; `null` counts as absent.
pub(crate) fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl RawError {
    /// A generic error named `Error`.
    pub fn new(message: impl Into<String>) -> Self {
        Self::named("Error", message)
    }

    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn http(message: impl Into<String>, status: u16) -> Self {
        Self::named("HttpError", message).with_status(status)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::named("ServerError", message).with_status(503)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::named("NetworkError", message).with_status(408)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::named("PermissionError", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::named("ValidationError", message)
    }

    /// Capture a Rust error. The `source()` chain becomes the stack, one
    /// cause per line.
    pub fn from_std<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let full = std::any::type_name::<E>();
        let name = full.rsplit("::").next().unwrap_or(full);

        let mut lines = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            lines.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        Self {
            name: name.to_string(),
            message: err.to_string(),
            stack: (!lines.is_empty()).then(|| lines.join("\n")),
            ..Self::default()
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl Reportable for RawError {
    fn name(&self) -> &str {
        &self.name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: std::io::Error,
    }

    #[test]
    fn test_http_family_statuses() {
        let http = RawError::http("Test", 404);
        assert_eq!(http.status(), Some(404));
        assert_eq!(http.name(), "HttpError");

        assert_eq!(RawError::server("down").status(), Some(503));
        assert_eq!(RawError::network("timeout").status(), Some(408));
        assert_eq!(RawError::permission("nope").status(), None);
        assert_eq!(RawError::validation("bad").name(), "ValidationError");
    }

    #[test]
    fn test_from_std_uses_source_chain_as_stack() {
        let err = Outer {
            inner: std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
        };
        let raw = RawError::from_std(&err);
        assert_eq!(raw.name, "Outer");
        assert_eq!(raw.message, "outer failure");
        assert_eq!(raw.stack.as_deref(), Some("caused by: disk gone"));
    }

    #[test]
    fn test_thrown_string_becomes_message() {
        let raw: RawError = serde_json::from_str(r#""oops""#).unwrap();
        assert_eq!(raw.name, "Error");
        assert_eq!(raw.message, "oops");
    }

    #[test]
    fn test_malformed_fields_are_substituted() {
        let raw: RawError =
            serde_json::from_str(r#"{"name":"E","message":42,"status":"404","stack":null}"#)
                .unwrap();
        assert_eq!(raw.name, "E");
        assert_eq!(raw.message, "42");
        assert_eq!(raw.status, None);
        assert!(raw.stack.is_none());

        let raw: RawError = serde_json::from_str(r#"{"status":70000,"type":"x"}"#).unwrap();
        assert_eq!(raw.status, None);
        assert_eq!(raw.kind.as_deref(), Some("x"));
    }

    #[test]
    fn test_serialized_fields_parse_back() {
        let raw = RawError::http("gone", 410).with_stack("at a").with_kind("http");
        let json = serde_json::to_string(&raw).unwrap();
        assert!(json.contains(r#""type":"http""#));
        assert_eq!(serde_json::from_str::<RawError>(&json).unwrap(), raw);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let raw: RawError = serde_json::from_str("{}").unwrap();
        assert_eq!(raw.name, "");
        assert_eq!(raw.message, "");
        assert!(raw.stack.is_none());
    }
}
