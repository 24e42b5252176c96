use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scalar metadata attached to a breadcrumb.
///
/// Non-finite floats cannot be represented in JSON, so they are stored as
/// text instead of being silently turned into `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

pub type Metadata = BTreeMap<String, MetadataValue>;

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Integer(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Integer(v as i64)
    }
}

impl From<u32> for MetadataValue {
    fn from(v: u32) -> Self {
        MetadataValue::Integer(v as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            MetadataValue::Float(v)
        } else {
            MetadataValue::Text(v.to_string())
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(v) => write!(f, "{}", v),
            MetadataValue::Integer(v) => write!(f, "{}", v),
            MetadataValue::Float(v) => write!(f, "{}", v),
            MetadataValue::Text(v) => f.write_str(v),
        }
    }
}

/// A single breadcrumb: something the user or the app did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailEntry {
    /// ISO 8601 timestamp when the crumb was recorded
    pub timestamp: DateTime<Utc>,

    pub message: String,

    /// Free-form category, e.g. "UI" or "Network"
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TrailEntry {
    pub fn new(message: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            category: category.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let mut meta = Metadata::new();
        meta.insert("button".into(), "save".into());
        meta.insert("count".into(), 3.into());
        let entry = TrailEntry::new("clicked", "UI").with_metadata(meta);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["message"], "clicked");
        assert_eq!(json["category"], "UI");
        assert_eq!(json["metadata"]["button"], "save");
        assert_eq!(json["metadata"]["count"], 3);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_metadata_omitted_when_absent() {
        let json = serde_json::to_value(TrailEntry::new("a", "UI")).unwrap();
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_non_finite_float_kept_as_text() {
        assert_eq!(
            MetadataValue::from(f64::NAN),
            MetadataValue::Text("NaN".to_string())
        );
        assert_eq!(MetadataValue::from(1.5), MetadataValue::Float(1.5));
    }

    #[test]
    fn test_parse_millisecond_timestamp() {
        let json = r#"{"timestamp":"1970-01-01T00:00:00.000Z","message":"test","category":"test"}"#;
        let entry: TrailEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp.timestamp(), 0);
        assert!(entry.metadata.is_none());
    }
}
