use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::crumb::TrailEntry;
use super::raw_error::Reportable;

/// The error part of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub message: String,

    /// Stack lines with blank lines removed; absent when there was no stack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,
}

/// A recorded error with its tags, environment and the breadcrumbs that
/// led up to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNode {
    pub timestamp: DateTime<Utc>,

    pub error: ErrorDetails,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Never an empty list: no trail means no field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Vec<TrailEntry>>,
}

impl ErrorNode {
    /// Build a node from an error-like value. Explicit tags come first; an
    /// HTTP status, when present, is appended as a derived tag.
    pub fn from_reportable(
        error: &dyn Reportable,
        tags: &[String],
        environment: BTreeMap<String, String>,
    ) -> Self {
        let mut tags = tags.to_vec();
        if let Some(status) = error.status() {
            tags.push(status.to_string());
        }

        let name = error
            .kind()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| error.name());

        Self {
            timestamp: Utc::now(),
            error: ErrorDetails {
                name: name.to_string(),
                message: error.message().to_string(),
                stack: error.stack().and_then(normalize_stack),
            },
            tags,
            environment,
            breadcrumbs: None,
        }
    }

    /// True when the node shares at least one tag with `query`.
    pub fn has_any_tag(&self, query: &[String]) -> bool {
        self.tags.iter().any(|t| query.contains(t))
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Split a stack on line breaks (`\n`, `\r\n` or a lone `\r`) and drop
/// empty lines. A stack with no non-empty line is treated as missing.
pub fn normalize_stack(stack: &str) -> Option<Vec<String>> {
    let lines: Vec<String> = stack
        .split(|c: char| c == '\n' || c == '\r')
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    (!lines.is_empty()).then_some(lines)
}
