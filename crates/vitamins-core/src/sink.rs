//! Debug sink used when `debug` is enabled in the tracker config.

use chrono::Local;

use crate::models::{ErrorNode, Metadata};

pub trait DebugSink: Send {
    fn crumb(&mut self, message: &str, category: &str, metadata: Option<&Metadata>);

    fn error(&mut self, node: &ErrorNode);
}

/// Emits one `tracing` event per call under the `vitamins::debug` target,
/// formatted `[<local time>] <TAG>: ...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn crumb(&mut self, message: &str, category: &str, metadata: Option<&Metadata>) {
        let meta = metadata
            .map(|m| serde_json::to_string(m).unwrap_or_default())
            .unwrap_or_default();
        tracing::info!(
            target: "vitamins::debug",
            "[{}] {}: {} {}",
            Local::now().format("%H:%M:%S"),
            category.to_uppercase(),
            message,
            meta
        );
    }

    fn error(&mut self, node: &ErrorNode) {
        let body = serde_json::to_string(node).unwrap_or_else(|_| node.error.message.clone());
        tracing::info!(
            target: "vitamins::debug",
            "[{}] ERROR: {}",
            Local::now().format("%H:%M:%S"),
            body
        );
    }
}
