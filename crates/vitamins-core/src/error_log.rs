//! ErrorLog — recorded errors and the correlation routine that builds them.
//!
//! Recording an error reads the current environment, attaches the
//! breadcrumb trail and inserts the node at the head of the log, evicting
//! the oldest node when the log is full.

use crate::buffer::Bounded;
use crate::environment::EnvironmentSnapshot;
use crate::models::{ErrorNode, Reportable};
use crate::trail::EventBuffer;

/// Default number of error nodes kept before the oldest is evicted.
pub const DEFAULT_ERROR_CAPACITY: usize = 50;

/// How breadcrumbs are attached to a new error node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPolicy {
    /// Move the whole trail onto the node; the next crumb starts a new trail.
    #[default]
    Drain,
    /// Copy up to `limit` newest crumbs and leave the trail untouched.
    Copy { limit: usize },
}

#[derive(Debug, Clone)]
pub struct ErrorLog {
    nodes: Bounded<ErrorNode>,
}

impl ErrorLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Bounded::new(capacity),
        }
    }

    /// Hydrate from persisted nodes, newest-first.
    pub fn from_nodes(nodes: Vec<ErrorNode>, capacity: usize) -> Self {
        Self {
            nodes: Bounded::from_newest_first(nodes, capacity),
        }
    }

    /// Correlate `error` with the trail and environment and store the node.
    ///
    /// Returns a copy of the stored node.
    pub fn record(
        &mut self,
        error: &dyn Reportable,
        tags: &[String],
        trail: &mut EventBuffer,
        environment: &EnvironmentSnapshot,
        policy: AttachPolicy,
    ) -> ErrorNode {
        let mut node = ErrorNode::from_reportable(error, tags, environment.get());

        let crumbs = match policy {
            AttachPolicy::Drain => trail.drain(),
            AttachPolicy::Copy { limit } => trail.peek(Some(limit)),
        };
        if !crumbs.is_empty() {
            node.breadcrumbs = Some(crumbs);
        }

        if let Some(evicted) = self.nodes.push_front(node.clone()) {
            tracing::debug!(
                "[ErrorLog] Evicted error '{}' recorded at {}",
                evicted.error.message,
                evicted.timestamp
            );
        }

        node
    }

    /// Nodes sharing at least one tag with `tags`, newest-first.
    pub fn search(&self, tags: &[String]) -> Vec<ErrorNode> {
        self.nodes
            .iter()
            .filter(|node| node.has_any_tag(tags))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<ErrorNode> {
        self.nodes.to_vec()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_CAPACITY)
    }
}
