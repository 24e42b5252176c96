//! EventBuffer — the breadcrumb trail.

use crate::buffer::Bounded;
use crate::models::{Metadata, TrailEntry};

/// Default number of breadcrumbs kept before the oldest is evicted.
pub const DEFAULT_TRAIL_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct EventBuffer {
    entries: Bounded<TrailEntry>,
}

impl EventBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Bounded::new(capacity),
        }
    }

    /// Hydrate from persisted entries, newest-first.
    pub fn from_entries(entries: Vec<TrailEntry>, capacity: usize) -> Self {
        Self {
            entries: Bounded::from_newest_first(entries, capacity),
        }
    }

    /// Record a new crumb at the head, stamped with the current time.
    pub fn push(&mut self, message: &str, category: &str, metadata: Option<Metadata>) {
        let mut entry = TrailEntry::new(message, category);
        entry.metadata = metadata;
        self.push_entry(entry);
    }

    pub fn push_entry(&mut self, entry: TrailEntry) {
        if let Some(evicted) = self.entries.push_front(entry) {
            tracing::trace!("[EventBuffer] Evicted crumb '{}'", evicted.message);
        }
    }

    pub fn peek(&self, n: Option<usize>) -> Vec<TrailEntry> {
        self.entries.peek(n)
    }

    /// Take every crumb, newest-first, leaving the trail empty.
    pub fn drain(&mut self) -> Vec<TrailEntry> {
        self.entries.drain()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_CAPACITY)
    }
}
