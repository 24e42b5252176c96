//! Fixed-capacity, newest-first sequence.
//!
//! Index 0 is always the most recent item. Inserting at capacity evicts the
//! oldest item (the tail) before the new head goes in. A capacity of zero
//! keeps the sequence permanently empty.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Bounded<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Bounded<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Hydrate from items already ordered newest-first. Anything past
    /// `capacity` is the oldest data and is dropped.
    pub fn from_newest_first(items: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut bounded = Self::new(capacity);
        bounded.items.extend(items.into_iter().take(capacity));
        bounded
    }

    /// Insert at the head, evicting the tail when full. Returns the evicted
    /// item, if any.
    pub fn push_front(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return None;
        }
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_back()
        } else {
            None
        };
        self.items.push_front(item);
        evicted
    }

    /// Remove and return everything, newest-first.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> Bounded<T> {
    /// Up to `n` newest items, or all of them when `n` is `None`.
    pub fn peek(&self, n: Option<usize>) -> Vec<T> {
        let n = n.unwrap_or(self.items.len());
        self.items.iter().take(n).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
