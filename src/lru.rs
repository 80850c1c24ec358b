//! Run-scoped LRU set for deduplication.
//!
//! One instance is owned by a single extraction run and injected where
//! dedup is needed (image URLs, repeated text fragments). Never held in a
//! static: keeping the cache per-run keeps the pipeline referentially
//! transparent and testable against fixtures.

use std::collections::{HashSet, VecDeque};

/// Bounded insertion-ordered set with least-recently-inserted eviction.
#[derive(Debug)]
pub struct LruSet {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl LruSet {
    /// Create a set with the given capacity. Capacity 0 disables dedup.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(1024)),
            seen: HashSet::with_capacity(capacity.min(1024)),
        }
    }

    /// Insert a key, evicting the oldest entry when full.
    ///
    /// Returns `true` if the key was new, `false` if already present.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.capacity == 0 {
            return true;
        }
        if self.seen.contains(key) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        self.order.push_back(key.to_string());
        self.seen.insert(key.to_string());
        true
    }

    /// Check membership without inserting.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for LruSet {
    fn default() -> Self {
        Self::new(512)
    }
}
