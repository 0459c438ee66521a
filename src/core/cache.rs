//! World transform cache.
//!
//! Memoizes local-to-world matrices for one time code so that nodes sharing
//! ancestors reuse the ancestors' world transforms instead of recomposing
//! them. A cache is meant to live for a single batch of queries; it is not
//! synchronized and has no eviction. Changing the time code clears it.

use std::collections::HashMap;

use crate::core::TimeCode;
use crate::scene::NodeId;
use crate::util::DMat4;

/// Key for cache entries.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub struct XformCacheKey {
    /// Node whose world transform is cached.
    pub node: NodeId,
    /// Time code the transform was evaluated at.
    pub time: TimeCode,
}

impl XformCacheKey {
    /// Create a new cache key.
    pub fn new(node: NodeId, time: TimeCode) -> Self {
        Self { node, time }
    }
}

/// Per-batch cache of world transforms at a fixed time code.
#[derive(Debug)]
pub struct XformCache {
    time: TimeCode,
    entries: HashMap<XformCacheKey, DMat4>,
    hits: usize,
    misses: usize,
}

impl XformCache {
    /// Create an empty cache for `time`.
    pub fn new(time: TimeCode) -> Self {
        Self {
            time,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Time code the cached transforms belong to.
    #[inline]
    pub fn time(&self) -> TimeCode {
        self.time
    }

    /// Switch to another time code, dropping every entry if it differs.
    pub fn set_time(&mut self, time: TimeCode) {
        if time != self.time {
            self.time = time;
            self.clear();
        }
    }

    /// Get a cached world transform, counting the hit or miss.
    #[inline]
    pub fn get(&mut self, node: NodeId) -> Option<DMat4> {
        let found = self.entries.get(&XformCacheKey::new(node, self.time)).copied();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Check for an entry without touching the statistics.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&XformCacheKey::new(node, self.time))
    }

    /// Store the world transform of `node` at the cache's time code.
    #[inline]
    pub fn insert(&mut self, node: NodeId, world: DMat4) {
        self.entries.insert(XformCacheKey::new(node, self.time), world);
    }

    /// Clear all entries and statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    #[inline]
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to compose.
    #[inline]
    pub fn misses(&self) -> usize {
        self.misses
    }
}

impl Default for XformCache {
    fn default() -> Self {
        Self::new(TimeCode::Default)
    }
}
