//! Weak memoisation cache for identity tokens.
//!
//! Tokens are interned by value: asking for an equal key returns the same
//! `Rc` while any holder keeps it alive. The cache only holds `Weak`
//! references, so a token is freed as soon as its last holder drops it.
//! Token types evict their own entry from their `Drop` impl; entries whose
//! eviction was missed are purged lazily as the cache grows.

use hashbrown::HashMap;
use std::hash::Hash;
use std::rc::{Rc, Weak};

const MIN_PURGE_THRESHOLD: usize = 64;

/// Value-keyed cache of weakly-held shared values.
pub struct WeakCache<K, V> {
    entries: HashMap<K, Weak<V>>,
    /// Entry count at which dead entries are next swept.
    purge_at: usize,
}

impl<K: Hash + Eq, V> WeakCache<K, V> {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            purge_at: MIN_PURGE_THRESHOLD,
        }
    }

    /// Gets the live value cached under `key`, or creates and caches one.
    pub fn get_or_create(&mut self, key: K, create: impl FnOnce(&K) -> V) -> Rc<V> {
        if let Some(live) = self.entries.get(&key).and_then(Weak::upgrade) {
            return live;
        }

        let value = Rc::new(create(&key));
        self.entries.insert(key, Rc::downgrade(&value));

        if self.entries.len() >= self.purge_at {
            self.purge();
            self.purge_at = (self.entries.len() * 2).max(MIN_PURGE_THRESHOLD);
        }

        value
    }

    /// Gets the live value cached under `key`, if any.
    pub fn get(&self, key: &K) -> Option<Rc<V>> {
        self.entries.get(key).and_then(Weak::upgrade)
    }

    /// Removes the entry for `key` if its value is no longer alive.
    pub fn evict(&mut self, key: &K) {
        let dead = self
            .entries
            .get(key)
            .map_or(false, |weak| weak.strong_count() == 0);
        if dead {
            self.entries.remove(key);
        }
    }

    /// Removes every entry whose value is no longer alive.
    pub fn purge(&mut self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Returns the number of entries, including not-yet-evicted dead ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq, V> Default for WeakCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
