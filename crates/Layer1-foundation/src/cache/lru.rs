//! Lightweight LRU cache used in front of the persistent stores
//!
//! Recency is tracked with a monotonically increasing access tick; an ordered
//! index from tick to key makes eviction `O(log n)`.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug)]
struct LruEntry<V> {
    value: V,
    last_access: u64,
}

/// A bounded LRU (Least Recently Used) cache
///
/// A capacity of `0` disables caching: inserts are dropped and every lookup
/// misses.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: HashMap<K, LruEntry<V>>,
    order: BTreeMap<u64, K>,
    capacity: usize,
    access_counter: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a new LRU cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(4096)),
            order: BTreeMap::new(),
            capacity,
            access_counter: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn touch(&mut self, key: &K) -> Option<&mut LruEntry<V>> {
        self.access_counter += 1;
        let tick = self.access_counter;
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.last_access);
        self.order.insert(tick, key.clone());
        entry.last_access = tick;
        Some(entry)
    }

    /// Get a reference to a cached value
    ///
    /// Updates the access time for LRU tracking.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.touch(key).is_some() {
            self.hits += 1;
            self.entries.get(key).map(|e| &e.value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Check if a key exists without updating access time
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value into the cache
    ///
    /// If the cache is at capacity, the least recently used item is evicted.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(entry) = self.touch(&key) {
            return Some(std::mem::replace(&mut entry.value, value));
        }

        while self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.access_counter += 1;
        self.order.insert(self.access_counter, key.clone());
        self.entries.insert(
            key,
            LruEntry {
                value,
                last_access: self.access_counter,
            },
        );
        None
    }

    /// Remove a specific key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| {
            self.order.remove(&entry.last_access);
            entry.value
        })
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_lru(&mut self) {
        let oldest = self.order.keys().next().copied();
        if let Some(tick) = oldest {
            if let Some(key) = self.order.remove(&tick) {
                self.entries.remove(&key);
                self.evictions += 1;
            }
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> LruCacheStats {
        LruCacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LruCacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl LruCacheStats {
    /// Hit ratio (0.0 - 1.0, or 0 before the first lookup)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
