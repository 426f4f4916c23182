//! Key-Value Store
//!
//! A persistent map from a fixed-size key to one serde-encoded value. Reads go
//! through a bounded [`LruCache`]; writes go straight to SQLite and refresh the
//! cached copy, so the cache never holds a value the file does not.

use super::db::{Database, StorageOptions, StoreKind};
use super::key::StoreKey;
use crate::cache::{LruCache, LruCacheStats};
use crate::{Error, Result};
use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    key BLOB PRIMARY KEY,
    value BLOB NOT NULL
) WITHOUT ROWID;
"#;

/// Persistent `K -> V` store
pub struct KeyValueStore<K, V> {
    db: Database,
    cache: Mutex<LruCache<Vec<u8>, V>>,
    _key: PhantomData<fn() -> K>,
}

impl<K, V> KeyValueStore<K, V>
where
    K: StoreKey,
    V: Serialize + DeserializeOwned + Clone,
{
    /// Open (or create) the store at `path`
    ///
    /// `cache_size` bounds the number of decoded values kept in memory.
    pub fn open(path: &Path, cache_size: usize, options: &StorageOptions) -> Result<Self> {
        let db = Database::open(path, options, StoreKind::KeyValue, SCHEMA)?;
        Ok(Self::with_database(db, cache_size))
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub(crate) fn in_memory(cache_size: usize) -> Result<Self> {
        let db = Database::in_memory(StoreKind::KeyValue, SCHEMA)?;
        Ok(Self::with_database(db, cache_size))
    }

    fn with_database(db: Database, cache_size: usize) -> Self {
        Self {
            db,
            cache: Mutex::new(LruCache::new(cache_size)),
            _key: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let encoded = key.encode();
        if let Some(value) = self.cache.lock().get(&encoded) {
            return Ok(Some(value.clone()));
        }

        let raw: Option<Vec<u8>> = self.db.with_conn("Failed to read entry", |conn| {
            conn.query_row(
                "SELECT value FROM entries WHERE key = ?1",
                params![encoded],
                |row| row.get(0),
            )
            .optional()
        })?;

        match raw {
            Some(bytes) => {
                let value: V = decode_value(&bytes, self.db.path())?;
                self.cache.lock().insert(encoded, value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Insert or replace the value stored under `key`
    pub fn put(&self, key: &K, value: &V) -> Result<()> {
        let encoded = key.encode();
        let bytes = serde_json::to_vec(value)
            .map_err(|e| Error::Encoding(format!("Failed to encode value: {}", e)))?;

        self.db.with_conn("Failed to write entry", |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO entries (key, value) VALUES (?1, ?2)",
                params![encoded, bytes],
            )
        })?;

        self.cache.lock().insert(encoded, value.clone());
        Ok(())
    }

    /// Remove the entry under `key`, returning whether one existed
    pub fn remove(&self, key: &K) -> Result<bool> {
        let encoded = key.encode();
        self.cache.lock().remove(&encoded);

        let removed = self.db.with_conn("Failed to remove entry", |conn| {
            conn.execute("DELETE FROM entries WHERE key = ?1", params![encoded])
        })?;
        Ok(removed > 0)
    }

    /// Check whether `key` has a live mapping
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        let encoded = key.encode();
        if self.cache.lock().contains(&encoded) {
            return Ok(true);
        }

        self.db.with_conn("Failed to look up entry", |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM entries WHERE key = ?1)",
                params![encoded],
                |row| row.get(0),
            )
        })
    }

    /// All keys with a live mapping, in encoded-key order
    pub fn keys(&self) -> Result<Vec<K>> {
        let raw: Vec<Vec<u8>> = self.db.with_conn("Failed to list keys", |conn| {
            let mut stmt = conn.prepare("SELECT key FROM entries ORDER BY key")?;
            let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;
            rows.collect()
        })?;

        raw.iter().map(|bytes| K::decode(bytes)).collect()
    }

    /// Number of entries
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self.db.with_conn("Failed to count entries", |conn| {
            conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
        })?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Statistics of the in-memory front cache
    pub fn cache_stats(&self) -> LruCacheStats {
        self.cache.lock().stats()
    }

    /// Drop cached values and close the backing file
    pub fn close(self) -> Result<()> {
        self.cache.lock().clear();
        debug!("Closing key-value store {}", self.db.path().display());
        self.db.close()
    }
}

fn decode_value<V: DeserializeOwned>(bytes: &[u8], path: &Path) -> Result<V> {
    serde_json::from_slice(bytes).map_err(|e| {
        Error::Encoding(format!(
            "Failed to decode value in {}: {}",
            path.display(),
            e
        ))
    })
}
