//! Multi-Value Index Store
//!
//! A persistent map from a key to a *set* of `i32` values. Each `(key, value)`
//! pair is its own row, so adding or removing one value touches one row and
//! never rewrites the rest of the set.

use super::db::{Database, StorageOptions, StoreKind};
use super::key::StoreKey;
use crate::Result;
use rusqlite::params;
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS index_values (
    key BLOB NOT NULL,
    value INTEGER NOT NULL,
    PRIMARY KEY (key, value)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_index_values_value
    ON index_values(value);
"#;

/// Persistent `K -> {i32}` store
pub struct MultiValueStore<K> {
    db: Database,
    _key: PhantomData<fn() -> K>,
}

impl<K: StoreKey> MultiValueStore<K> {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path, options: &StorageOptions) -> Result<Self> {
        let db = Database::open(path, options, StoreKind::MultiValue, SCHEMA)?;
        Ok(Self {
            db,
            _key: PhantomData,
        })
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub(crate) fn in_memory() -> Result<Self> {
        let db = Database::in_memory(StoreKind::MultiValue, SCHEMA)?;
        Ok(Self {
            db,
            _key: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Add one value to the set under `key` (no-op if already present)
    pub fn add_value(&self, key: &K, value: i32) -> Result<()> {
        let encoded = key.encode();
        self.db.with_conn("Failed to add index value", |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO index_values (key, value) VALUES (?1, ?2)",
                params![encoded, value],
            )
        })?;
        Ok(())
    }

    /// Remove one value from the set under `key` (no-op if absent)
    pub fn remove_value(&self, key: &K, value: i32) -> Result<()> {
        let encoded = key.encode();
        self.db.with_conn("Failed to remove index value", |conn| {
            conn.execute(
                "DELETE FROM index_values WHERE key = ?1 AND value = ?2",
                params![encoded, value],
            )
        })?;
        Ok(())
    }

    /// All values under `key`, ascending; empty when the key is absent
    pub fn get_values(&self, key: &K) -> Result<Vec<i32>> {
        let encoded = key.encode();
        self.db.with_conn("Failed to read index values", |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT value FROM index_values WHERE key = ?1 ORDER BY value",
            )?;
            let rows = stmt.query_map(params![encoded], |row| row.get::<_, i32>(0))?;
            rows.collect()
        })
    }

    /// Remove the whole set under `key`
    pub fn remove(&self, key: &K) -> Result<usize> {
        let encoded = key.encode();
        self.db.with_conn("Failed to remove index key", |conn| {
            conn.execute("DELETE FROM index_values WHERE key = ?1", params![encoded])
        })
    }

    /// Remove `value` from every set it belongs to, returning the rows removed
    pub fn remove_value_everywhere(&self, value: i32) -> Result<usize> {
        self.db.with_conn("Failed to purge index value", |conn| {
            conn.execute("DELETE FROM index_values WHERE value = ?1", params![value])
        })
    }

    /// Close the backing file
    pub fn dispose(self) -> Result<()> {
        debug!("Disposing index store {}", self.db.path().display());
        self.db.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_values() {
        let store: MultiValueStore<i32> = MultiValueStore::in_memory().expect("store");

        store.add_value(&1, 30).expect("add");
        store.add_value(&1, 10).expect("add");
        store.add_value(&1, 10).expect("add duplicate");
        assert_eq!(store.get_values(&1).expect("values"), vec![10, 30]);

        store.remove_value(&1, 10).expect("remove");
        assert_eq!(store.get_values(&1).expect("values"), vec![30]);

        store.remove_value(&1, 30).expect("remove last");
        assert!(store.get_values(&1).expect("values").is_empty());
    }

    #[test]
    fn test_remove_key() {
        let store: MultiValueStore<i32> = MultiValueStore::in_memory().expect("store");
        store.add_value(&1, 2).expect("add");
        store.add_value(&1, 3).expect("add");
        store.add_value(&4, 2).expect("add");

        assert_eq!(store.remove(&1).expect("remove"), 2);
        assert!(store.get_values(&1).expect("values").is_empty());
        assert_eq!(store.get_values(&4).expect("values"), vec![2]);
    }

    #[test]
    fn test_remove_value_everywhere() {
        let store: MultiValueStore<i32> = MultiValueStore::in_memory().expect("store");
        store.add_value(&1, 9).expect("add");
        store.add_value(&2, 9).expect("add");
        store.add_value(&2, 5).expect("add");

        assert_eq!(store.remove_value_everywhere(9).expect("purge"), 2);
        assert!(store.get_values(&1).expect("values").is_empty());
        assert_eq!(store.get_values(&2).expect("values"), vec![5]);
    }

    #[test]
    fn test_absent_key_is_empty() {
        let store: MultiValueStore<i32> = MultiValueStore::in_memory().expect("store");
        assert!(store.get_values(&42).expect("values").is_empty());
        store.remove_value(&42, 1).expect("remove on absent key");
        assert_eq!(store.remove(&42).expect("remove"), 0);
    }
}
