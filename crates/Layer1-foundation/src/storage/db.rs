//! SQLite backing file for a single store
//!
//! 모든 persistent store는 자기 전용 SQLite 파일 하나를 가진다:
//! - `store_meta`: store 종류와 스키마 버전
//! - 나머지 테이블은 store 종류별로 생성 (`kv.rs`, `multi.rs`)
//!
//! Connections are opened with the pragmas from [`StorageOptions`] and
//! guarded by a mutex, so a store handle can be shared across threads.

use crate::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Current schema version
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    fn as_pragma(self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

/// SQLite synchronous level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Off,
    Normal,
    Full,
}

impl SyncMode {
    fn as_pragma(self) -> &'static str {
        match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
        }
    }
}

/// Connection tuning applied to every store file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageOptions {
    pub journal_mode: JournalMode,
    pub synchronous: SyncMode,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            synchronous: SyncMode::Normal,
        }
    }
}

impl StorageOptions {
    /// PRAGMA batch executed right after opening a connection
    pub fn pragmas(&self) -> String {
        format!(
            "PRAGMA journal_mode={}; PRAGMA synchronous={};",
            self.journal_mode.as_pragma(),
            self.synchronous.as_pragma()
        )
    }
}

/// Kind of data a store file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreKind {
    KeyValue,
    MultiValue,
}

impl StoreKind {
    fn as_str(self) -> &'static str {
        match self {
            StoreKind::KeyValue => "key_value",
            StoreKind::MultiValue => "multi_value",
        }
    }
}

/// A single SQLite-backed store file
pub(crate) struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the store file at `path`
    pub fn open(
        path: &Path,
        options: &StorageOptions,
        kind: StoreKind,
        schema: &str,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::storage(format!("Failed to create directory {}", parent.display()), e)
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("Failed to open {}", path.display()), e))?;

        conn.execute_batch(&options.pragmas())
            .map_err(|e| Error::storage("Failed to set pragmas", e))?;

        Self::initialize(conn, path.to_path_buf(), kind, schema)
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub fn in_memory(kind: StoreKind, schema: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage("Failed to create in-memory database", e))?;
        Self::initialize(conn, PathBuf::from(":memory:"), kind, schema)
    }

    fn initialize(conn: Connection, path: PathBuf, kind: StoreKind, schema: &str) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS store_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                kind TEXT NOT NULL,
                schema_version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| Error::storage("Failed to initialize schema", e))?;

        let existing: Option<(String, i32)> = conn
            .query_row(
                "SELECT kind, schema_version FROM store_meta WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| Error::storage("Failed to read store metadata", e))?;

        match existing {
            Some((stored_kind, version)) => {
                if stored_kind != kind.as_str() {
                    return Err(Error::Storage(format!(
                        "{} holds a {} store, expected {}",
                        path.display(),
                        stored_kind,
                        kind.as_str()
                    )));
                }
                if version > CURRENT_SCHEMA_VERSION {
                    return Err(Error::Storage(format!(
                        "{} has schema version {} (supported: {})",
                        path.display(),
                        version,
                        CURRENT_SCHEMA_VERSION
                    )));
                }
                debug!("Opened {} (schema version {})", path.display(), version);
            }
            None => {
                conn.execute(
                    "INSERT INTO store_meta (id, kind, schema_version) VALUES (1, ?1, ?2)",
                    params![kind.as_str(), CURRENT_SCHEMA_VERSION],
                )
                .map_err(|e| Error::storage("Failed to write store metadata", e))?;
                info!("Created {} store at {}", kind.as_str(), path.display());
            }
        }

        conn.execute_batch(schema)
            .map_err(|e| Error::storage("Failed to initialize schema", e))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection, wrapping SQLite failures with `context`
    pub fn with_conn<T>(
        &self,
        context: &str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| Error::lock_poisoned())?;
        f(&*conn).map_err(|e| Error::storage(context, e))
    }

    /// Checkpoint and close the connection
    pub fn close(self) -> Result<()> {
        let path = self.path;
        let conn = self.conn.into_inner().map_err(|_| Error::lock_poisoned())?;
        conn.close()
            .map_err(|(_, e)| Error::storage(format!("Failed to close {}", path.display()), e))?;
        debug!("Closed {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS t (k INTEGER PRIMARY KEY);";

    #[test]
    fn test_pragmas() {
        let options = StorageOptions {
            journal_mode: JournalMode::Delete,
            synchronous: SyncMode::Full,
        };
        assert_eq!(
            options.pragmas(),
            "PRAGMA journal_mode=DELETE; PRAGMA synchronous=FULL;"
        );
    }

    #[test]
    fn test_reopen_same_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.db");
        let options = StorageOptions::default();

        let db = Database::open(&path, &options, StoreKind::KeyValue, TEST_SCHEMA).expect("open");
        db.close().expect("close");

        let db = Database::open(&path, &options, StoreKind::KeyValue, TEST_SCHEMA).expect("reopen");
        assert_eq!(db.path(), path.as_path());
        db.close().expect("close");
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.db");
        let options = StorageOptions::default();

        let db = Database::open(&path, &options, StoreKind::KeyValue, TEST_SCHEMA).expect("open");
        db.close().expect("close");

        let result = Database::open(&path, &options, StoreKind::MultiValue, TEST_SCHEMA);
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_in_memory() {
        let db = Database::in_memory(StoreKind::MultiValue, TEST_SCHEMA).expect("in-memory");
        let count: i64 = db
            .with_conn("count", |conn| {
                conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            })
            .expect("query");
        assert_eq!(count, 0);
    }
}
