//! Storage module for depcache
//!
//! - `db`: SQLite 파일 하나 = store 하나 (pragmas, 스키마 버전)
//! - `kv`: Key-Value Store (키 → 값)
//! - `multi`: Multi-Value Index Store (키 → 정수 집합)
//! - `key`: store 키 인코딩
//! - `json`: JSON - 범용 파일 저장/로드

mod db;
mod json;
mod key;
mod kv;
mod multi;

// SQLite Storage
pub use db::{JournalMode, StorageOptions, SyncMode};
pub use kv::KeyValueStore;
pub use multi::MultiValueStore;

// Key encoding
pub use key::{KeyReader, KeyWriter, StoreKey};

// JSON Storage (범용)
pub use json::{JsonStore, PROJECT_DIR};
