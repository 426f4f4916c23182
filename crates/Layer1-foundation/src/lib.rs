//! # depcache-foundation
//!
//! Foundation layer for depcache:
//! - Error: 중앙 에러 타입
//! - Config: CacheConfig (JSON, global + project)
//! - Storage: Key-Value Store, Multi-Value Index Store (SQLite), JsonStore
//! - Symbols: 심볼 테이블 (문자열 → 정수 id)
//! - Cache: LRU (store 앞단 메모리 캐시)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  depcache-core::Cache                                    │
//! │     │                                                    │
//! │     ├── KeyValueStore<i32, ClassInfo>   (classes.db)     │
//! │     ├── KeyValueStore<i32, bool>        (remote.db)      │
//! │     └── MultiValueStore<K> × 3  (bdeps / fdeps / sub)    │
//! │                     │                                    │
//! │                     ▼                                    │
//! │          SQLite file per store  +  LruCache front        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;
pub mod symbols;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{CacheConfig, CACHE_CONFIG_FILE, CONFIG_VERSION};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{
    // JSON (범용)
    JsonStore,
    // SQLite tuning
    JournalMode,
    // Key encoding
    KeyReader,
    // Stores
    KeyValueStore,
    KeyWriter,
    MultiValueStore,
    StorageOptions,
    StoreKey,
    SyncMode,
    PROJECT_DIR,
};

// ============================================================================
// Symbols (심볼 테이블)
// ============================================================================
pub use symbols::{SymbolId, SymbolTable, SYMBOLS_FILE, UNKNOWN};

// ============================================================================
// Cache (메모리 캐시)
// ============================================================================
pub use cache::{LruCache, LruCacheStats};
