//! In-memory caching primitives
//!
//! - [`LruCache`] - bounded LRU placed in front of the key-value stores so that
//!   hot class records are not decoded from SQLite on every accessor call.

mod lru;

pub use lru::{LruCache, LruCacheStats};
