//! Config - 통합 설정 관리
//!
//! - `cache.rs` - CacheConfig (캐시 크기, SQLite 튜닝, 기본 경로)

mod cache;

pub use cache::{CacheConfig, CACHE_CONFIG_FILE, CONFIG_VERSION};
