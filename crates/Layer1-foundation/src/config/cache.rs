//! Cache Config - 의존성 캐시 설정
//!
//! Global (`<config_dir>/depcache/depcache.json`) and project
//! (`./.depcache/depcache.json`) files are merged; the project file wins.

use crate::storage::{JsonStore, JournalMode, StorageOptions, SyncMode};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// 설정 파일명
pub const CACHE_CONFIG_FILE: &str = "depcache.json";

/// Newest config file version this build understands
pub const CONFIG_VERSION: u32 = 1;

/// 의존성 캐시 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Decoded records kept in memory per key-value store
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// SQLite journal mode
    #[serde(default = "default_journal_mode")]
    pub journal_mode: JournalMode,

    /// SQLite synchronous level
    #[serde(default = "default_synchronous")]
    pub synchronous: SyncMode,

    /// 기본 캐시 디렉토리 (CLI용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            cache_size: default_cache_size(),
            journal_mode: default_journal_mode(),
            synchronous: default_synchronous(),
            store_dir: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small in-memory footprint, fully synchronous writes
    pub fn minimal() -> Self {
        Self {
            cache_size: 64,
            journal_mode: JournalMode::Delete,
            synchronous: SyncMode::Full,
            ..Self::default()
        }
    }

    /// Large front caches, relaxed durability (cache can always be rebuilt)
    pub fn performance() -> Self {
        Self {
            cache_size: 16 * 1024,
            journal_mode: JournalMode::Wal,
            synchronous: SyncMode::Off,
            ..Self::default()
        }
    }

    /// SQLite tuning derived from this config
    pub fn storage_options(&self) -> StorageOptions {
        StorageOptions {
            journal_mode: self.journal_mode,
            synchronous: self.synchronous,
        }
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut stores = Vec::with_capacity(2);
        if let Ok(global) = JsonStore::global() {
            stores.push(global);
        }
        if let Ok(project) = JsonStore::current_project() {
            stores.push(project);
        }
        Self::load_layered(&stores)
    }

    /// Merge the config files of `stores` key by key; later stores win
    ///
    /// A key present in a later file overrides the earlier value even when it
    /// restates the default. Keys absent from every file take their defaults.
    pub fn load_layered(stores: &[JsonStore]) -> Result<Self> {
        let mut merged = Map::new();
        for store in stores {
            match store.load_optional::<Value>(CACHE_CONFIG_FILE)? {
                Some(Value::Object(layer)) => merged.extend(layer),
                Some(_) => {
                    return Err(Error::Config(format!(
                        "{} must contain a JSON object",
                        store.file_path(CACHE_CONFIG_FILE).display()
                    )))
                }
                None => {}
            }
        }

        let config: CacheConfig = serde_json::from_value(Value::Object(merged))
            .map_err(|e| Error::Config(format!("Invalid cache config: {}", e)))?;
        config.check_version()?;
        Ok(config)
    }

    fn check_version(&self) -> Result<()> {
        if self.version > CONFIG_VERSION {
            return Err(Error::Config(format!(
                "Unsupported config version {} (newest supported is {})",
                self.version, CONFIG_VERSION
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_cache_size() -> usize {
    1024
}

fn default_journal_mode() -> JournalMode {
    JournalMode::Wal
}

fn default_synchronous() -> SyncMode {
    SyncMode::Normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::new();
        assert_eq!(config.version, 1);
        assert_eq!(config.cache_size, 1024);
        assert_eq!(config.storage_options(), StorageOptions::default());
        assert!(config.store_dir.is_none());
    }

    fn write_config(dir: &std::path::Path, json: &str) -> JsonStore {
        std::fs::write(dir.join(CACHE_CONFIG_FILE), json).expect("write");
        JsonStore::new(dir)
    }

    #[test]
    fn test_config_merge() {
        let global_dir = tempfile::tempdir().expect("tempdir");
        let project_dir = tempfile::tempdir().expect("tempdir");
        let global = write_config(
            global_dir.path(),
            r#"{ "cacheSize": 256, "synchronous": "full", "storeDir": "/tmp/depcache" }"#,
        );
        let project = write_config(project_dir.path(), r#"{ "synchronous": "off" }"#);

        let config = CacheConfig::load_layered(&[global, project]).expect("load");

        assert_eq!(config.cache_size, 256);
        assert_eq!(config.synchronous, SyncMode::Off);
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/depcache")));
    }

    #[test]
    fn test_project_can_restore_defaults() {
        let global_dir = tempfile::tempdir().expect("tempdir");
        let project_dir = tempfile::tempdir().expect("tempdir");
        let global = write_config(
            global_dir.path(),
            r#"{ "cacheSize": 64, "journalMode": "delete" }"#,
        );
        let project = write_config(
            project_dir.path(),
            r#"{ "cacheSize": 1024, "journalMode": "wal" }"#,
        );

        let config = CacheConfig::load_layered(&[global, project]).expect("load");

        assert_eq!(config.cache_size, 1024);
        assert_eq!(config.journal_mode, JournalMode::Wal);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = write_config(dir.path(), r#"{ "version": 2, "cacheSize": 8 }"#);

        let err = CacheConfig::load_layered(&[store]).expect_err("newer version");
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Unsupported config version 2"));
    }

    #[test]
    fn test_non_object_config_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = write_config(dir.path(), "[1, 2]");
        assert!(matches!(
            CacheConfig::load_layered(&[store]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{ "cacheSize": 10, "journalMode": "delete" }"#)
                .expect("parse");
        assert_eq!(config.cache_size, 10);
        assert_eq!(config.journal_mode, JournalMode::Delete);
        assert_eq!(config.synchronous, SyncMode::Normal);
    }

    #[test]
    fn test_load_single_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStore::new(dir.path());
        let stores = [store];
        assert_eq!(CacheConfig::load_layered(&stores).expect("load"), CacheConfig::default());

        stores[0]
            .save(CACHE_CONFIG_FILE, &CacheConfig::minimal())
            .expect("save");
        assert_eq!(CacheConfig::load_layered(&stores).expect("load"), CacheConfig::minimal());
    }
}
