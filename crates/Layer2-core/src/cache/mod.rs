//! Dependency cache
//!
//! [`Cache`] composes five stores under one root directory:
//!
//! | File | Store | Contents |
//! |------|-------|----------|
//! | `classes.db` | Key-Value | qualified name → [`ClassInfo`] |
//! | `remote.db` | Key-Value | qualified name → remote marker |
//! | `bdeps.db` | Multi-Value | [`DependencyKey`] → referencers |
//! | `fdeps.db` | Multi-Value | qualified name → referenced classes |
//! | `subclasses.db` | Multi-Value | qualified name → direct subclasses |
//!
//! Access is single-writer: the build driver serializes mutations. Every
//! storage failure surfaces as [`CacheError::Corrupted`].
//!
//! [`ClassInfo`]: crate::ClassInfo
//! [`DependencyKey`]: crate::DependencyKey

mod back_deps;
mod classes;
mod index;

use crate::error::{CacheError, CacheResult};
use crate::info::ClassInfo;
use crate::key::DependencyKey;
use depcache_foundation::{
    CacheConfig, Error, KeyValueStore, LruCacheStats, MultiValueStore, StorageOptions, SymbolId,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CLASSES_FILE: &str = "classes.db";
pub const REMOTE_FILE: &str = "remote.db";
pub const REFERENCERS_FILE: &str = "bdeps.db";
pub const REFERENCED_FILE: &str = "fdeps.db";
pub const SUBCLASSES_FILE: &str = "subclasses.db";

/// Persistent dependency database of one build
pub struct Cache {
    root: PathBuf,
    classes: KeyValueStore<SymbolId, ClassInfo>,
    remote: KeyValueStore<SymbolId, bool>,
    referencers: MultiValueStore<DependencyKey>,
    referenced: MultiValueStore<SymbolId>,
    subclasses: MultiValueStore<SymbolId>,
}

/// Cache 통계
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub classes: usize,
    pub class_cache: LruCacheStats,
}

impl Cache {
    /// Open (or create) the cache under `root` with default SQLite tuning
    ///
    /// `cache_size` bounds the number of records each key-value store keeps
    /// in memory.
    pub fn open(root: impl Into<PathBuf>, cache_size: usize) -> CacheResult<Self> {
        Self::open_with_options(root.into(), cache_size, &StorageOptions::default())
    }

    /// Open with cache size and tuning from `config`
    pub fn open_with_config(root: impl Into<PathBuf>, config: &CacheConfig) -> CacheResult<Self> {
        Self::open_with_options(root.into(), config.cache_size, &config.storage_options())
    }

    fn open_with_options(
        root: PathBuf,
        cache_size: usize,
        options: &StorageOptions,
    ) -> CacheResult<Self> {
        fs::create_dir_all(&root).map_err(|e| {
            Error::storage(format!("Failed to create {}", root.display()), e)
        })?;

        let cache = Self {
            classes: KeyValueStore::open(&root.join(CLASSES_FILE), cache_size, options)?,
            remote: KeyValueStore::open(&root.join(REMOTE_FILE), cache_size, options)?,
            referencers: MultiValueStore::open(&root.join(REFERENCERS_FILE), options)?,
            referenced: MultiValueStore::open(&root.join(REFERENCED_FILE), options)?,
            subclasses: MultiValueStore::open(&root.join(SUBCLASSES_FILE), options)?,
            root,
        };

        info!("Opened dependency cache at {}", cache.root.display());
        Ok(cache)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> CacheResult<CacheStats> {
        Ok(CacheStats {
            classes: self.classes.len()?,
            class_cache: self.classes.cache_stats(),
        })
    }

    /// Close every store
    ///
    /// All five stores are closed even when some fail; the first failure is
    /// returned.
    pub fn dispose(self) -> CacheResult<()> {
        let Cache {
            root,
            classes,
            remote,
            referencers,
            referenced,
            subclasses,
        } = self;

        let failures = close_each(vec![
            close_step("classes", move || classes.close()),
            close_step("remote markers", move || remote.close()),
            close_step("referenced classes", move || referenced.dispose()),
            close_step("referencers", move || referencers.dispose()),
            close_step("subclasses", move || subclasses.dispose()),
        ]);

        let mut first_error = None;
        for (store, e) in failures {
            warn!("Failed to close {} store: {}", store, e);
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(CacheError::Corrupted(e)),
            None => {
                debug!("Disposed dependency cache at {}", root.display());
                Ok(())
            }
        }
    }

    /// Close every store and delete all files directly under the root
    ///
    /// Subdirectories are left alone. Close failures are only logged.
    pub fn wipe(self) -> CacheResult<()> {
        let Cache {
            root,
            classes,
            remote,
            referencers,
            referenced,
            subclasses,
        } = self;

        let failures = close_each(vec![
            close_step("referencers", move || referencers.dispose()),
            close_step("referenced classes", move || referenced.dispose()),
            close_step("subclasses", move || subclasses.dispose()),
            close_step("classes", move || classes.close()),
            close_step("remote markers", move || remote.close()),
        ]);
        for (store, e) in failures {
            info!("Failed to close {} store before wipe: {}", store, e);
        }

        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) => {
                info!("Nothing to wipe at {}: {}", root.display(), e);
                return Ok(());
            }
        };

        let mut removed = 0usize;
        for entry in entries {
            let path = entry.map_err(Error::from)?.path();
            if path.is_dir() {
                continue;
            }
            fs::remove_file(&path)
                .map_err(|e| Error::storage(format!("Failed to delete {}", path.display()), e))?;
            removed += 1;
        }

        info!("Wiped dependency cache at {} ({} files)", root.display(), removed);
        Ok(())
    }
}

type CloseStep = (&'static str, Box<dyn FnOnce() -> depcache_foundation::Result<()>>);

fn close_step(
    store: &'static str,
    close: impl FnOnce() -> depcache_foundation::Result<()> + 'static,
) -> CloseStep {
    (store, Box::new(close))
}

/// Run every step in order, collecting the failures
fn close_each(steps: Vec<CloseStep>) -> Vec<(&'static str, Error)> {
    steps
        .into_iter()
        .filter_map(|(store, close)| close().err().map(|e| (store, e)))
        .collect()
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("root", &self.root).finish()
    }
}
