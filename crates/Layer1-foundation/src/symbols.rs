//! Symbol table
//!
//! Interns qualified class names, member names and descriptors into dense
//! `i32` handles. Every key in the dependency cache is built from these
//! handles; the table is only consulted again to render them for humans.

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Interned symbol handle
pub type SymbolId = i32;

/// Sentinel for "no symbol" (no super class, no generic signature, ...)
pub const UNKNOWN: SymbolId = -1;

/// 심볼 테이블 파일명
pub const SYMBOLS_FILE: &str = "symbols.json";

const SYMBOLS_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SymbolFile {
    version: u32,
    symbols: Vec<String>,
}

/// String interner producing dense ids (`0, 1, 2, ...`)
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<String>,
    lookup: HashMap<String, SymbolId>,
    dirty: bool,
}

impl SymbolTable {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `symbol`, returning its existing id when already known
    pub fn intern(&mut self, symbol: &str) -> Result<SymbolId> {
        if let Some(&id) = self.lookup.get(symbol) {
            return Ok(id);
        }

        let id = SymbolId::try_from(self.symbols.len())
            .map_err(|_| Error::Internal("Symbol table is full".to_string()))?;
        self.symbols.push(symbol.to_string());
        self.lookup.insert(symbol.to_string(), id);
        self.dirty = true;
        Ok(id)
    }

    /// Id of an already interned symbol
    pub fn id(&self, symbol: &str) -> Option<SymbolId> {
        self.lookup.get(symbol).copied()
    }

    /// Text of an interned symbol
    pub fn symbol(&self, id: SymbolId) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.symbols.get(idx))
            .map(String::as_str)
    }

    /// Text of `id` for display; never fails
    pub fn resolve(&self, id: SymbolId) -> String {
        if id == UNKNOWN {
            return "<unknown>".to_string();
        }
        match self.symbol(id) {
            Some(symbol) => symbol.to_string(),
            None => format!("#{}", id),
        }
    }

    /// Get the number of interned symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// Load the table from `store`, or start empty when no file exists
    pub fn load(store: &JsonStore) -> Result<Self> {
        let Some(file) = store.load_optional::<SymbolFile>(SYMBOLS_FILE)? else {
            debug!("No symbol table in {}", store.base_dir().display());
            return Ok(Self::new());
        };

        if file.version != SYMBOLS_VERSION {
            return Err(Error::Encoding(format!(
                "Unsupported symbol table version {}",
                file.version
            )));
        }

        let mut table = Self::new();
        for symbol in file.symbols {
            let expected = table.symbols.len();
            let id = table.intern(&symbol)?;
            if id as usize != expected {
                return Err(Error::Encoding(format!(
                    "Duplicate symbol in table: {}",
                    symbol
                )));
            }
        }
        table.dirty = false;

        info!("Loaded {} symbols", table.len());
        Ok(table)
    }

    /// Persist the table to `store` if it changed
    pub fn save(&mut self, store: &JsonStore) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let file = SymbolFile {
            version: SYMBOLS_VERSION,
            symbols: self.symbols.clone(),
        };
        store.save(SYMBOLS_FILE, &file)?;
        self.dirty = false;
        debug!("Saved {} symbols", self.len());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_dense_and_stable() {
        let mut table = SymbolTable::new();
        let a = table.intern("com/example/A").expect("intern");
        let b = table.intern("com/example/B").expect("intern");
        let a_again = table.intern("com/example/A").expect("intern");

        assert_eq!((a, b), (0, 1));
        assert_eq!(a, a_again);
        assert_eq!(table.len(), 2);
        assert_eq!(table.symbol(b), Some("com/example/B"));
        assert_eq!(table.id("com/example/A"), Some(a));
    }

    #[test]
    fn test_resolve_unknown_and_missing() {
        let table = SymbolTable::new();
        assert_eq!(table.resolve(UNKNOWN), "<unknown>");
        assert_eq!(table.resolve(17), "#17");
        assert_eq!(table.symbol(UNKNOWN), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStore::new(dir.path());

        let mut table = SymbolTable::new();
        table.intern("m").expect("intern");
        table.intern("()V").expect("intern");
        assert!(table.dirty);
        table.save(&store).expect("save");
        assert!(!table.dirty);

        let loaded = SymbolTable::load(&store).expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.id("()V"), Some(1));
        assert!(!loaded.dirty);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = SymbolTable::load(&JsonStore::new(dir.path())).expect("load");
        assert!(table.is_empty());
    }
}
