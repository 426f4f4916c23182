//! Declaration keys
//!
//! A [`DependencyKey`] names one referenceable declaration: a class, one of its
//! fields, or one of its methods. It is the key of the referencer index.

use depcache_foundation::{Error, KeyReader, KeyWriter, Result, StoreKey, SymbolId};
use serde::{Deserialize, Serialize};

const TAG_CLASS: u8 = 1;
const TAG_FIELD: u8 = 2;
const TAG_METHOD: u8 = 3;

/// Identity of a class, field or method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DependencyKey {
    Class {
        class: SymbolId,
    },
    Field {
        class: SymbolId,
        name: SymbolId,
    },
    Method {
        class: SymbolId,
        name: SymbolId,
        descriptor: SymbolId,
    },
}

impl DependencyKey {
    pub fn class(class: SymbolId) -> Self {
        DependencyKey::Class { class }
    }

    pub fn field(class: SymbolId, name: SymbolId) -> Self {
        DependencyKey::Field { class, name }
    }

    pub fn method(class: SymbolId, name: SymbolId, descriptor: SymbolId) -> Self {
        DependencyKey::Method {
            class,
            name,
            descriptor,
        }
    }

    /// Qualified name of the class that owns the declaration
    pub fn class_qname(&self) -> SymbolId {
        match *self {
            DependencyKey::Class { class }
            | DependencyKey::Field { class, .. }
            | DependencyKey::Method { class, .. } => class,
        }
    }
}

impl StoreKey for DependencyKey {
    fn encode(&self) -> Vec<u8> {
        match *self {
            DependencyKey::Class { class } => {
                KeyWriter::with_capacity(5).tag(TAG_CLASS).i32(class).finish()
            }
            DependencyKey::Field { class, name } => KeyWriter::with_capacity(9)
                .tag(TAG_FIELD)
                .i32(class)
                .i32(name)
                .finish(),
            DependencyKey::Method {
                class,
                name,
                descriptor,
            } => KeyWriter::with_capacity(13)
                .tag(TAG_METHOD)
                .i32(class)
                .i32(name)
                .i32(descriptor)
                .finish(),
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = KeyReader::new(bytes);
        let key = match reader.read_tag()? {
            TAG_CLASS => DependencyKey::Class {
                class: reader.read_i32()?,
            },
            TAG_FIELD => DependencyKey::Field {
                class: reader.read_i32()?,
                name: reader.read_i32()?,
            },
            TAG_METHOD => DependencyKey::Method {
                class: reader.read_i32()?,
                name: reader.read_i32()?,
                descriptor: reader.read_i32()?,
            },
            other => {
                return Err(Error::Encoding(format!(
                    "Unknown dependency key tag: {}",
                    other
                )))
            }
        };
        reader.finish()?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encoding_layout() {
        assert_eq!(DependencyKey::class(1).encode(), vec![1, 0, 0, 0, 1]);
        assert_eq!(
            DependencyKey::field(1, 2).encode(),
            vec![2, 0, 0, 0, 1, 0, 0, 0, 2]
        );
        assert_eq!(DependencyKey::method(1, 2, 3).encode().len(), 13);
    }

    #[test]
    fn test_decode_every_variant() {
        for key in [
            DependencyKey::class(7),
            DependencyKey::field(7, 8),
            DependencyKey::method(7, 8, -1),
        ] {
            let decoded = DependencyKey::decode(&key.encode()).expect("decode");
            assert_eq!(decoded, key);
        }
    }

    #[test]
    fn test_decode_rejects_malformed_keys() {
        assert!(DependencyKey::decode(&[]).is_err());
        assert!(DependencyKey::decode(&[9, 0, 0, 0, 1]).is_err());
        // field tag with only one component
        assert!(DependencyKey::decode(&[2, 0, 0, 0, 1]).is_err());
        // trailing byte
        assert!(DependencyKey::decode(&[1, 0, 0, 0, 1, 0]).is_err());
    }

    #[test]
    fn test_structural_equality() {
        let mut keys = HashSet::new();
        keys.insert(DependencyKey::field(1, 2));
        keys.insert(DependencyKey::field(1, 2));
        keys.insert(DependencyKey::method(1, 2, 0));
        keys.insert(DependencyKey::class(1));
        assert_eq!(keys.len(), 3);
        assert_ne!(DependencyKey::field(1, 2), DependencyKey::method(1, 2, 0));
    }

    #[test]
    fn test_class_qname() {
        assert_eq!(DependencyKey::method(4, 5, 6).class_qname(), 4);
        assert_eq!(DependencyKey::field(7, 5).class_qname(), 7);
        assert_eq!(DependencyKey::class(9).class_qname(), 9);
    }
}
