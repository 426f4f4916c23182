//! Annotation and constant values

use depcache_foundation::SymbolId;
use serde::{Deserialize, Serialize};

/// One annotation instance attached to a class, field, method or parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInfo {
    /// Qualified name id of the annotation type
    pub type_name: SymbolId,
    #[serde(default)]
    pub members: Vec<AnnotationMember>,
}

impl AnnotationInfo {
    pub fn new(type_name: SymbolId) -> Self {
        Self {
            type_name,
            members: Vec::new(),
        }
    }
}

/// `name = value` pair of an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMember {
    pub name: SymbolId,
    pub value: ConstantValue,
}

/// Compile-time constant: field initializers, annotation members and defaults
///
/// Floating point constants are kept as their IEEE 754 bit patterns, so NaN,
/// infinities and `-0.0` are stored exactly and compare bitwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float {
        bits: u32,
    },
    Double {
        bits: u64,
    },
    Boolean(bool),
    Char(char),
    String(String),
    /// Class literal, by qualified name id
    Class(SymbolId),
    Enum {
        type_name: SymbolId,
        constant: SymbolId,
    },
    Annotation(Box<AnnotationInfo>),
    Array(Vec<ConstantValue>),
}

impl ConstantValue {
    pub fn float(value: f32) -> Self {
        ConstantValue::Float {
            bits: value.to_bits(),
        }
    }

    pub fn double(value: f64) -> Self {
        ConstantValue::Double {
            bits: value.to_bits(),
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            ConstantValue::Float { bits } => Some(f32::from_bits(bits)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ConstantValue::Double { bits } => Some(f64::from_bits(bits)),
            _ => None,
        }
    }
}
