//! Field and method records

use super::annotation::{AnnotationInfo, ConstantValue};
use depcache_foundation::{SymbolId, SymbolTable, UNKNOWN};
use serde::{Deserialize, Serialize};

/// Name of instance initializers
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Signature of a method: its name followed by the parameter part of its
/// descriptor, `)` included. Returns `None` for a descriptor without `)`.
///
/// ```
/// use depcache_core::method_signature;
///
/// assert_eq!(method_signature("m", "(ILjava/lang/String;)V").as_deref(), Some("m(ILjava/lang/String;)"));
/// assert_eq!(method_signature("m", "I"), None);
/// ```
pub fn method_signature(name: &str, descriptor: &str) -> Option<String> {
    let end = descriptor.find(')')?;
    Some(format!("{}{}", name, &descriptor[..=end]))
}

/// A field declared by a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: SymbolId,
    pub descriptor: SymbolId,
    pub flags: i32,
    #[serde(default = "unknown")]
    pub generic_signature: SymbolId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<ConstantValue>,
    #[serde(default)]
    pub runtime_visible_annotations: Vec<AnnotationInfo>,
    #[serde(default)]
    pub runtime_invisible_annotations: Vec<AnnotationInfo>,
}

impl FieldInfo {
    pub fn new(name: SymbolId, descriptor: SymbolId, flags: i32) -> Self {
        Self {
            name,
            descriptor,
            flags,
            generic_signature: UNKNOWN,
            constant_value: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
        }
    }
}

/// A method (or constructor) declared by a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: SymbolId,
    pub descriptor: SymbolId,
    pub flags: i32,
    #[serde(default = "unknown")]
    pub generic_signature: SymbolId,
    #[serde(default)]
    pub thrown_exceptions: Vec<SymbolId>,
    #[serde(default)]
    pub runtime_visible_annotations: Vec<AnnotationInfo>,
    #[serde(default)]
    pub runtime_invisible_annotations: Vec<AnnotationInfo>,
    /// Per-parameter annotations, one list per parameter
    #[serde(default)]
    pub runtime_visible_parameter_annotations: Vec<Vec<AnnotationInfo>>,
    #[serde(default)]
    pub runtime_invisible_parameter_annotations: Vec<Vec<AnnotationInfo>>,
    /// Default of an annotation type element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_default: Option<ConstantValue>,
}

impl MethodInfo {
    pub fn new(name: SymbolId, descriptor: SymbolId, flags: i32) -> Self {
        Self {
            name,
            descriptor,
            flags,
            generic_signature: UNKNOWN,
            thrown_exceptions: Vec::new(),
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            runtime_visible_parameter_annotations: Vec::new(),
            runtime_invisible_parameter_annotations: Vec::new(),
            annotation_default: None,
        }
    }

    pub fn is_constructor(&self, symbols: &SymbolTable) -> bool {
        symbols.symbol(self.name) == Some(CONSTRUCTOR_NAME)
    }

    /// See [`method_signature`]; `None` when name or descriptor is not interned
    pub fn signature(&self, symbols: &SymbolTable) -> Option<String> {
        method_signature(symbols.symbol(self.name)?, symbols.symbol(self.descriptor)?)
    }
}

/// A field or method of some class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberInfo {
    Field(FieldInfo),
    Method(MethodInfo),
}

impl MemberInfo {
    pub fn name(&self) -> SymbolId {
        match self {
            MemberInfo::Field(field) => field.name,
            MemberInfo::Method(method) => method.name,
        }
    }

    pub fn descriptor(&self) -> SymbolId {
        match self {
            MemberInfo::Field(field) => field.descriptor,
            MemberInfo::Method(method) => method.descriptor,
        }
    }
}

impl From<FieldInfo> for MemberInfo {
    fn from(field: FieldInfo) -> Self {
        MemberInfo::Field(field)
    }
}

impl From<MethodInfo> for MemberInfo {
    fn from(method: MethodInfo) -> Self {
        MemberInfo::Method(method)
    }
}

pub(crate) fn unknown() -> SymbolId {
    UNKNOWN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_signature() {
        assert_eq!(method_signature("m", "()V").as_deref(), Some("m()"));
        assert_eq!(
            method_signature("<init>", "(IJ)V").as_deref(),
            Some("<init>(IJ)")
        );
        assert_eq!(method_signature("f", "Ljava/lang/String;"), None);
    }

    #[test]
    fn test_method_helpers() {
        let mut symbols = SymbolTable::new();
        let init = symbols.intern("<init>").expect("intern");
        let desc = symbols.intern("(I)V").expect("intern");
        let method = MethodInfo::new(init, desc, 0);

        assert!(method.is_constructor(&symbols));
        assert_eq!(method.signature(&symbols).as_deref(), Some("<init>(I)"));

        let orphan = MethodInfo::new(99, desc, 0);
        assert!(!orphan.is_constructor(&symbols));
        assert_eq!(orphan.signature(&symbols), None);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let field: FieldInfo =
            serde_json::from_str(r#"{"name":1,"descriptor":2,"flags":8}"#).expect("deserialize");
        assert_eq!(field.generic_signature, UNKNOWN);
        assert!(field.constant_value.is_none());
        assert!(field.runtime_visible_annotations.is_empty());
    }

    #[test]
    fn test_member_accessors() {
        let member: MemberInfo = FieldInfo::new(1, 2, 0).into();
        assert_eq!(member.name(), 1);
        assert_eq!(member.descriptor(), 2);
    }
}
