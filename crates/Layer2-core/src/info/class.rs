//! Class records

use super::annotation::AnnotationInfo;
use super::member::{unknown, FieldInfo, MethodInfo};
use crate::key::DependencyKey;
use depcache_foundation::{SymbolId, SymbolTable, UNKNOWN};
use serde::{Deserialize, Serialize};

/// Everything the cache knows about one compiled class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub qualified_name: SymbolId,
    /// `UNKNOWN` for the root class or an unresolved super
    #[serde(default = "unknown")]
    pub super_qualified_name: SymbolId,
    #[serde(default)]
    pub super_interfaces: Vec<SymbolId>,
    pub flags: i32,
    #[serde(default = "unknown")]
    pub generic_signature: SymbolId,
    #[serde(default)]
    pub source_file_name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub runtime_visible_annotations: Vec<AnnotationInfo>,
    #[serde(default)]
    pub runtime_invisible_annotations: Vec<AnnotationInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    /// Raw references made by the class body; dropped once indexed
    #[serde(default)]
    pub references: Vec<DependencyKey>,
}

impl ClassInfo {
    pub fn new(qualified_name: SymbolId, flags: i32) -> Self {
        Self {
            qualified_name,
            super_qualified_name: UNKNOWN,
            super_interfaces: Vec::new(),
            flags,
            generic_signature: UNKNOWN,
            source_file_name: String::new(),
            path: String::new(),
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn clear_references(&mut self) {
        self.references.clear();
    }

    /// Super class followed by super interfaces, skipping `UNKNOWN`
    pub fn supertypes(&self) -> impl Iterator<Item = SymbolId> + '_ {
        std::iter::once(self.super_qualified_name)
            .chain(self.super_interfaces.iter().copied())
            .filter(|&id| id != UNKNOWN)
    }

    pub fn find_field(&self, name: SymbolId, descriptor: SymbolId) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|field| field.name == name && field.descriptor == descriptor)
    }

    pub fn find_field_by_name(&self, name: SymbolId) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn find_method(&self, name: SymbolId, descriptor: SymbolId) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }

    pub fn find_methods_by_name(&self, name: SymbolId) -> Vec<&MethodInfo> {
        self.methods
            .iter()
            .filter(|method| method.name == name)
            .collect()
    }

    /// First method whose [`crate::method_signature`] equals `signature`
    pub fn find_method_by_signature(
        &self,
        signature: &str,
        symbols: &SymbolTable,
    ) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| has_signature(method, signature, symbols))
    }

    /// Every method whose [`crate::method_signature`] equals `signature`
    pub fn find_methods_by_signature(
        &self,
        signature: &str,
        symbols: &SymbolTable,
    ) -> Vec<&MethodInfo> {
        self.methods
            .iter()
            .filter(|method| has_signature(method, signature, symbols))
            .collect()
    }
}

fn has_signature(method: &MethodInfo, signature: &str, symbols: &SymbolTable) -> bool {
    method.signature(symbols).as_deref() == Some(signature)
}
