//! Back dependencies
//!
//! A [`Dependency`] says which members of a class one referencer uses. The
//! [`DependencyCollector`] groups raw `(member, referencer)` pairs by
//! referencer so that callers see one record per class.

use crate::info::{FieldInfo, MemberInfo, MethodInfo};
use depcache_foundation::SymbolId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A class that depends on some class, and the members it uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Qualified name id of the referencer
    pub class_qname: SymbolId,
    /// Used members; empty when only the class itself is referenced
    pub members: Vec<MemberInfo>,
}

impl Dependency {
    pub fn new(class_qname: SymbolId) -> Self {
        Self {
            class_qname,
            members: Vec::new(),
        }
    }

    /// Attach `member` unless it is already attached
    pub fn add_member(&mut self, member: impl Into<MemberInfo>) {
        let member = member.into();
        if !self.members.contains(&member) {
            self.members.push(member);
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.members.iter().filter_map(|member| match member {
            MemberInfo::Field(field) => Some(field),
            MemberInfo::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.members.iter().filter_map(|member| match member {
            MemberInfo::Method(method) => Some(method),
            MemberInfo::Field(_) => None,
        })
    }
}

/// Groups dependencies of one class by referencer
#[derive(Debug)]
pub(crate) struct DependencyCollector {
    owner: SymbolId,
    dependencies: BTreeMap<SymbolId, Dependency>,
}

impl DependencyCollector {
    pub fn new(owner: SymbolId) -> Self {
        Self {
            owner,
            dependencies: BTreeMap::new(),
        }
    }

    fn entry(&mut self, referencer: SymbolId) -> Option<&mut Dependency> {
        // a class never depends on itself
        if referencer == self.owner {
            return None;
        }
        Some(
            self.dependencies
                .entry(referencer)
                .or_insert_with(|| Dependency::new(referencer)),
        )
    }

    pub fn add_referencers(&mut self, referencers: &[SymbolId]) {
        for &referencer in referencers {
            self.entry(referencer);
        }
    }

    pub fn add_member_referencers(&mut self, member: &MemberInfo, referencers: &[SymbolId]) {
        for &referencer in referencers {
            if let Some(dependency) = self.entry(referencer) {
                dependency.add_member(member.clone());
            }
        }
    }

    pub fn finish(self) -> Vec<Dependency> {
        self.dependencies.into_values().collect()
    }
}
