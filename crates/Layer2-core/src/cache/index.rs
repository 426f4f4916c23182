//! Reference and subclass indices
//!
//! Thin wrappers over the multi-value stores. Adds and removes are
//! incremental; diffing old against new references is the driver's job.

use super::Cache;
use crate::error::CacheResult;
use crate::key::DependencyKey;
use depcache_foundation::SymbolId;
use tracing::debug;

impl Cache {
    // ========================================================================
    // Subclasses
    // ========================================================================

    pub fn subclasses(&self, qname: SymbolId) -> CacheResult<Vec<SymbolId>> {
        Ok(self.subclasses.get_values(&qname)?)
    }

    pub fn add_subclass(&self, qname: SymbolId, subclass: SymbolId) -> CacheResult<()> {
        Ok(self.subclasses.add_value(&qname, subclass)?)
    }

    pub fn remove_subclass(&self, qname: SymbolId, subclass: SymbolId) -> CacheResult<()> {
        Ok(self.subclasses.remove_value(&qname, subclass)?)
    }

    // ========================================================================
    // Forward references
    // ========================================================================

    pub fn referenced_class_qnames(&self, qname: SymbolId) -> CacheResult<Vec<SymbolId>> {
        Ok(self.referenced.get_values(&qname)?)
    }

    pub fn add_referenced_class(&self, qname: SymbolId, referenced: SymbolId) -> CacheResult<()> {
        Ok(self.referenced.add_value(&qname, referenced)?)
    }

    // ========================================================================
    // Referencers
    // ========================================================================

    pub fn class_referencers(&self, qname: SymbolId) -> CacheResult<Vec<SymbolId>> {
        self.referencers_of(&DependencyKey::class(qname))
    }

    pub fn add_class_referencer(&self, qname: SymbolId, referencer: SymbolId) -> CacheResult<()> {
        self.add_referencer(&DependencyKey::class(qname), referencer)
    }

    pub fn remove_class_referencer(
        &self,
        qname: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<()> {
        self.remove_referencer(&DependencyKey::class(qname), referencer)
    }

    pub fn field_referencers(&self, qname: SymbolId, field: SymbolId) -> CacheResult<Vec<SymbolId>> {
        self.referencers_of(&DependencyKey::field(qname, field))
    }

    pub fn add_field_referencer(
        &self,
        qname: SymbolId,
        field: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<()> {
        self.add_referencer(&DependencyKey::field(qname, field), referencer)
    }

    pub fn remove_field_referencer(
        &self,
        qname: SymbolId,
        field: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<()> {
        self.remove_referencer(&DependencyKey::field(qname, field), referencer)
    }

    pub fn method_referencers(
        &self,
        qname: SymbolId,
        method: SymbolId,
        descriptor: SymbolId,
    ) -> CacheResult<Vec<SymbolId>> {
        self.referencers_of(&DependencyKey::method(qname, method, descriptor))
    }

    pub fn add_method_referencer(
        &self,
        qname: SymbolId,
        method: SymbolId,
        descriptor: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<()> {
        self.add_referencer(&DependencyKey::method(qname, method, descriptor), referencer)
    }

    pub fn remove_method_referencer(
        &self,
        qname: SymbolId,
        method: SymbolId,
        descriptor: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<()> {
        self.remove_referencer(&DependencyKey::method(qname, method, descriptor), referencer)
    }

    pub fn is_class_referenced(&self, qname: SymbolId, referencer: SymbolId) -> CacheResult<bool> {
        Ok(self.class_referencers(qname)?.contains(&referencer))
    }

    pub fn is_field_referenced(
        &self,
        qname: SymbolId,
        field: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<bool> {
        Ok(self.field_referencers(qname, field)?.contains(&referencer))
    }

    pub fn is_method_referenced(
        &self,
        qname: SymbolId,
        method: SymbolId,
        descriptor: SymbolId,
        referencer: SymbolId,
    ) -> CacheResult<bool> {
        Ok(self
            .method_referencers(qname, method, descriptor)?
            .contains(&referencer))
    }

    pub(crate) fn referencers_of(&self, key: &DependencyKey) -> CacheResult<Vec<SymbolId>> {
        Ok(self.referencers.get_values(key)?)
    }

    fn add_referencer(&self, key: &DependencyKey, referencer: SymbolId) -> CacheResult<()> {
        Ok(self.referencers.add_value(key, referencer)?)
    }

    fn remove_referencer(&self, key: &DependencyKey, referencer: SymbolId) -> CacheResult<()> {
        Ok(self.referencers.remove_value(key, referencer)?)
    }

    // ========================================================================
    // Index pass
    // ========================================================================

    /// Turn the raw references of a stored class into index entries
    ///
    /// The class becomes a referencer of every declaration it references, a
    /// forward reference of each referenced class other than itself, and a
    /// subclass of its supertypes. The raw references are then dropped from
    /// the record. Does nothing for an unknown class.
    pub fn index_references(&self, qname: SymbolId) -> CacheResult<()> {
        let Some(mut info) = self.classes.get(&qname)? else {
            return Ok(());
        };

        for reference in &info.references {
            self.add_referencer(reference, qname)?;
            let target = reference.class_qname();
            if target != qname {
                self.add_referenced_class(qname, target)?;
            }
        }
        for supertype in info.supertypes() {
            self.add_subclass(supertype, qname)?;
        }

        let indexed = info.references.len();
        info.clear_references();
        self.classes.put(&qname, &info)?;

        debug!("Indexed {} references of class #{}", indexed, qname);
        Ok(())
    }
}
