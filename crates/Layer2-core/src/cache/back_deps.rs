//! Back-dependency aggregation

use super::Cache;
use crate::dependency::{Dependency, DependencyCollector};
use crate::error::CacheResult;
use crate::info::MemberInfo;
use crate::key::DependencyKey;
use depcache_foundation::SymbolId;

impl Cache {
    /// Classes that must be revisited when `qname` changes, one per referencer,
    /// each carrying the members of `qname` it uses
    ///
    /// Self references are excluded. The result is ordered by referencer id.
    pub fn back_dependencies(&self, qname: SymbolId) -> CacheResult<Vec<Dependency>> {
        let mut collector = DependencyCollector::new(qname);
        collector.add_referencers(&self.referencers_of(&DependencyKey::class(qname))?);

        let Some(info) = self.get_class(qname)? else {
            return Ok(collector.finish());
        };

        for field in info.fields {
            let referencers = self.referencers_of(&DependencyKey::field(qname, field.name))?;
            if !referencers.is_empty() {
                collector.add_member_referencers(&MemberInfo::Field(field), &referencers);
            }
        }
        for method in info.methods {
            let key = DependencyKey::method(qname, method.name, method.descriptor);
            let referencers = self.referencers_of(&key)?;
            if !referencers.is_empty() {
                collector.add_member_referencers(&MemberInfo::Method(method), &referencers);
            }
        }

        Ok(collector.finish())
    }
}
