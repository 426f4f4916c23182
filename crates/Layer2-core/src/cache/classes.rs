//! Class metadata: CRUD and record accessors
//!
//! Accessors never fail for an unknown class: they report `UNKNOWN`, an empty
//! string or an empty list, exactly as for a known class without the data.

use super::Cache;
use crate::error::CacheResult;
use crate::info::{AnnotationInfo, ClassInfo, FieldInfo, MethodInfo};
use crate::key::DependencyKey;
use crate::reader::ClassFileReader;
use depcache_foundation::{SymbolId, SymbolTable, UNKNOWN};
use tracing::debug;

impl Cache {
    // ========================================================================
    // Records
    // ========================================================================

    /// Qualified names of all stored classes
    pub fn all_class_names(&self) -> CacheResult<Vec<SymbolId>> {
        Ok(self.classes.keys()?)
    }

    pub fn contains_class(&self, qname: SymbolId) -> CacheResult<bool> {
        Ok(self.classes.contains_key(&qname)?)
    }

    pub fn get_class(&self, qname: SymbolId) -> CacheResult<Option<ClassInfo>> {
        Ok(self.classes.get(&qname)?)
    }

    /// Store `info` under `qname`, replacing any previous record
    pub fn put_class(&self, qname: SymbolId, info: &ClassInfo) -> CacheResult<()> {
        self.classes.put(&qname, info)?;
        Ok(())
    }

    /// Read a freshly compiled class and store it; returns its qualified name
    pub fn import_class_info(
        &self,
        reader: &dyn ClassFileReader,
        symbols: &mut SymbolTable,
    ) -> CacheResult<SymbolId> {
        let info = ClassInfo::from_reader(reader, symbols)?;
        let qname = info.qualified_name;
        self.put_class(qname, &info)?;
        debug!("Imported class {}", symbols.resolve(qname));
        Ok(qname)
    }

    /// Copy the record of `qname` from another cache, without its raw references
    ///
    /// Does nothing when `from` does not know the class.
    pub fn import_class_info_from(&self, from: &Cache, qname: SymbolId) -> CacheResult<()> {
        if let Some(mut info) = from.get_class(qname)? {
            info.clear_references();
            self.put_class(qname, &info)?;
            debug!("Imported class #{} from {}", qname, from.root().display());
        }
        Ok(())
    }

    /// Remove a class together with every index entry about it
    ///
    /// Its class, field and method keys are dropped from the referencer index,
    /// its forward references, subclasses and remote marker are dropped, and it
    /// is purged as a value from all three indices.
    pub fn remove_class(&self, qname: SymbolId) -> CacheResult<()> {
        if let Some(info) = self.classes.get(&qname)? {
            for field in &info.fields {
                self.referencers
                    .remove(&DependencyKey::field(qname, field.name))?;
            }
            for method in &info.methods {
                self.referencers
                    .remove(&DependencyKey::method(qname, method.name, method.descriptor))?;
            }
            self.classes.remove(&qname)?;
        }

        self.referencers.remove(&DependencyKey::class(qname))?;
        self.referenced.remove(&qname)?;
        self.subclasses.remove(&qname)?;
        self.remote.remove(&qname)?;

        let purged = self.referencers.remove_value_everywhere(qname)?
            + self.referenced.remove_value_everywhere(qname)?
            + self.subclasses.remove_value_everywhere(qname)?;

        debug!("Removed class #{} ({} index entries purged)", qname, purged);
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    fn read<T>(&self, qname: SymbolId, absent: T, f: impl FnOnce(ClassInfo) -> T) -> CacheResult<T> {
        Ok(self.classes.get(&qname)?.map(f).unwrap_or(absent))
    }

    pub fn super_qualified_name(&self, qname: SymbolId) -> CacheResult<SymbolId> {
        self.read(qname, UNKNOWN, |info| info.super_qualified_name)
    }

    pub fn super_interfaces(&self, qname: SymbolId) -> CacheResult<Vec<SymbolId>> {
        self.read(qname, Vec::new(), |info| info.super_interfaces)
    }

    pub fn flags(&self, qname: SymbolId) -> CacheResult<i32> {
        self.read(qname, UNKNOWN, |info| info.flags)
    }

    pub fn generic_signature(&self, qname: SymbolId) -> CacheResult<SymbolId> {
        self.read(qname, UNKNOWN, |info| info.generic_signature)
    }

    pub fn source_file_name(&self, qname: SymbolId) -> CacheResult<String> {
        self.read(qname, String::new(), |info| info.source_file_name)
    }

    pub fn path(&self, qname: SymbolId) -> CacheResult<String> {
        self.read(qname, String::new(), |info| info.path)
    }

    /// Record the output path of a stored class; no-op for an unknown class
    pub fn set_path(&self, qname: SymbolId, path: impl Into<String>) -> CacheResult<()> {
        if let Some(mut info) = self.classes.get(&qname)? {
            info.path = path.into();
            self.classes.put(&qname, &info)?;
        }
        Ok(())
    }

    pub fn runtime_visible_annotations(&self, qname: SymbolId) -> CacheResult<Vec<AnnotationInfo>> {
        self.read(qname, Vec::new(), |info| info.runtime_visible_annotations)
    }

    pub fn runtime_invisible_annotations(
        &self,
        qname: SymbolId,
    ) -> CacheResult<Vec<AnnotationInfo>> {
        self.read(qname, Vec::new(), |info| info.runtime_invisible_annotations)
    }

    /// Raw references not yet indexed
    pub fn references(&self, qname: SymbolId) -> CacheResult<Vec<DependencyKey>> {
        self.read(qname, Vec::new(), |info| info.references)
    }

    pub fn fields(&self, qname: SymbolId) -> CacheResult<Vec<FieldInfo>> {
        self.read(qname, Vec::new(), |info| info.fields)
    }

    pub fn find_field(
        &self,
        qname: SymbolId,
        name: SymbolId,
        descriptor: SymbolId,
    ) -> CacheResult<Option<FieldInfo>> {
        self.read(qname, None, |info| info.find_field(name, descriptor).cloned())
    }

    pub fn find_field_by_name(
        &self,
        qname: SymbolId,
        name: SymbolId,
    ) -> CacheResult<Option<FieldInfo>> {
        self.read(qname, None, |info| info.find_field_by_name(name).cloned())
    }

    pub fn methods(&self, qname: SymbolId) -> CacheResult<Vec<MethodInfo>> {
        self.read(qname, Vec::new(), |info| info.methods)
    }

    pub fn find_method(
        &self,
        qname: SymbolId,
        name: SymbolId,
        descriptor: SymbolId,
    ) -> CacheResult<Option<MethodInfo>> {
        self.read(qname, None, |info| info.find_method(name, descriptor).cloned())
    }

    pub fn find_methods_by_name(
        &self,
        qname: SymbolId,
        name: SymbolId,
    ) -> CacheResult<Vec<MethodInfo>> {
        self.read(qname, Vec::new(), |info| {
            info.find_methods_by_name(name).into_iter().cloned().collect()
        })
    }

    /// First method matching a `name(params)` signature, see [`crate::method_signature`]
    pub fn find_method_by_signature(
        &self,
        qname: SymbolId,
        signature: &str,
        symbols: &SymbolTable,
    ) -> CacheResult<Option<MethodInfo>> {
        self.read(qname, None, |info| {
            info.find_method_by_signature(signature, symbols).cloned()
        })
    }

    /// Every method matching a `name(params)` signature
    pub fn find_methods_by_signature(
        &self,
        qname: SymbolId,
        signature: &str,
        symbols: &SymbolTable,
    ) -> CacheResult<Vec<MethodInfo>> {
        self.read(qname, Vec::new(), |info| {
            info.find_methods_by_signature(signature, symbols)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    // ========================================================================
    // Remote markers
    // ========================================================================

    /// Remote marker of a class; `false` when never set
    pub fn is_remote(&self, qname: SymbolId) -> CacheResult<bool> {
        Ok(self.remote.get(&qname)?.unwrap_or(false))
    }

    pub fn set_remote(&self, qname: SymbolId, remote: bool) -> CacheResult<()> {
        self.remote.put(&qname, &remote)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ParsedClass, ParsedField, ParsedMethod};
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> Cache {
        Cache::open(dir.path(), 8).expect("open")
    }

    #[test]
    fn test_absent_class_sentinels() {
        let dir = TempDir::new().expect("tempdir");
        let cache = open(&dir);

        assert!(!cache.contains_class(5).expect("contains"));
        assert_eq!(cache.get_class(5).expect("get"), None);
        assert_eq!(cache.super_qualified_name(5).expect("super"), UNKNOWN);
        assert_eq!(cache.flags(5).expect("flags"), UNKNOWN);
        assert_eq!(cache.generic_signature(5).expect("sig"), UNKNOWN);
        assert_eq!(cache.source_file_name(5).expect("source"), "");
        assert_eq!(cache.path(5).expect("path"), "");
        assert!(cache.super_interfaces(5).expect("ifaces").is_empty());
        assert!(cache.fields(5).expect("fields").is_empty());
        assert!(cache.methods(5).expect("methods").is_empty());
        assert!(cache.references(5).expect("refs").is_empty());
        assert!(cache.find_field_by_name(5, 1).expect("field").is_none());
        assert!(cache.find_field(5, 1, 2).expect("field").is_none());
        assert!(cache.find_method(5, 1, 2).expect("method").is_none());
        assert!(cache.runtime_visible_annotations(5).expect("visible").is_empty());
        assert!(cache.runtime_invisible_annotations(5).expect("invisible").is_empty());
        assert!(cache.find_methods_by_name(5, 1).expect("methods").is_empty());
        assert!(!cache.is_remote(5).expect("remote"));

        cache.set_path(5, "out/X.class").expect("set_path");
        assert!(!cache.contains_class(5).expect("contains"));
        cache.dispose().expect("dispose");
    }

    #[test]
    fn test_import_and_read_back() {
        let dir = TempDir::new().expect("tempdir");
        let cache = open(&dir);
        let mut symbols = SymbolTable::new();

        let mut parsed = ParsedClass::new("p/A");
        parsed.super_name = Some("p/Base".into());
        parsed.flags = 0x11;
        parsed.source_file = "A.java".into();
        parsed.path = "out/p/A.class".into();
        parsed.fields.push(ParsedField {
            name: "x".into(),
            descriptor: "J".into(),
            ..Default::default()
        });
        parsed.methods.push(ParsedMethod {
            name: "m".into(),
            descriptor: "(J)I".into(),
            ..Default::default()
        });

        let a = cache.import_class_info(&parsed, &mut symbols).expect("import");
        let x = symbols.id("x").expect("x");
        let m = symbols.id("m").expect("m");

        assert_eq!(cache.all_class_names().expect("names"), vec![a]);
        assert_eq!(cache.super_qualified_name(a).expect("super"), symbols.id("p/Base").expect("base"));
        assert_eq!(cache.flags(a).expect("flags"), 0x11);
        assert_eq!(cache.source_file_name(a).expect("source"), "A.java");
        assert_eq!(cache.path(a).expect("path"), "out/p/A.class");
        assert_eq!(cache.find_field_by_name(a, x).expect("field").map(|f| f.name), Some(x));
        assert_eq!(cache.find_methods_by_signature(a, "m(J)", &symbols).expect("sig").len(), 1);
        assert!(cache.find_methods_by_signature(a, "m()", &symbols).expect("sig").is_empty());
        let first = cache.find_method_by_signature(a, "m(J)", &symbols).expect("sig");
        assert_eq!(first.map(|method| method.name), Some(m));
        assert!(cache.find_method_by_signature(a, "m()", &symbols).expect("sig").is_none());
        assert!(cache.find_method_by_signature(99, "m(J)", &symbols).expect("sig").is_none());

        cache.set_path(a, "out2/p/A.class").expect("set_path");
        assert_eq!(cache.path(a).expect("path"), "out2/p/A.class");
        cache.dispose().expect("dispose");
    }

    #[test]
    fn test_remote_marker() {
        let dir = TempDir::new().expect("tempdir");
        let cache = open(&dir);

        cache.set_remote(3, true).expect("set");
        assert!(cache.is_remote(3).expect("get"));
        cache.set_remote(3, false).expect("set");
        assert!(!cache.is_remote(3).expect("get"));
        cache.dispose().expect("dispose");
    }
}
