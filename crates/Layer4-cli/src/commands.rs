//! Command implementations

use anyhow::{anyhow, Context};
use depcache_core::{
    Cache, CacheStats, ClassInfo, ConstantValue, Dependency, MemberInfo, ParsedClass,
};
use depcache_foundation::{CacheConfig, JsonStore, SymbolId, SymbolTable, UNKNOWN};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Symbols live in a subdirectory so that `wipe` keeps them
const SYMBOLS_DIR: &str = "symbols";

/// An open cache plus the symbol table that names its ids
pub struct Session {
    cache: Cache,
    symbols: SymbolTable,
    symbol_store: JsonStore,
}

impl Session {
    pub fn open(root: PathBuf, config: &CacheConfig) -> anyhow::Result<Self> {
        let symbol_store = JsonStore::new(root.join(SYMBOLS_DIR));
        let symbols = SymbolTable::load(&symbol_store).context("Failed to load symbol table")?;
        let cache = Cache::open_with_config(root, config)?;
        debug!("{} symbols loaded", symbols.len());

        Ok(Self {
            cache,
            symbols,
            symbol_store,
        })
    }

    /// Save symbols and dispose the cache
    pub fn close(self) -> anyhow::Result<()> {
        let Session {
            cache,
            mut symbols,
            symbol_store,
        } = self;

        let saved = symbols.save(&symbol_store);
        cache.dispose()?;
        saved.context("Failed to save symbol table")?;
        Ok(())
    }

    fn class_id(&self, name: &str) -> anyhow::Result<SymbolId> {
        self.symbols
            .id(name)
            .ok_or_else(|| anyhow!("Unknown class: {}", name))
    }

    pub fn list_classes(&self) -> anyhow::Result<()> {
        let mut names: Vec<String> = self
            .cache
            .all_class_names()?
            .into_iter()
            .map(|id| self.symbols.resolve(id))
            .collect();
        names.sort();

        for name in &names {
            println!("{}", name);
        }
        println!("\n{} classes", names.len());
        Ok(())
    }

    pub fn show(&self, class: &str) -> anyhow::Result<()> {
        let qname = self.class_id(class)?;
        let info = self
            .cache
            .get_class(qname)?
            .ok_or_else(|| anyhow!("Class not cached: {}", class))?;
        let remote = self.cache.is_remote(qname)?;
        let subclasses = self.cache.subclasses(qname)?;

        print!("{}", render_class(&info, remote, &subclasses, &self.symbols));
        Ok(())
    }

    pub fn back_deps(&self, class: &str) -> anyhow::Result<()> {
        let qname = self.class_id(class)?;
        let deps = self.cache.back_dependencies(qname)?;
        if deps.is_empty() {
            println!("No classes depend on {}", class);
            return Ok(());
        }

        print!("{}", render_dependencies(&deps, &self.symbols));
        Ok(())
    }

    pub fn import(&mut self, files: &[PathBuf]) -> anyhow::Result<()> {
        for file in files {
            let qname = self.import_file(file)?;
            self.cache.index_references(qname)?;
            println!("✓ {}", self.symbols.resolve(qname));
        }
        info!("Imported {} classes", files.len());
        Ok(())
    }

    fn import_file(&mut self, file: &Path) -> anyhow::Result<SymbolId> {
        let bytes =
            std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        let parsed = ParsedClass::from_json(&bytes)
            .with_context(|| format!("Failed to parse {}", file.display()))?;
        Ok(self.cache.import_class_info(&parsed, &mut self.symbols)?)
    }

    pub fn remove(&self, class: &str) -> anyhow::Result<()> {
        let qname = self.class_id(class)?;
        self.cache.remove_class(qname)?;
        println!("Removed {}", class);
        Ok(())
    }

    pub fn stats(&self) -> anyhow::Result<()> {
        let stats = self.cache.stats()?;
        print!("{}", render_stats(&stats, self.symbols.len()));
        Ok(())
    }

    pub fn wipe(self) -> anyhow::Result<()> {
        let root = self.cache.root().to_path_buf();
        let Session {
            cache,
            mut symbols,
            symbol_store,
        } = self;

        symbols.save(&symbol_store)?;
        cache.wipe()?;
        println!("Wiped {}", root.display());
        Ok(())
    }
}

fn render_class(
    info: &ClassInfo,
    remote: bool,
    subclasses: &[SymbolId],
    symbols: &SymbolTable,
) -> String {
    let mut out = String::new();
    let names = |ids: &[SymbolId]| {
        ids.iter()
            .map(|&id| symbols.resolve(id))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let _ = writeln!(out, "class {}", symbols.resolve(info.qualified_name));
    if info.super_qualified_name != UNKNOWN {
        let _ = writeln!(out, "  super:       {}", symbols.resolve(info.super_qualified_name));
    }
    if !info.super_interfaces.is_empty() {
        let _ = writeln!(out, "  interfaces:  {}", names(&info.super_interfaces));
    }
    let _ = writeln!(out, "  flags:       0x{:04x}", info.flags);
    if !info.source_file_name.is_empty() {
        let _ = writeln!(out, "  source:      {}", info.source_file_name);
    }
    if !info.path.is_empty() {
        let _ = writeln!(out, "  path:        {}", info.path);
    }
    let _ = writeln!(out, "  remote:      {}", remote);
    if !subclasses.is_empty() {
        let _ = writeln!(out, "  subclasses:  {}", names(subclasses));
    }

    let _ = writeln!(out, "  fields ({}):", info.fields.len());
    for field in &info.fields {
        let _ = write!(
            out,
            "    {} {}",
            symbols.resolve(field.name),
            symbols.resolve(field.descriptor)
        );
        if let Some(value) = &field.constant_value {
            let _ = write!(out, " = {}", render_constant(value, symbols));
        }
        out.push('\n');
    }
    let _ = writeln!(out, "  methods ({}):", info.methods.len());
    for method in &info.methods {
        let _ = writeln!(
            out,
            "    {}{}{}",
            symbols.resolve(method.name),
            symbols.resolve(method.descriptor),
            if method.is_constructor(symbols) { "  (constructor)" } else { "" }
        );
    }
    out
}

/// Source-like text of a constant; floats keep NaN and signed zero visible
fn render_constant(value: &ConstantValue, symbols: &SymbolTable) -> String {
    match value {
        ConstantValue::Int(v) => v.to_string(),
        ConstantValue::Long(v) => format!("{}L", v),
        ConstantValue::Float { .. } => format!("{:?}f", value.as_f32().unwrap_or_default()),
        ConstantValue::Double { .. } => format!("{:?}", value.as_f64().unwrap_or_default()),
        ConstantValue::Boolean(v) => v.to_string(),
        ConstantValue::Char(v) => format!("{:?}", v),
        ConstantValue::String(v) => format!("{:?}", v),
        ConstantValue::Class(id) => format!("{}.class", symbols.resolve(*id)),
        ConstantValue::Enum {
            type_name,
            constant,
        } => format!("{}.{}", symbols.resolve(*type_name), symbols.resolve(*constant)),
        ConstantValue::Annotation(annotation) => {
            format!("@{}", symbols.resolve(annotation.type_name))
        }
        ConstantValue::Array(items) => {
            let items: Vec<_> = items.iter().map(|v| render_constant(v, symbols)).collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn render_stats(stats: &CacheStats, symbols: usize) -> String {
    let cache = &stats.class_cache;
    let mut out = String::new();
    let _ = writeln!(out, "classes:    {}", stats.classes);
    let _ = writeln!(out, "symbols:    {}", symbols);
    let _ = writeln!(out, "in memory:  {}/{}", cache.entries, cache.capacity);
    let _ = writeln!(
        out,
        "lookups:    {} hits, {} misses ({:.1}% hit ratio)",
        cache.hits,
        cache.misses,
        cache.hit_ratio() * 100.0
    );
    let _ = writeln!(out, "evictions:  {}", cache.evictions);
    out
}

fn render_dependencies(deps: &[Dependency], symbols: &SymbolTable) -> String {
    let mut out = String::new();
    for dep in deps {
        let _ = writeln!(out, "{}", symbols.resolve(dep.class_qname));
        for member in &dep.members {
            let (kind, suffix) = match member {
                MemberInfo::Field(_) => ("field", String::new()),
                MemberInfo::Method(method) => ("method", symbols.resolve(method.descriptor)),
            };
            let _ = writeln!(
                out,
                "  {:<6} {}{}",
                kind,
                symbols.resolve(member.name()),
                suffix
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use depcache_core::{FieldInfo, MethodInfo};
    use depcache_foundation::LruCacheStats;
    use tempfile::TempDir;

    #[test]
    fn test_render_class() {
        let mut symbols = SymbolTable::new();
        let a = symbols.intern("p/A").expect("intern");
        let base = symbols.intern("p/Base").expect("intern");
        let f = symbols.intern("f").expect("intern");
        let int = symbols.intern("I").expect("intern");

        let mut info = ClassInfo::new(a, 0x21);
        info.super_qualified_name = base;
        info.fields.push(FieldInfo::new(f, int, 0));

        let text = render_class(&info, true, &[], &symbols);
        assert!(text.starts_with("class p/A\n"));
        assert!(text.contains("super:       p/Base"));
        assert!(text.contains("flags:       0x0021"));
        assert!(text.contains("remote:      true"));
        assert!(text.contains("    f I"));
        assert!(!text.contains("interfaces"));
    }

    #[test]
    fn test_render_constants_and_constructors() {
        let mut symbols = SymbolTable::new();
        let a = symbols.intern("p/A").expect("intern");
        let nan = symbols.intern("NAN").expect("intern");
        let zero = symbols.intern("ZERO").expect("intern");
        let double = symbols.intern("D").expect("intern");
        let init = symbols.intern("<init>").expect("intern");
        let void = symbols.intern("()V").expect("intern");

        let mut info = ClassInfo::new(a, 0);
        let mut field = FieldInfo::new(nan, double, 0x18);
        field.constant_value = Some(ConstantValue::double(f64::NAN));
        info.fields.push(field);
        let mut field = FieldInfo::new(zero, double, 0x18);
        field.constant_value = Some(ConstantValue::double(-0.0));
        info.fields.push(field);
        info.methods.push(MethodInfo::new(init, void, 0x1));

        let text = render_class(&info, false, &[], &symbols);
        assert!(text.contains("    NAN D = NaN\n"));
        assert!(text.contains("    ZERO D = -0.0\n"));
        assert!(text.contains("    <init>()V  (constructor)\n"));
    }

    #[test]
    fn test_render_stats() {
        let stats = CacheStats {
            classes: 3,
            class_cache: LruCacheStats {
                entries: 2,
                capacity: 1024,
                hits: 3,
                misses: 1,
                evictions: 0,
            },
        };

        let text = render_stats(&stats, 10);
        assert!(text.contains("classes:    3\n"));
        assert!(text.contains("in memory:  2/1024\n"));
        assert!(text.contains("3 hits, 1 misses (75.0% hit ratio)"));
    }

    #[test]
    fn test_render_dependencies() {
        let mut symbols = SymbolTable::new();
        let b = symbols.intern("p/B").expect("intern");
        let m = symbols.intern("m").expect("intern");
        let desc = symbols.intern("()V").expect("intern");

        let mut dep = Dependency::new(b);
        dep.add_member(MethodInfo::new(m, desc, 0));

        let text = render_dependencies(&[dep], &symbols);
        assert_eq!(text, "p/B\n  method m()V\n");
    }

    #[test]
    fn test_session_import_and_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("cache");
        let doc = dir.path().join("A.json");
        std::fs::write(
            &doc,
            r#"{"name": "p/A", "references": [{"kind": "class", "class": "p/B"}]}"#,
        )
        .expect("write");

        let config = CacheConfig::default();
        let mut session = Session::open(root.clone(), &config).expect("open");
        session.import(&[doc]).expect("import");
        session.close().expect("close");

        let session = Session::open(root.clone(), &config).expect("reopen");
        let a = session.class_id("p/A").expect("p/A");
        let b = session.class_id("p/B").expect("p/B");
        assert!(session.cache.is_class_referenced(b, a).expect("query"));
        assert!(session.class_id("p/Missing").is_err());
        session.stats().expect("stats");

        session.wipe().expect("wipe");
        assert!(root.join(SYMBOLS_DIR).join(depcache_foundation::SYMBOLS_FILE).exists());
    }
}
