//! Class file reader seam
//!
//! The cache never parses bytecode itself. A [`ClassFileReader`] hands it a
//! [`ParsedClass`]: the string-level shape of one compiled class, which
//! [`ClassInfo::from_parsed`] interns into a record.

use crate::error::{CacheError, CacheResult};
use crate::info::{
    method_signature, AnnotationInfo, AnnotationMember, ClassInfo, ConstantValue, FieldInfo,
    MethodInfo,
};
use crate::key::DependencyKey;
use depcache_foundation::{SymbolId, SymbolTable, UNKNOWN};
use serde::{Deserialize, Serialize};

/// Root class names; a super class equal to one of these is stored as `UNKNOWN`
const ROOT_CLASSES: [&str; 2] = ["java/lang/Object", "java.lang.Object"];

/// Source of parsed class metadata
pub trait ClassFileReader {
    fn read_class(&self) -> CacheResult<ParsedClass>;
}

/// Parsed class, before interning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedClass {
    pub name: String,
    #[serde(default)]
    pub super_name: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub flags: i32,
    #[serde(default)]
    pub generic_signature: Option<String>,
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub visible_annotations: Vec<ParsedAnnotation>,
    #[serde(default)]
    pub invisible_annotations: Vec<ParsedAnnotation>,
    #[serde(default)]
    pub fields: Vec<ParsedField>,
    #[serde(default)]
    pub methods: Vec<ParsedMethod>,
    #[serde(default)]
    pub references: Vec<ParsedReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedField {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub flags: i32,
    #[serde(default)]
    pub generic_signature: Option<String>,
    #[serde(default)]
    pub constant_value: Option<ParsedConstant>,
    #[serde(default)]
    pub visible_annotations: Vec<ParsedAnnotation>,
    #[serde(default)]
    pub invisible_annotations: Vec<ParsedAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMethod {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub flags: i32,
    #[serde(default)]
    pub generic_signature: Option<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub visible_annotations: Vec<ParsedAnnotation>,
    #[serde(default)]
    pub invisible_annotations: Vec<ParsedAnnotation>,
    #[serde(default)]
    pub visible_parameter_annotations: Vec<Vec<ParsedAnnotation>>,
    #[serde(default)]
    pub invisible_parameter_annotations: Vec<Vec<ParsedAnnotation>>,
    #[serde(default)]
    pub annotation_default: Option<ParsedConstant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAnnotation {
    pub type_name: String,
    #[serde(default)]
    pub members: Vec<ParsedAnnotationMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAnnotationMember {
    pub name: String,
    pub value: ParsedConstant,
}

/// String-level [`ConstantValue`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParsedConstant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
    Class(String),
    Enum {
        #[serde(rename = "typeName")]
        type_name: String,
        constant: String,
    },
    Annotation(Box<ParsedAnnotation>),
    Array(Vec<ParsedConstant>),
}

/// A declaration referenced from the class body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParsedReference {
    Class {
        class: String,
    },
    Field {
        class: String,
        name: String,
    },
    Method {
        class: String,
        name: String,
        descriptor: String,
    },
}

impl ParsedClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON document; malformed input is a format error
    pub fn from_json(bytes: &[u8]) -> CacheResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| CacheError::format(format!("Invalid class document: {}", e)))
    }
}

impl ClassFileReader for ParsedClass {
    fn read_class(&self) -> CacheResult<ParsedClass> {
        Ok(self.clone())
    }
}

impl ClassInfo {
    /// Read a class and intern all of its names into `symbols`
    pub fn from_reader(
        reader: &dyn ClassFileReader,
        symbols: &mut SymbolTable,
    ) -> CacheResult<ClassInfo> {
        ClassInfo::from_parsed(&reader.read_class()?, symbols)
    }

    pub fn from_parsed(parsed: &ParsedClass, symbols: &mut SymbolTable) -> CacheResult<ClassInfo> {
        let mut interner = Interner { symbols };

        let qualified_name = interner.required(&parsed.name, "class name")?;
        let mut class = ClassInfo::new(qualified_name, parsed.flags);

        class.super_qualified_name = match parsed.super_name.as_deref() {
            None | Some("") => UNKNOWN,
            Some(name) if ROOT_CLASSES.contains(&name) => UNKNOWN,
            Some(name) => interner.intern(name)?,
        };
        class.super_interfaces = parsed
            .interfaces
            .iter()
            .map(|name| interner.required(name, "interface name"))
            .collect::<CacheResult<_>>()?;
        class.generic_signature = interner.optional(parsed.generic_signature.as_deref())?;
        class.source_file_name = parsed.source_file.clone();
        class.path = parsed.path.clone();
        class.runtime_visible_annotations = interner.annotations(&parsed.visible_annotations)?;
        class.runtime_invisible_annotations =
            interner.annotations(&parsed.invisible_annotations)?;
        class.fields = parsed
            .fields
            .iter()
            .map(|field| interner.field(field))
            .collect::<CacheResult<_>>()?;
        class.methods = parsed
            .methods
            .iter()
            .map(|method| interner.method(method))
            .collect::<CacheResult<_>>()?;
        class.references = parsed
            .references
            .iter()
            .map(|reference| interner.reference(reference))
            .collect::<CacheResult<_>>()?;

        Ok(class)
    }
}

struct Interner<'a> {
    symbols: &'a mut SymbolTable,
}

impl Interner<'_> {
    fn intern(&mut self, symbol: &str) -> CacheResult<SymbolId> {
        Ok(self.symbols.intern(symbol)?)
    }

    fn required(&mut self, symbol: &str, what: &str) -> CacheResult<SymbolId> {
        if symbol.is_empty() {
            return Err(CacheError::format(format!("Empty {}", what)));
        }
        self.intern(symbol)
    }

    fn optional(&mut self, symbol: Option<&str>) -> CacheResult<SymbolId> {
        match symbol {
            None | Some("") => Ok(UNKNOWN),
            Some(symbol) => self.intern(symbol),
        }
    }

    fn method_descriptor(&mut self, name: &str, descriptor: &str) -> CacheResult<SymbolId> {
        if method_signature(name, descriptor).is_none() {
            return Err(CacheError::format(format!(
                "Method {} has invalid descriptor {:?}",
                name, descriptor
            )));
        }
        self.intern(descriptor)
    }

    fn field(&mut self, field: &ParsedField) -> CacheResult<FieldInfo> {
        let mut info = FieldInfo::new(
            self.required(&field.name, "field name")?,
            self.required(&field.descriptor, "field descriptor")?,
            field.flags,
        );
        info.generic_signature = self.optional(field.generic_signature.as_deref())?;
        info.constant_value = field
            .constant_value
            .as_ref()
            .map(|value| self.constant(value))
            .transpose()?;
        info.runtime_visible_annotations = self.annotations(&field.visible_annotations)?;
        info.runtime_invisible_annotations = self.annotations(&field.invisible_annotations)?;
        Ok(info)
    }

    fn method(&mut self, method: &ParsedMethod) -> CacheResult<MethodInfo> {
        let name = self.required(&method.name, "method name")?;
        let descriptor = self.method_descriptor(&method.name, &method.descriptor)?;
        let mut info = MethodInfo::new(name, descriptor, method.flags);
        info.generic_signature = self.optional(method.generic_signature.as_deref())?;
        info.thrown_exceptions = method
            .exceptions
            .iter()
            .map(|name| self.required(name, "exception name"))
            .collect::<CacheResult<_>>()?;
        info.runtime_visible_annotations = self.annotations(&method.visible_annotations)?;
        info.runtime_invisible_annotations = self.annotations(&method.invisible_annotations)?;
        info.runtime_visible_parameter_annotations = method
            .visible_parameter_annotations
            .iter()
            .map(|annotations| self.annotations(annotations))
            .collect::<CacheResult<_>>()?;
        info.runtime_invisible_parameter_annotations = method
            .invisible_parameter_annotations
            .iter()
            .map(|annotations| self.annotations(annotations))
            .collect::<CacheResult<_>>()?;
        info.annotation_default = method
            .annotation_default
            .as_ref()
            .map(|value| self.constant(value))
            .transpose()?;
        Ok(info)
    }

    fn annotations(&mut self, annotations: &[ParsedAnnotation]) -> CacheResult<Vec<AnnotationInfo>> {
        annotations
            .iter()
            .map(|annotation| self.annotation(annotation))
            .collect()
    }

    fn annotation(&mut self, annotation: &ParsedAnnotation) -> CacheResult<AnnotationInfo> {
        let type_name = self.required(&annotation.type_name, "annotation type")?;
        let members = annotation
            .members
            .iter()
            .map(|member| -> CacheResult<AnnotationMember> {
                Ok(AnnotationMember {
                    name: self.required(&member.name, "annotation member name")?,
                    value: self.constant(&member.value)?,
                })
            })
            .collect::<CacheResult<_>>()?;
        Ok(AnnotationInfo { type_name, members })
    }

    fn constant(&mut self, value: &ParsedConstant) -> CacheResult<ConstantValue> {
        Ok(match value {
            ParsedConstant::Int(v) => ConstantValue::Int(*v),
            ParsedConstant::Long(v) => ConstantValue::Long(*v),
            ParsedConstant::Float(v) => ConstantValue::float(*v),
            ParsedConstant::Double(v) => ConstantValue::double(*v),
            ParsedConstant::Boolean(v) => ConstantValue::Boolean(*v),
            ParsedConstant::Char(v) => ConstantValue::Char(*v),
            ParsedConstant::String(v) => ConstantValue::String(v.clone()),
            ParsedConstant::Class(name) => {
                ConstantValue::Class(self.required(name, "class literal")?)
            }
            ParsedConstant::Enum {
                type_name,
                constant,
            } => ConstantValue::Enum {
                type_name: self.required(type_name, "enum type")?,
                constant: self.required(constant, "enum constant")?,
            },
            ParsedConstant::Annotation(annotation) => {
                ConstantValue::Annotation(Box::new(self.annotation(annotation)?))
            }
            ParsedConstant::Array(values) => ConstantValue::Array(
                values
                    .iter()
                    .map(|value| self.constant(value))
                    .collect::<CacheResult<_>>()?,
            ),
        })
    }

    fn reference(&mut self, reference: &ParsedReference) -> CacheResult<DependencyKey> {
        Ok(match reference {
            ParsedReference::Class { class } => {
                DependencyKey::class(self.required(class, "referenced class")?)
            }
            ParsedReference::Field { class, name } => DependencyKey::field(
                self.required(class, "referenced class")?,
                self.required(name, "referenced field")?,
            ),
            ParsedReference::Method {
                class,
                name,
                descriptor,
            } => DependencyKey::method(
                self.required(class, "referenced class")?,
                self.required(name, "referenced method")?,
                self.method_descriptor(name, descriptor)?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed_a() -> ParsedClass {
        ParsedClass {
            name: "p/A".into(),
            super_name: Some("java/lang/Object".into()),
            interfaces: vec!["p/I".into()],
            flags: 0x21,
            source_file: "A.java".into(),
            fields: vec![ParsedField {
                name: "count".into(),
                descriptor: "I".into(),
                constant_value: Some(ParsedConstant::Int(3)),
                ..Default::default()
            }],
            methods: vec![ParsedMethod {
                name: "m".into(),
                descriptor: "()V".into(),
                exceptions: vec!["java/io/IOException".into()],
                ..Default::default()
            }],
            references: vec![ParsedReference::Method {
                class: "p/B".into(),
                name: "run".into(),
                descriptor: "(I)V".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_from_parsed_interns_names() {
        let mut symbols = SymbolTable::new();
        let info = ClassInfo::from_reader(&parsed_a(), &mut symbols).expect("import");

        assert_eq!(symbols.symbol(info.qualified_name), Some("p/A"));
        assert_eq!(info.super_qualified_name, UNKNOWN);
        assert_eq!(info.super_interfaces, vec![symbols.id("p/I").expect("p/I")]);
        assert_eq!(info.flags, 0x21);
        assert_eq!(info.generic_signature, UNKNOWN);
        assert_eq!(info.source_file_name, "A.java");
        assert_eq!(info.fields[0].constant_value, Some(ConstantValue::Int(3)));
        assert_eq!(info.methods[0].thrown_exceptions.len(), 1);
        assert_eq!(
            info.references,
            vec![DependencyKey::method(
                symbols.id("p/B").expect("p/B"),
                symbols.id("run").expect("run"),
                symbols.id("(I)V").expect("(I)V"),
            )]
        );
    }

    #[test]
    fn test_dotted_root_class_is_unknown() {
        let mut symbols = SymbolTable::new();
        let mut parsed = ParsedClass::new("p/A");
        parsed.super_name = Some("java.lang.Object".into());
        let info = ClassInfo::from_parsed(&parsed, &mut symbols).expect("import");
        assert_eq!(info.super_qualified_name, UNKNOWN);
        assert_eq!(symbols.id("java.lang.Object"), None);
    }

    #[test]
    fn test_empty_name_is_format_error() {
        let mut symbols = SymbolTable::new();
        let err = ClassInfo::from_parsed(&ParsedClass::default(), &mut symbols)
            .expect_err("empty name");
        assert!(matches!(err, CacheError::Format(_)));
        assert!(!err.requires_rebuild());
    }

    #[test]
    fn test_bad_method_descriptor_is_format_error() {
        let mut symbols = SymbolTable::new();
        let mut parsed = ParsedClass::new("p/A");
        parsed.methods.push(ParsedMethod {
            name: "m".into(),
            descriptor: "V".into(),
            ..Default::default()
        });
        let err = ClassInfo::from_parsed(&parsed, &mut symbols).expect_err("bad descriptor");
        assert!(err.to_string().contains("invalid descriptor"));
    }

    #[test]
    fn test_from_json() {
        let json = br#"{
            "name": "p/C",
            "superName": "p/A",
            "methods": [{"name": "<init>", "descriptor": "()V"}],
            "visibleAnnotations": [{
                "typeName": "p/Marker",
                "members": [{"name": "level", "value": {"type": "enum", "value": {"typeName": "p/Level", "constant": "HIGH"}}}]
            }],
            "references": [{"kind": "class", "class": "p/A"}]
        }"#;
        let parsed = ParsedClass::from_json(json).expect("parse");
        assert_eq!(parsed.super_name.as_deref(), Some("p/A"));
        assert_eq!(parsed.references.len(), 1);

        let mut symbols = SymbolTable::new();
        let info = ClassInfo::from_parsed(&parsed, &mut symbols).expect("import");
        let marker = &info.runtime_visible_annotations[0];
        assert_eq!(symbols.symbol(marker.type_name), Some("p/Marker"));
        assert!(matches!(
            marker.members[0].value,
            ConstantValue::Enum { .. }
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = ParsedClass::from_json(b"{not json").expect_err("garbage");
        assert!(matches!(err, CacheError::Format(_)));
    }
}
