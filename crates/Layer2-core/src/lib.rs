//! depcache-core: Compiler dependency cache
//!
//! Layer2 - 클래스 메타데이터와 참조 인덱스
//!
//! # 주요 모듈
//!
//! - `cache`: [`Cache`] - 클래스 저장소 + 참조/서브클래스 인덱스, back dependency 집계
//! - `info`: 클래스/필드/메서드/어노테이션 레코드
//! - `key`: [`DependencyKey`] (class / field / method)
//! - `reader`: [`ClassFileReader`] - 파싱된 클래스 입력
//! - `dependency`: [`Dependency`] - referencer 단위 집계 결과
//! - `error`: [`CacheError`]
//!
//! # 사용 예시
//!
//! ```no_run
//! use depcache_core::{Cache, ParsedClass};
//! use depcache_foundation::SymbolTable;
//!
//! # fn main() -> depcache_core::CacheResult<()> {
//! let cache = Cache::open("/tmp/depcache", 1024)?;
//! let mut symbols = SymbolTable::new();
//!
//! // 컴파일된 클래스 등록 + 인덱싱
//! let qname = cache.import_class_info(&ParsedClass::new("p/A"), &mut symbols)?;
//! cache.index_references(qname)?;
//!
//! // 변경 시 재컴파일 대상
//! for dep in cache.back_dependencies(qname)? {
//!     println!("{} uses {} members", symbols.resolve(dep.class_qname), dep.members.len());
//! }
//!
//! cache.dispose()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod dependency;
pub mod error;
pub mod info;
pub mod key;
pub mod reader;

// Re-exports: Cache
pub use cache::{Cache, CacheStats};

// Re-exports: Records
pub use info::{
    method_signature, AnnotationInfo, AnnotationMember, ClassInfo, ConstantValue, FieldInfo,
    MemberInfo, MethodInfo, CONSTRUCTOR_NAME,
};

// Re-exports: Keys & Dependencies
pub use dependency::Dependency;
pub use key::DependencyKey;

// Re-exports: Reader
pub use reader::{
    ClassFileReader, ParsedAnnotation, ParsedAnnotationMember, ParsedClass, ParsedConstant,
    ParsedField, ParsedMethod, ParsedReference,
};

// Re-exports: Error
pub use error::{CacheError, CacheResult};
