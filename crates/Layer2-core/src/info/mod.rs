//! Class metadata records
//!
//! - [`ClassInfo`]: 클래스 단위 레코드 (class metadata store 값)
//! - [`FieldInfo`] / [`MethodInfo`]: 클래스가 소유하는 멤버
//! - [`AnnotationInfo`] / [`ConstantValue`]: 어노테이션과 상수 값

mod annotation;
mod class;
mod member;

pub use annotation::{AnnotationInfo, AnnotationMember, ConstantValue};
pub use class::ClassInfo;
pub use member::{method_signature, FieldInfo, MemberInfo, MethodInfo, CONSTRUCTOR_NAME};
