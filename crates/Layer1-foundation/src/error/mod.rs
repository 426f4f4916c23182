//! Error types for depcache
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// depcache foundation 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Storage 에러 생성 헬퍼
    pub fn storage(context: impl AsRef<str>, err: impl std::fmt::Display) -> Self {
        Error::Storage(format!("{}: {}", context.as_ref(), err))
    }

    pub(crate) fn lock_poisoned() -> Self {
        Error::Internal("Lock poisoned".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_helper() {
        let err = Error::storage("Failed to open classes", "disk full");
        assert_eq!(err.to_string(), "Storage error: Failed to open classes: disk full");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(Error::lock_poisoned().to_string(), "Internal error: Lock poisoned");
    }
}
