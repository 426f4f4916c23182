//! Cache 에러 타입

use depcache_foundation::Error;
use thiserror::Error;

/// Result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Dependency cache 에러
#[derive(Error, Debug)]
pub enum CacheError {
    /// 저장소 손상 - 캐시를 버리고 wipe 후 전체 재빌드해야 함
    #[error("Dependency cache corrupted: {0}")]
    Corrupted(#[from] Error),

    /// 잘못된 클래스 메타데이터 (import 시점)
    #[error("Malformed class metadata: {0}")]
    Format(String),
}

impl CacheError {
    /// Format 에러 생성 헬퍼
    pub fn format(message: impl Into<String>) -> Self {
        CacheError::Format(message.into())
    }

    /// Whether the persisted cache can no longer be trusted
    pub fn requires_rebuild(&self) -> bool {
        matches!(self, CacheError::Corrupted(_))
    }
}
