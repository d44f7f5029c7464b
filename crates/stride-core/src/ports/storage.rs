//! 로컬 자격증명 저장소 포트.
//!
//! 구현: `stride-storage` crate (rusqlite, 인메모리)

use crate::error::CoreError;

/// 세션 토큰 키
pub const TOKEN_KEY: &str = "token";

/// 이전 버전 호환용 토큰 키 (로그아웃 시에만 삭제)
pub const LEGACY_TOKEN_KEY: &str = "authToken";

/// 문자열 키-값 영속 저장소
///
/// 쓰기는 세션 관리자가, 존재 확인은 API 클라이언트가 담당한다.
pub trait CredentialStore: Send + Sync {
    /// 값 조회
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// 값 저장 (기존 값 덮어쓰기)
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// 값 삭제 (없으면 no-op)
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}
