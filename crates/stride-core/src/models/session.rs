//! 세션 상태 모델.

use serde::Serialize;

use crate::models::user::UserProfile;

/// 관찰 가능한 세션 상태 스냅샷
///
/// `is_initializing`이 true인 동안 `is_authenticated == false`는 확정값이 아니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// 현재 사용자
    pub current_user: Option<UserProfile>,
    /// 인증 여부 (사용자 존재 ∧ 저장된 토큰 존재)
    pub is_authenticated: bool,
    /// 최초 인증 확인 진행 중
    pub is_initializing: bool,
}

impl SessionSnapshot {
    /// 프로세스 시작 직후 상태
    pub fn initializing() -> Self {
        Self {
            current_user: None,
            is_authenticated: false,
            is_initializing: true,
        }
    }
}
