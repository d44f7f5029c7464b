//! 원격 API 클라이언트 포트.
//!
//! 구현: `stride-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::api::{ApiResponse, AuthPayload, LoginRequest, RegisterRequest};
use crate::models::dashboard::DashboardData;
use crate::models::user::UserProfile;

/// 원격 API 클라이언트
///
/// `Ok`는 서버가 응답했다는 뜻일 뿐이다. 성공 여부는 [`ApiResponse::status`]로 판단한다.
#[async_trait]
pub trait RemoteApiClient: Send + Sync {
    /// 로컬에 저장된 자격증명이 존재하는지 (네트워크 호출 없음)
    fn is_authenticated(&self) -> bool;

    /// 이메일/비밀번호 로그인
    async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<AuthPayload>, CoreError>;

    /// 회원가입
    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<AuthPayload>, CoreError>;

    /// 현재 사용자 프로필 조회
    async fn get_user_profile(&self) -> Result<ApiResponse<UserProfile>, CoreError>;

    /// 대시보드 데이터 조회
    async fn get_dashboard_data(&self) -> Result<ApiResponse<DashboardData>, CoreError>;

    /// 클라이언트 자체 자격증명 삭제
    fn logout(&self);
}
