//! 원격 API 요청/응답 모델.

use serde::{Deserialize, Serialize};

use crate::models::user::UserProfile;

/// 응답 상태 구분자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    /// 알 수 없는 구분자
    #[serde(other)]
    Other,
}

/// 공통 응답 봉투
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 상태 구분자
    pub status: ResponseStatus,
    /// 성공 시 페이로드
    pub data: Option<T>,
    /// 서버 메시지 (주로 실패 사유)
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 성공 응답 생성
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            message: None,
        }
    }

    /// 실패 응답 생성
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            message: Some(message.into()),
        }
    }

    /// 성공 상태이고 페이로드가 있으면 반환
    pub fn into_success(self) -> Option<T> {
        match self.status {
            ResponseStatus::Success => self.data,
            _ => None,
        }
    }
}

/// 로그인/회원가입 성공 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// 발급된 세션 토큰
    pub token: String,
    /// 인증된 사용자
    pub user: UserProfile,
}

/// 로그인 요청
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 회원가입 요청
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_maps_to_other() {
        let json = r#"{"status":"pending","message":"queued"}"#;
        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, ResponseStatus::Other);
        assert!(resp.into_success().is_none());
    }

    #[test]
    fn success_without_data_is_not_success() {
        let json = r#"{"status":"success"}"#;
        let resp: ApiResponse<AuthPayload> = serde_json::from_str(json).unwrap();
        assert!(resp.into_success().is_none());
    }

    #[test]
    fn auth_payload_parses() {
        let json = r#"{
            "status": "success",
            "data": {"token": "T1", "user": {"id": 1, "name": "A", "email": "a@b.com"}}
        }"#;
        let resp: ApiResponse<AuthPayload> = serde_json::from_str(json).unwrap();
        let payload = resp.into_success().unwrap();
        assert_eq!(payload.token, "T1");
        assert_eq!(payload.user.id, 1);
    }
}
