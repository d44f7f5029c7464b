//! HTTP REST API 클라이언트.
//!
//! `RemoteApiClient` 포트 구현. 저장된 토큰으로 Bearer 인증 헤더를 주입한다.
//! 재시도는 하지 않는다. 실패는 호출자에게 그대로 돌려준다.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use stride_core::error::CoreError;
use stride_core::models::api::{ApiResponse, AuthPayload, LoginRequest, RegisterRequest};
use stride_core::models::dashboard::DashboardData;
use stride_core::models::user::UserProfile;
use stride_core::ports::api_client::RemoteApiClient;
use stride_core::ports::storage::{CredentialStore, LEGACY_TOKEN_KEY, TOKEN_KEY};
use tracing::{debug, warn};

/// REST API 클라이언트 — `RemoteApiClient` 포트 구현
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpApiClient {
    /// 새 HTTP API 클라이언트 생성
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// 기본 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 저장된 토큰 (`token` 우선, 없으면 이전 키 `authToken`)
    fn stored_token(&self) -> Option<String> {
        [TOKEN_KEY, LEGACY_TOKEN_KEY].iter().find_map(|key| {
            match self.credentials.get(key) {
                Ok(token) => token.filter(|t| !t.is_empty()),
                Err(e) => {
                    warn!("자격증명 조회 실패 ({key}): {e}");
                    None
                }
            }
        })
    }

    /// Authorization 헤더가 포함된 요청 빌더 반환
    fn authorized_request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, CoreError> {
        let token = self
            .stored_token()
            .ok_or_else(|| CoreError::Auth("인증되지 않음".to_string()))?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self.client.request(method, &url).bearer_auth(token))
    }

    /// 인증 없는 요청 빌더 반환
    fn public_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// 요청 전송 및 응답 봉투 파싱
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<ApiResponse<T>, CoreError> {
        let resp = request
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("{what} 요청 실패: {e}")))?;
        Self::parse_response(resp, what).await
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    ///
    /// 2xx가 아니어도 본문이 응답 봉투 형태면 실패 응답으로 돌려준다.
    async fn parse_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        what: &str,
    ) -> Result<ApiResponse<T>, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return resp
                .json::<ApiResponse<T>>()
                .await
                .map_err(|e| CoreError::Internal(format!("{what} 응답 파싱 실패: {e}")));
        }

        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });
        let envelope = serde_json::from_str::<ApiResponse<T>>(&text).ok();
        let message = envelope
            .as_ref()
            .and_then(|r| r.message.clone())
            .unwrap_or_else(|| text.clone());

        match status.as_u16() {
            401 => Err(CoreError::Auth(format!("인증 실패: {message}"))),
            404 => Err(CoreError::NotFound {
                resource_type: "API".to_string(),
                id: message,
            }),
            503 => Err(CoreError::ServiceUnavailable(message)),
            _ => match envelope {
                Some(failure) => {
                    debug!("{what} 실패 응답 ({status}): {message}");
                    Ok(failure)
                }
                None => Err(CoreError::Internal(format!(
                    "{what} API 에러 ({status}): {text}"
                ))),
            },
        }
    }
}

#[async_trait]
impl RemoteApiClient for HttpApiClient {
    fn is_authenticated(&self) -> bool {
        self.stored_token().is_some()
    }

    async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<AuthPayload>, CoreError> {
        debug!("로그인 요청: {}", request.email);
        let req = self
            .public_request(reqwest::Method::POST, "/api/auth/login")
            .json(request);
        self.send(req, "로그인").await
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<AuthPayload>, CoreError> {
        debug!("회원가입 요청: {}", request.email);
        let req = self
            .public_request(reqwest::Method::POST, "/api/auth/register")
            .json(request);
        self.send(req, "회원가입").await
    }

    async fn get_user_profile(&self) -> Result<ApiResponse<UserProfile>, CoreError> {
        let req = self.authorized_request(reqwest::Method::GET, "/api/users/profile")?;
        self.send(req, "프로필 조회").await
    }

    async fn get_dashboard_data(&self) -> Result<ApiResponse<DashboardData>, CoreError> {
        let req = self.authorized_request(reqwest::Method::GET, "/api/dashboard")?;
        self.send(req, "대시보드 조회").await
    }

    fn logout(&self) {
        if let Err(e) = self.credentials.remove(TOKEN_KEY) {
            warn!("클라이언트 자격증명 삭제 실패: {e}");
        }
        debug!("클라이언트 자격증명 삭제 완료");
    }
}
