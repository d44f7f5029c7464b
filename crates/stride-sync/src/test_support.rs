//! 테스트용 `RemoteApiClient` 목.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stride_core::error::CoreError;
use stride_core::models::api::{ApiResponse, AuthPayload, LoginRequest, RegisterRequest};
use stride_core::models::dashboard::DashboardData;
use stride_core::models::user::UserProfile;
use stride_core::ports::api_client::RemoteApiClient;
use stride_core::ports::storage::{CredentialStore, LEGACY_TOKEN_KEY, TOKEN_KEY};
use stride_storage::memory::MemoryCredentialStore;

type Reply<T> = Result<ApiResponse<T>, CoreError>;

pub(crate) fn user(id: i64, name: &str, email: &str) -> UserProfile {
    UserProfile {
        id,
        name: name.to_string(),
        email: email.to_string(),
        profile_image_url: None,
        created_at: None,
    }
}

pub(crate) fn dashboard(value: serde_json::Value) -> DashboardData {
    DashboardData(value)
}

/// 응답을 큐로 미리 지정하는 목 API
///
/// 대시보드 큐가 비면 호출 순번을 담은 성공 응답을 돌려준다.
pub(crate) struct MockApi {
    pub credentials: Arc<MemoryCredentialStore>,
    login: Mutex<VecDeque<Reply<AuthPayload>>>,
    register: Mutex<VecDeque<Reply<AuthPayload>>>,
    profile: Mutex<VecDeque<Reply<UserProfile>>>,
    dashboard: Mutex<VecDeque<(Duration, Reply<DashboardData>)>>,
    profile_calls: AtomicUsize,
    dashboard_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(MemoryCredentialStore::new()),
            login: Mutex::new(VecDeque::new()),
            register: Mutex::new(VecDeque::new()),
            profile: Mutex::new(VecDeque::new()),
            dashboard: Mutex::new(VecDeque::new()),
            profile_calls: AtomicUsize::new(0),
            dashboard_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub fn push_login(&self, reply: Reply<AuthPayload>) {
        self.login.lock().push_back(reply);
    }

    pub fn push_register(&self, reply: Reply<AuthPayload>) {
        self.register.lock().push_back(reply);
    }

    pub fn push_profile(&self, reply: Reply<UserProfile>) {
        self.profile.lock().push_back(reply);
    }

    pub fn push_dashboard(&self, reply: Reply<DashboardData>) {
        self.push_dashboard_after(Duration::ZERO, reply);
    }

    /// `delay` 후에 응답하는 대시보드 결과 추가
    pub fn push_dashboard_after(&self, delay: Duration, reply: Reply<DashboardData>) {
        self.dashboard.lock().push_back((delay, reply));
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn dashboard_calls(&self) -> usize {
        self.dashboard_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteApiClient for MockApi {
    fn is_authenticated(&self) -> bool {
        [TOKEN_KEY, LEGACY_TOKEN_KEY]
            .iter()
            .any(|key| matches!(self.credentials.get(key), Ok(Some(_))))
    }

    async fn login(&self, _request: &LoginRequest) -> Reply<AuthPayload> {
        self.login
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Network("no scripted login".to_string())))
    }

    async fn register(&self, _request: &RegisterRequest) -> Reply<AuthPayload> {
        self.register
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Network("no scripted register".to_string())))
    }

    async fn get_user_profile(&self) -> Reply<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Network("no scripted profile".to_string())))
    }

    async fn get_dashboard_data(&self) -> Reply<DashboardData> {
        let call = self.dashboard_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let scripted = self.dashboard.lock().pop_front();
        match scripted {
            Some((delay, reply)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                reply
            }
            None => Ok(ApiResponse::success(dashboard(
                serde_json::json!({ "call": call }),
            ))),
        }
    }

    fn logout(&self) {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.credentials.remove(TOKEN_KEY);
    }
}
