//! 인증 세션 관리.
//!
//! 상태 전이: `Initializing → {Authenticated, Unauthenticated}`,
//! `Authenticated --logout--> Unauthenticated`,
//! `Unauthenticated --login/register--> Authenticated`.
//!
//! 인증 여부는 항상 "사용자 존재 ∧ 저장된 토큰 존재"로 계산한다.
//! 토큰 쓰기는 이 모듈만 하고, 존재 확인은 API 클라이언트가 한다.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stride_core::error::CoreError;
use stride_core::models::api::{ApiResponse, AuthPayload, LoginRequest, RegisterRequest};
use stride_core::models::session::SessionSnapshot;
use stride_core::models::user::UserProfile;
use stride_core::ports::api_client::RemoteApiClient;
use stride_core::ports::storage::{CredentialStore, LEGACY_TOKEN_KEY, TOKEN_KEY};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct SessionState {
    current_user: Option<UserProfile>,
    is_initializing: bool,
    /// login/register/logout마다 증가. 그 사이에 시작된 조회 결과는 버린다.
    epoch: u64,
}

/// 세션 관리자
pub struct SessionManager {
    api: Arc<dyn RemoteApiClient>,
    credentials: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    init_started: AtomicBool,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    /// 새 세션 관리자 생성 (`Initializing` 상태)
    pub fn new(api: Arc<dyn RemoteApiClient>, credentials: Arc<dyn CredentialStore>) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::initializing());
        Self {
            api,
            credentials,
            state: RwLock::new(SessionState {
                current_user: None,
                is_initializing: true,
                epoch: 0,
            }),
            init_started: AtomicBool::new(false),
            snapshot_tx,
        }
    }

    /// 저장된 자격증명으로 세션 복원
    ///
    /// 프로필 조회에 실패하면 자격증명을 무효로 보고 삭제한다.
    /// 어떤 경로든 마지막 단계에서 `is_initializing`이 false가 된다.
    pub async fn initialize(&self) {
        if self.init_started.swap(true, Ordering::SeqCst) {
            warn!("세션 초기화가 이미 실행됨, 무시");
            return;
        }

        let epoch = self.state.read().epoch;
        let had_credential = self.api.is_authenticated();

        let user = if had_credential {
            debug!("저장된 자격증명 발견, 프로필 확인 중");
            match self.api.get_user_profile().await {
                Ok(resp) => {
                    let message = resp.message.clone();
                    let user = resp.into_success();
                    if user.is_none() {
                        warn!(
                            "세션 확인 실패: {}",
                            message.as_deref().unwrap_or("비성공 응답")
                        );
                    }
                    user
                }
                Err(e) => {
                    warn!("세션 확인 실패: {e}");
                    None
                }
            }
        } else {
            None
        };

        let superseded = self.state.read().epoch != epoch;
        if superseded {
            debug!("초기화 중 세션이 변경됨, 확인 결과 폐기");
        } else if had_credential && user.is_none() {
            self.clear_credentials();
        }

        {
            let mut state = self.state.write();
            if !superseded {
                state.current_user = user;
            }
            state.is_initializing = false;
        }

        let snapshot = self.publish();
        info!(
            "세션 초기화 완료: authenticated={}",
            snapshot.is_authenticated
        );
    }

    /// 이메일/비밀번호 로그인
    ///
    /// 실패 시 세션은 바뀌지 않고 에러가 그대로 반환된다.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, CoreError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        self.establish(response, "로그인")
    }

    /// 회원가입 후 바로 세션 수립
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, CoreError> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.register(&request).await?;
        self.establish(response, "회원가입")
    }

    /// 로그아웃 (동기, 항상 성공)
    pub fn logout(&self) {
        self.clear_credentials();
        {
            let mut state = self.state.write();
            state.current_user = None;
            state.epoch += 1;
        }
        self.publish();
        info!("로그아웃 완료");
    }

    /// 프로필 재조회
    ///
    /// 실패해도 기존 사용자 정보를 유지한다.
    pub async fn refresh_user(&self) {
        if !self.api.is_authenticated() {
            debug!("자격증명 없음, 프로필 재조회 생략");
            return;
        }

        let epoch = self.state.read().epoch;
        let user = match self.api.get_user_profile().await {
            Ok(resp) => {
                let message = resp.message.clone();
                match resp.into_success() {
                    Some(user) => user,
                    None => {
                        warn!(
                            "프로필 재조회 실패: {}",
                            message.as_deref().unwrap_or("비성공 응답")
                        );
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("프로필 재조회 실패: {e}");
                return;
            }
        };

        {
            let mut state = self.state.write();
            if state.epoch != epoch {
                debug!("재조회 중 세션이 변경됨, 결과 폐기");
                return;
            }
            state.current_user = Some(user);
        }
        self.publish();
        debug!("프로필 재조회 완료");
    }

    /// 인증 여부 (사용자 존재 ∧ 저장된 토큰 존재)
    pub fn is_authenticated(&self) -> bool {
        self.state.read().current_user.is_some() && self.api.is_authenticated()
    }

    /// 최초 인증 확인 진행 중 여부
    pub fn is_initializing(&self) -> bool {
        self.state.read().is_initializing
    }

    /// 현재 사용자 (복제본)
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.read().current_user.clone()
    }

    /// 현재 상태 스냅샷
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            current_user: state.current_user.clone(),
            is_authenticated: state.current_user.is_some() && self.api.is_authenticated(),
            is_initializing: state.is_initializing,
        }
    }

    /// 상태 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// 초기화가 끝날 때까지 대기
    pub async fn wait_initialized(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|s| !s.is_initializing)
            .await
            .map(|snapshot| snapshot.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    /// 성공 응답이면 토큰 저장 후 사용자 설정
    fn establish(
        &self,
        response: ApiResponse<AuthPayload>,
        action: &str,
    ) -> Result<UserProfile, CoreError> {
        let message = response.message.clone();
        let payload = response
            .into_success()
            .filter(|p| !p.token.is_empty())
            .ok_or_else(|| {
                CoreError::Auth(message.unwrap_or_else(|| format!("{action} 실패")))
            })?;

        self.credentials.set(TOKEN_KEY, &payload.token)?;

        {
            let mut state = self.state.write();
            state.current_user = Some(payload.user.clone());
            state.is_initializing = false;
            state.epoch += 1;
        }
        self.publish();

        info!("{action} 성공: user_id={}", payload.user.id);
        Ok(payload.user)
    }

    /// 두 토큰 키와 클라이언트 자격증명 삭제
    fn clear_credentials(&self) {
        for key in [TOKEN_KEY, LEGACY_TOKEN_KEY] {
            if let Err(e) = self.credentials.remove(key) {
                warn!("자격증명 삭제 실패 ({key}): {e}");
            }
        }
        self.api.logout();
    }

    fn publish(&self) -> SessionSnapshot {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{user, MockApi};
    use stride_storage::memory::MemoryCredentialStore;

    fn manager_with(api: MockApi) -> (SessionManager, Arc<MockApi>, Arc<MemoryCredentialStore>) {
        let api = Arc::new(api);
        let store = api.credentials.clone();
        let manager = SessionManager::new(api.clone(), store.clone());
        (manager, api, store)
    }

    #[tokio::test]
    async fn starts_initializing() {
        let (manager, _, _) = manager_with(MockApi::new());
        assert!(manager.is_initializing());
        assert!(!manager.is_authenticated());
        assert_eq!(manager.snapshot(), SessionSnapshot::initializing());
    }

    #[tokio::test]
    async fn login_success_persists_token() {
        let (manager, api, store) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));

        let logged_in = manager.login("a@b.com", "pw").await.unwrap();

        assert_eq!(logged_in.id, 1);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
        assert_eq!(store.get(LEGACY_TOKEN_KEY).unwrap(), None);
        assert_eq!(manager.current_user().map(|u| u.id), Some(1));
        assert!(manager.is_authenticated());
        assert!(!manager.is_initializing());
    }

    #[tokio::test]
    async fn register_success_authenticates() {
        let (manager, api, store) = manager_with(MockApi::new());
        api.push_register(Ok(ApiResponse::success(AuthPayload {
            token: "R1".to_string(),
            user: user(5, "New", "new@b.com"),
        })));

        let registered = manager.register("New", "new@b.com", "pw").await.unwrap();
        assert_eq!(registered.email, "new@b.com");
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("R1"));
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn login_failure_response_is_propagated() {
        let (manager, api, store) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::failure("Invalid credentials")));

        let err = manager.login("a@b.com", "nope").await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(ref m) if m == "Invalid credentials"));
        assert!(store.is_empty());
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn login_success_without_token_is_failure() {
        let (manager, api, store) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: String::new(),
            user: user(1, "A", "a@b.com"),
        })));

        assert!(manager.login("a@b.com", "pw").await.is_err());
        assert!(store.is_empty());
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn login_network_error_leaves_session_unchanged() {
        let (manager, api, store) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));
        manager.login("a@b.com", "pw").await.unwrap();

        api.push_login(Err(CoreError::Network("connection refused".to_string())));
        let err = manager.login("other@b.com", "pw").await.unwrap_err();

        assert!(matches!(err, CoreError::Network(_)));
        assert_eq!(manager.current_user().map(|u| u.id), Some(1));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn logout_clears_both_keys() {
        let (manager, api, store) = manager_with(MockApi::new());
        store.set(LEGACY_TOKEN_KEY, "old").unwrap();
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));
        manager.login("a@b.com", "pw").await.unwrap();

        manager.logout();

        assert!(!manager.is_authenticated());
        assert!(manager.current_user().is_none());
        assert!(store.is_empty());
        assert_eq!(api.logout_calls(), 1);
    }

    #[tokio::test]
    async fn logout_when_unauthenticated_is_noop_success() {
        let (manager, api, store) = manager_with(MockApi::new());
        manager.logout();
        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
        assert_eq!(api.logout_calls(), 1);
    }

    #[tokio::test]
    async fn initialize_without_credential() {
        let (manager, api, _) = manager_with(MockApi::new());

        manager.initialize().await;

        assert!(!manager.is_initializing());
        assert!(!manager.is_authenticated());
        assert_eq!(api.profile_calls(), 0);
    }

    #[tokio::test]
    async fn initialize_with_valid_credential() {
        let (manager, api, store) = manager_with(MockApi::new());
        store.set(TOKEN_KEY, "T1").unwrap();
        api.push_profile(Ok(ApiResponse::success(user(9, "Kim", "kim@b.com"))));

        manager.initialize().await;

        assert!(!manager.is_initializing());
        assert!(manager.is_authenticated());
        assert_eq!(manager.current_user().map(|u| u.id), Some(9));
    }

    #[tokio::test]
    async fn initialize_with_invalid_credential_logs_out() {
        let (manager, api, store) = manager_with(MockApi::new());
        store.set(TOKEN_KEY, "expired").unwrap();
        store.set(LEGACY_TOKEN_KEY, "expired").unwrap();
        api.push_profile(Err(CoreError::Auth("token expired".to_string())));

        manager.initialize().await;

        assert!(!manager.is_initializing());
        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
        assert_eq!(api.logout_calls(), 1);
    }

    #[tokio::test]
    async fn initialize_with_failure_response_logs_out() {
        let (manager, api, store) = manager_with(MockApi::new());
        store.set(TOKEN_KEY, "T1").unwrap();
        api.push_profile(Ok(ApiResponse::failure("user deleted")));

        manager.initialize().await;

        assert!(!manager.is_initializing());
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn initialize_runs_once() {
        let (manager, api, store) = manager_with(MockApi::new());
        store.set(TOKEN_KEY, "T1").unwrap();
        api.push_profile(Ok(ApiResponse::success(user(1, "A", "a@b.com"))));

        manager.initialize().await;
        manager.initialize().await;

        assert_eq!(api.profile_calls(), 1);
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn wait_initialized_resolves_after_flip() {
        let (manager, _, _) = manager_with(MockApi::new());
        let manager = Arc::new(manager);

        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.wait_initialized().await })
        };
        manager.initialize().await;

        let snapshot = waiter.await.unwrap();
        assert!(!snapshot.is_initializing);
        assert!(!snapshot.is_authenticated);
    }

    #[tokio::test]
    async fn refresh_user_replaces_profile() {
        let (manager, api, _) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));
        manager.login("a@b.com", "pw").await.unwrap();

        api.push_profile(Ok(ApiResponse::success(user(1, "A Renamed", "a@b.com"))));
        manager.refresh_user().await;

        assert_eq!(
            manager.current_user().map(|u| u.name),
            Some("A Renamed".to_string())
        );
    }

    #[tokio::test]
    async fn refresh_user_failure_keeps_stale_profile() {
        let (manager, api, _) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));
        manager.login("a@b.com", "pw").await.unwrap();

        api.push_profile(Err(CoreError::Network("timeout".to_string())));
        manager.refresh_user().await;

        assert_eq!(manager.current_user().map(|u| u.name), Some("A".to_string()));
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_user_without_credential_is_noop() {
        let (manager, api, _) = manager_with(MockApi::new());
        manager.refresh_user().await;
        assert_eq!(api.profile_calls(), 0);
    }

    #[tokio::test]
    async fn user_without_token_is_not_authenticated() {
        let (manager, api, store) = manager_with(MockApi::new());
        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));
        manager.login("a@b.com", "pw").await.unwrap();

        store.remove(TOKEN_KEY).unwrap();

        assert!(manager.current_user().is_some());
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let (manager, api, _) = manager_with(MockApi::new());
        let mut rx = manager.subscribe();

        api.push_login(Ok(ApiResponse::success(AuthPayload {
            token: "T1".to_string(),
            user: user(1, "A", "a@b.com"),
        })));
        manager.login("a@b.com", "pw").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated);

        manager.logout();
        assert!(!rx.borrow_and_update().is_authenticated);
    }
}
