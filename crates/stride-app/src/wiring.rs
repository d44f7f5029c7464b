//! DI 와이어링.
//!
//! 설정 → 어댑터 → 세션/대시보드 코어 순으로 조립한다.

use anyhow::{Context, Result};
use std::sync::Arc;
use stride_core::config::AppConfig;
use stride_core::config_manager::ConfigManager;
use stride_core::ports::api_client::RemoteApiClient;
use stride_core::ports::storage::CredentialStore;
use stride_network::http_client::HttpApiClient;
use stride_storage::sqlite::SqliteCredentialStore;
use stride_sync::dashboard::DashboardSyncController;
use stride_sync::event_bus::EventBus;
use stride_sync::session::SessionManager;
use tracing::info;

/// 조립된 애플리케이션 컨텍스트
pub struct AppContext {
    pub config: AppConfig,
    pub api: Arc<dyn RemoteApiClient>,
    pub session: Arc<SessionManager>,
    pub bus: EventBus,
}

impl AppContext {
    /// 설정으로부터 어댑터와 세션 관리자 생성
    pub fn build(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let credentials_path = ConfigManager::credentials_path(&config)?;
        let credentials: Arc<dyn CredentialStore> = Arc::new(
            SqliteCredentialStore::open(&credentials_path).with_context(|| {
                format!("자격증명 저장소 열기 실패: {}", credentials_path.display())
            })?,
        );

        let api: Arc<dyn RemoteApiClient> = Arc::new(HttpApiClient::new(
            &config.server.base_url,
            credentials.clone(),
            config.request_timeout(),
        )?);

        let session = Arc::new(SessionManager::new(api.clone(), credentials));
        let bus = EventBus::new(config.sync.event_bus_capacity);

        info!("서버: {}", config.server.base_url);
        Ok(Self {
            config,
            api,
            session,
            bus,
        })
    }

    /// 대시보드 동기화 컨트롤러 시작
    pub fn start_dashboard(&self) -> DashboardSyncController {
        DashboardSyncController::start(
            self.session.clone(),
            self.api.clone(),
            &self.bus,
            self.config.profile_refetch_delay(),
        )
    }
}
