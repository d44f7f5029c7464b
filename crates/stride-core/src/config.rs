//! 애플리케이션 설정 구조체.
//!
//! 서버 URL, 요청 타임아웃, 대시보드 동기화 지연, 자격증명 저장 경로 등
//! 런타임 설정을 정의한다. [`crate::config_manager::ConfigManager`]를 통해 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 서버 URL 환경변수 이름
pub const SERVER_URL_ENV: &str = "STRIDE_SERVER_URL";

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    pub server: ServerConfig,
    /// 대시보드 동기화 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 로컬 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

/// 서버 연결 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API 서버 기본 URL (예: "https://api.example.com")
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// 대시보드 동기화 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 프로필 변경 알림 후 재조회까지 지연 (밀리초)
    #[serde(default = "default_profile_refetch_delay_ms")]
    pub profile_refetch_delay_ms: u64,
    /// 이벤트 버스 버퍼 크기
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            profile_refetch_delay_ms: default_profile_refetch_delay_ms(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

/// 로컬 저장소 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 자격증명 DB 경로 (None이면 플랫폼 기본 데이터 디렉토리)
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            sync: SyncConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    /// `STRIDE_SERVER_URL` 환경변수가 있으면 서버 URL을 덮어쓴다
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url;
            }
        }
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server.base_url.trim().is_empty() {
            return Err(CoreError::Config("server.base_url이 비어 있습니다".to_string()));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(CoreError::Config(
                "server.request_timeout_ms는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.sync.event_bus_capacity == 0 {
            return Err(CoreError::Config(
                "sync.event_bus_capacity는 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// 프로필 변경 후 재조회 지연을 Duration으로 반환
    pub fn profile_refetch_delay(&self) -> Duration {
        Duration::from_millis(self.sync.profile_refetch_delay_ms)
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_profile_refetch_delay_ms() -> u64 {
    1_000
}

fn default_event_bus_capacity() -> usize {
    64
}
