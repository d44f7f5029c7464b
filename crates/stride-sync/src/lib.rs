//! # stride-sync
//!
//! 클라이언트 세션 및 대시보드 동기화 코어.
//!
//! - [`session`] — 인증 세션 상태 머신 ([`session::SessionManager`])
//! - [`dashboard`] — 대시보드 캐시와 갱신 수명주기 ([`dashboard::DashboardSyncController`])
//! - [`event_bus`] — 프로세스 내부 알림 채널
//!
//! 세션은 전역이 아니라 `Arc<SessionManager>`로 주입된다.

pub mod dashboard;
pub mod event_bus;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
