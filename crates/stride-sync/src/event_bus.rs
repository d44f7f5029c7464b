//! 내부 이벤트 버스.
//!
//! `tokio::broadcast` 기반 프로세스 내부 이벤트 라우팅.

use stride_core::models::event::{AppEvent, ProfileUpdate};
use tokio::sync::broadcast;
use tracing::debug;

/// 내부 이벤트 버스
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// 새 이벤트 버스 생성
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 이벤트 발행
    ///
    /// 구독자가 없으면 조용히 버려진다.
    pub fn publish(&self, event: AppEvent) {
        debug!("이벤트 발행: {event:?}");
        let _ = self.tx.send(event);
    }

    /// 프로필 변경 알림 발행
    pub fn publish_profile_updated(&self, update: ProfileUpdate) {
        self.publish(AppEvent::ProfileUpdated(update));
    }

    /// 구독자 생성
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// 현재 구독자 수
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
