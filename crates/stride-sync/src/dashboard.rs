//! 대시보드 동기화 컨트롤러.
//!
//! 대시보드 스냅샷을 소유하고 갱신 수명주기를 관리한다.
//!
//! - 생성 즉시 1회 조회, 이벤트 버스 구독
//! - `ProfileUpdated` 알림마다 고정 지연 후 독립적으로 재조회 (합치지 않음)
//! - 세션이 인증 상태로 바뀌면 즉시 재조회
//! - 조회 순서 정책: 전송 순서 기준 last-request-wins.
//!   늦게 보낸 요청의 결과가 이미 적용됐다면 먼저 보낸 요청의 결과는 버린다.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use stride_core::models::dashboard::{DashboardData, DashboardSnapshot};
use stride_core::models::event::AppEvent;
use stride_core::models::session::SessionSnapshot;
use stride_core::ports::api_client::RemoteApiClient;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::event_bus::EventBus;
use crate::session::SessionManager;

/// 서버가 메시지를 주지 않았을 때의 에러 문구
pub const FETCH_ERROR_FALLBACK: &str = "Failed to fetch dashboard data";

#[derive(Debug, Default)]
struct FetchState {
    snapshot: DashboardSnapshot,
    /// 마지막으로 발급한 요청 순번
    issued: u64,
    /// 마지막으로 스냅샷에 반영된 요청 순번
    applied: u64,
    in_flight: usize,
}

struct DashboardInner {
    session: Arc<SessionManager>,
    api: Arc<dyn RemoteApiClient>,
    state: Mutex<FetchState>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
}

/// 진행 중 요청 카운트 가드
///
/// 어떤 경로로 끝나든 (성공, 실패, 취소) drop 시 `is_loading`을 다시 계산한다.
struct InFlight<'a> {
    inner: &'a DashboardInner,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.snapshot.is_loading = state.in_flight > 0;
        self.inner.snapshot_tx.send_replace(state.snapshot.clone());
    }
}

impl DashboardInner {
    async fn fetch(&self) {
        if !self.session.is_authenticated() {
            debug!("미인증 상태, 대시보드 조회 생략");
            return;
        }

        let ticket = {
            let mut state = self.state.lock();
            state.issued += 1;
            state.in_flight += 1;
            state.snapshot.is_loading = true;
            state.snapshot.last_error = None;
            self.snapshot_tx.send_replace(state.snapshot.clone());
            state.issued
        };
        let _guard = InFlight { inner: self };

        debug!("대시보드 조회 시작: ticket={ticket}");
        let outcome: Result<DashboardData, String> = match self.api.get_dashboard_data().await {
            Ok(resp) => {
                let message = resp.message.clone();
                resp.into_success()
                    .ok_or_else(|| message.unwrap_or_else(|| FETCH_ERROR_FALLBACK.to_string()))
            }
            Err(e) => Err(e.to_string()),
        };

        let mut state = self.state.lock();
        if ticket < state.applied {
            debug!(
                "이전 요청 결과 폐기: ticket={ticket}, applied={}",
                state.applied
            );
            return;
        }
        state.applied = ticket;
        match outcome {
            Ok(data) => {
                state.snapshot.data = Some(data);
                state.snapshot.last_error = None;
                debug!("대시보드 조회 완료: ticket={ticket}");
            }
            Err(message) => {
                warn!("대시보드 조회 실패: {message}");
                state.snapshot.last_error = Some(message);
            }
        }
    }
}

/// 대시보드 동기화 컨트롤러
///
/// drop 시 구독을 해제하고 대기 중인 지연 조회를 취소한다.
/// 이미 전송된 요청은 취소하지 않는다.
pub struct DashboardSyncController {
    inner: Arc<DashboardInner>,
    shutdown_tx: watch::Sender<bool>,
    listener: JoinHandle<()>,
}

impl DashboardSyncController {
    /// 컨트롤러 시작
    ///
    /// 이벤트 버스를 먼저 구독한 뒤 초기 조회를 띄운다. tokio 런타임 안에서 호출해야 한다.
    pub fn start(
        session: Arc<SessionManager>,
        api: Arc<dyn RemoteApiClient>,
        bus: &EventBus,
        refetch_delay: Duration,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(DashboardSnapshot::default());
        // 초기 조회를 띄우기 전에 기준 인증 상태를 고정한다.
        // 이후의 로그인은 모두 리스너가 전환으로 본다.
        let mut session_rx = session.subscribe();
        let was_authenticated = session_rx.borrow_and_update().is_authenticated;
        let inner = Arc::new(DashboardInner {
            session,
            api,
            state: Mutex::new(FetchState::default()),
            snapshot_tx,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let events = bus.subscribe();

        let initial = inner.clone();
        tokio::spawn(async move { initial.fetch().await });

        let listener = tokio::spawn(listen(
            inner.clone(),
            events,
            session_rx,
            was_authenticated,
            shutdown_rx,
            refetch_delay,
        ));

        info!("대시보드 동기화 시작: 재조회 지연={}ms", refetch_delay.as_millis());
        Self {
            inner,
            shutdown_tx,
            listener,
        }
    }

    /// 대시보드 조회 (미인증이면 no-op)
    pub async fn fetch(&self) {
        self.inner.fetch().await;
    }

    /// 사용자 요청에 의한 즉시 갱신
    pub async fn refresh_data(&self) {
        self.inner.fetch().await;
    }

    /// 현재 스냅샷 (복제본)
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.inner.state.lock().snapshot.clone()
    }

    /// 스냅샷 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// 구독 해제 및 대기 중인 지연 조회 취소
    pub fn shutdown(&self) {
        if !*self.shutdown_tx.borrow() {
            debug!("대시보드 동기화 종료");
        }
        self.shutdown_tx.send_replace(true);
        self.listener.abort();
    }
}

impl Drop for DashboardSyncController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 알림/세션 변경 수신 루프
async fn listen(
    inner: Arc<DashboardInner>,
    mut events: broadcast::Receiver<AppEvent>,
    mut session_rx: watch::Receiver<SessionSnapshot>,
    mut was_authenticated: bool,
    shutdown_rx: watch::Receiver<bool>,
    refetch_delay: Duration,
) {
    let mut stop_rx = shutdown_rx.clone();
    let mut events_open = true;
    let mut session_open = true;

    loop {
        tokio::select! {
            _ = stopped(&mut stop_rx) => break,
            received = events.recv(), if events_open => match received {
                Ok(AppEvent::ProfileUpdated(update)) => {
                    debug!(
                        "프로필 변경 알림: coding_handles={}, physical_metrics={}",
                        update.coding_handles_updated, update.physical_metrics_updated
                    );
                    schedule_delayed_fetch(&inner, &shutdown_rx, refetch_delay);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("이벤트 {skipped}개 유실, 재조회 1회 예약");
                    schedule_delayed_fetch(&inner, &shutdown_rx, refetch_delay);
                }
                Err(RecvError::Closed) => {
                    debug!("이벤트 버스 종료");
                    events_open = false;
                }
            },
            changed = session_rx.changed(), if session_open => {
                if changed.is_err() {
                    session_open = false;
                    continue;
                }
                let authenticated = session_rx.borrow_and_update().is_authenticated;
                if authenticated && !was_authenticated {
                    debug!("세션 인증됨, 대시보드 즉시 조회");
                    let inner = inner.clone();
                    tokio::spawn(async move { inner.fetch().await });
                }
                was_authenticated = authenticated;
            }
        }
    }
}

/// 지연 후 조회를 독립 태스크로 예약
///
/// 인증 여부는 예약 시점이 아니라 조회 시점에 확인한다.
fn schedule_delayed_fetch(
    inner: &Arc<DashboardInner>,
    shutdown_rx: &watch::Receiver<bool>,
    delay: Duration,
) {
    let inner = inner.clone();
    let mut shutdown_rx = shutdown_rx.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => inner.fetch().await,
            _ = stopped(&mut shutdown_rx) => debug!("지연 조회 취소"),
        }
    });
}

/// 종료 신호 대기
///
/// `watch::Ref`는 `Send`가 아니므로 여기서 바로 버린다.
async fn stopped(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
