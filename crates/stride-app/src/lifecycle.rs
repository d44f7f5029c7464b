//! 감시 모드 수명주기.
//!
//! OS 종료 신호 대기와 스냅샷 출력 루프.

use anyhow::Result;
use std::future::Future;
use stride_core::models::dashboard::DashboardSnapshot;
use tokio::sync::watch;
use tracing::{info, warn};

/// SIGINT/SIGTERM (그 외 플랫폼은 Ctrl+C) 수신까지 대기
///
/// 핸들러 등록에 실패하면 기본 시그널 동작이 남아 있으므로 완료하지 않는다.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => info!("SIGINT 수신"),
                    _ = sigterm.recv() => info!("SIGTERM 수신"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => warn!("시그널 핸들러 등록 실패: {e}"),
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C 수신");
                return;
            }
            Err(e) => warn!("Ctrl+C 핸들러 등록 실패: {e}"),
        }
    }

    std::future::pending::<()>().await
}

/// `shutdown`이 끝날 때까지 로딩이 끝난 스냅샷을 `on_change`로 넘긴다
///
/// `shutdown` 퓨처는 루프 전체에서 하나만 유지된다. 핸들러 실행 중 도착한 종료 신호도
/// 다음 반복에서 반드시 처리된다.
pub async fn run_until<F, H>(
    mut snapshots: watch::Receiver<DashboardSnapshot>,
    shutdown: F,
    mut on_change: H,
) -> Result<()>
where
    F: Future<Output = ()>,
    H: FnMut(&DashboardSnapshot) -> Result<()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if !snapshot.is_loading {
                    on_change(&snapshot)?;
                }
            }
        }
    }

    Ok(())
}
