//! 애플리케이션 이벤트 모델.

use serde::{Deserialize, Serialize};

/// 프로필 변경 알림 페이로드
///
/// 어떤 항목이 바뀌었는지를 나타내는 플래그만 담는다. 새 값은 포함하지 않는다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// 코딩 플랫폼 핸들 변경 여부
    #[serde(default, alias = "codingHandlesUpdated")]
    pub coding_handles_updated: bool,
    /// 신체 지표 변경 여부
    #[serde(default, alias = "physicalMetricsUpdated")]
    pub physical_metrics_updated: bool,
}

/// 프로세스 내부 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// 프로필 데이터가 외부에서 변경됨
    ProfileUpdated(ProfileUpdate),
}
