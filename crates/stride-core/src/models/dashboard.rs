//! 대시보드 데이터 모델.

use serde::{Deserialize, Serialize};

/// 대시보드 페이로드
///
/// 구조는 코어가 해석하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardData(pub serde_json::Value);

impl DashboardData {
    /// 원본 JSON 참조
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// 대시보드 캐시 스냅샷
///
/// 실패한 갱신은 `data`를 지우지 않는다. 마지막 성공 데이터가 유지된다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// 마지막으로 적용된 대시보드 데이터
    pub data: Option<DashboardData>,
    /// 조회 진행 중 여부
    pub is_loading: bool,
    /// 마지막 조회 실패 메시지
    pub last_error: Option<String>,
}
