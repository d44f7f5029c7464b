//! 사용자 프로필 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 사용자 프로필
///
/// 한 번 조회되면 변경하지 않는다. 갱신 시 통째로 교체된다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// 사용자 ID
    pub id: i64,
    /// 표시 이름
    pub name: String,
    /// 이메일 주소
    pub email: String,
    /// 프로필 이미지 URL
    #[serde(default, alias = "profileImageUrl", alias = "profile_image")]
    pub profile_image_url: Option<String>,
    /// 가입 시각
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}
