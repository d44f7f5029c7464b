//! # stride-network
//!
//! HTTP 네트워크 어댑터.
//! 서버 REST API(인증, 프로필, 대시보드) 호출을 담당하며
//! 로컬 자격증명 저장소의 토큰으로 Bearer 인증 헤더를 주입한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use stride_network::http_client::HttpApiClient;
//!
//! let api = HttpApiClient::new("http://localhost:5000", credentials, timeout)?;
//! ```

pub mod http_client;
