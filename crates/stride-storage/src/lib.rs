//! # stride-storage
//!
//! 로컬 저장소 어댑터.
//! 세션 토큰 등 자격증명을 키-값 형태로 영속 저장한다.
//!
//! ## 모듈
//! - `sqlite`: SQLite 자격증명 저장소 (CredentialStore 구현)
//! - `memory`: 인메모리 자격증명 저장소 (테스트/임시 세션용)
//! - `migration`: 스키마 마이그레이션

pub mod memory;
pub mod migration;
pub mod sqlite;
