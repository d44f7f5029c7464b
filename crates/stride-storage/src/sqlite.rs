//! SQLite 자격증명 저장소 어댑터.
//!
//! `CredentialStore` 포트 구현. 세션 토큰을 프로세스 재시작 후에도 유지한다.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use stride_core::error::CoreError;
use stride_core::ports::storage::CredentialStore;
use tracing::{debug, info};

use crate::migration;

/// SQLite 자격증명 저장소 — `CredentialStore` 포트 구현
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    /// 파일 기반 SQLite 저장소 생성
    ///
    /// 상위 디렉토리가 없으면 만든다.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| CoreError::Storage(format!("SQLite 열기 실패: {e}")))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            ",
        )
        .map_err(|e| CoreError::Storage(format!("PRAGMA 설정 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        info!("자격증명 저장소 초기화: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Storage(format!("인메모리 SQLite 생성 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM credentials WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CoreError::Storage(format!("자격증명 조회 실패 ({key}): {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO credentials (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| CoreError::Storage(format!("자격증명 저장 실패 ({key}): {e}")))?;
        debug!("자격증명 저장: {key}");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let conn = self.conn.lock();
        let removed = conn
            .execute("DELETE FROM credentials WHERE key = ?1", params![key])
            .map_err(|e| CoreError::Storage(format!("자격증명 삭제 실패 ({key}): {e}")))?;
        if removed > 0 {
            debug!("자격증명 삭제: {key}");
        }
        Ok(())
    }
}
