//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 저장소는 두 개의 트레이트로 추상화됩니다.
//!
//! - `Querier`: 노트/웹/연결/사용자/세션에 대한 기본 CRUD 연산
//! - `Store`: 풀에서 자동 커밋 핸들(`acquire`)이나 트랜잭션 핸들(`begin`)을 빌려줌
//!
//! 구현체:
//! - `sqlite::SqliteStore`: sqlx + SQLite (운영용)
//! - `memory::MemoryStore`: 같은 키/참조 제약을 지키는 메모리 구현 (테스트 빌드에만 포함)
//!
//! `notes`, `webs`, `users`, `sessions` 하위 모듈은 SQLite 쿼리 함수들입니다.
//!
//! ## 트랜잭션
//! ```text
//! exec_tx(store, |q| Box::pin(async move { ... }))
//!   Ok  → commit
//!   Err → rollback, 원래 에러 반환
//!   (future가 중간에 drop되면 트랜잭션 drop → rollback)
//! ```

#[cfg(test)]
pub mod memory;
pub mod notes;
pub mod sessions;
pub mod sqlite;
pub mod users;
pub mod webs;

#[cfg(test)]
pub mod test_fixtures;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;

/// 저장소 기본 연산
///
/// 행이 없으면 `AppError::NotFound`, 유니크 위반은 `AppError::Conflict`.
#[async_trait]
pub trait Querier: Send {
    // ── 노트 ──
    async fn create_note(&mut self, params: CreateNoteParams) -> Result<Note, AppError>;
    async fn get_note(&mut self, id: Uuid) -> Result<Note, AppError>;
    async fn update_note(&mut self, params: UpdateNoteParams) -> Result<Note, AppError>;
    /// 연결 행이 남아 있으면 실패합니다.
    async fn delete_note(&mut self, id: Uuid) -> Result<(), AppError>;
    async fn list_notes_by_user_id(&mut self, page: PageParams) -> Result<Vec<Note>, AppError>;

    // ── 웹 ──
    async fn create_web(&mut self, params: CreateWebParams) -> Result<Web, AppError>;
    async fn get_web(&mut self, id: Uuid) -> Result<Web, AppError>;
    /// 웹에 걸린 연결 행도 함께 삭제됩니다.
    async fn delete_web(&mut self, id: Uuid) -> Result<(), AppError>;
    async fn list_webs_by_user_id(&mut self, page: PageParams) -> Result<Vec<Web>, AppError>;
    async fn list_webs_by_note_id(&mut self, note_id: Uuid) -> Result<Vec<Web>, AppError>;
    async fn list_webs_by_note_ids(&mut self, note_ids: &[Uuid])
        -> Result<Vec<LinkedWeb>, AppError>;

    // ── 노트-웹 연결 ──
    async fn create_note_web_link(
        &mut self,
        params: CreateNoteWebParams,
    ) -> Result<NoteWeb, AppError>;
    async fn delete_note_web_link(&mut self, note_id: Uuid, web_id: Uuid)
        -> Result<(), AppError>;
    async fn list_note_web_links_by_note_id(
        &mut self,
        note_id: Uuid,
    ) -> Result<Vec<NoteWeb>, AppError>;

    // ── 사용자 ──
    async fn create_user(&mut self, params: CreateUserParams) -> Result<User, AppError>;
    async fn get_user(&mut self, id: Uuid) -> Result<User, AppError>;
    async fn get_user_by_email(&mut self, email: &str) -> Result<User, AppError>;
    async fn create_temporary_user(
        &mut self,
        params: CreateTemporaryUserParams,
    ) -> Result<TemporaryUser, AppError>;
    async fn get_temporary_user_by_email_and_token(
        &mut self,
        email: &str,
        token: &str,
    ) -> Result<TemporaryUser, AppError>;
    async fn delete_temporary_user(&mut self, email: &str) -> Result<(), AppError>;

    // ── 세션 ──
    async fn create_session(&mut self, params: CreateSessionParams) -> Result<Session, AppError>;
    async fn get_session(&mut self, id: Uuid) -> Result<Session, AppError>;
    async fn block_session(&mut self, id: Uuid) -> Result<Session, AppError>;
}

/// 트랜잭션 핸들
///
/// `commit`이나 `rollback` 없이 drop되면 롤백됩니다.
#[async_trait]
pub trait StoreTx: Querier {
    fn querier(&mut self) -> &mut dyn Querier;
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    /// 자동 커밋 핸들. 트랜잭션 밖의 단건 조회/쓰기에 씁니다.
    async fn acquire(&self) -> Result<Box<dyn Querier>, AppError>;
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError>;
}

/// 트랜잭션 안에서 `f`를 실행합니다.
///
/// `f`가 Ok를 돌려주면 커밋하고, Err이면 롤백한 뒤 그 에러를 그대로 돌려줍니다.
/// 롤백 자체가 실패하면 로그만 남기고 원래 에러를 우선합니다.
pub async fn exec_tx<T, F>(store: &dyn Store, f: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'q> FnOnce(&'q mut dyn Querier) -> BoxFuture<'q, Result<T, AppError>> + Send,
{
    let mut tx = store.begin().await?;

    match f(tx.querier()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
