//! 테스트용 저장소와 시드 데이터

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use super::{Querier, SqliteStore, Store, StoreTx};
use crate::error::AppError;
use crate::models::*;

/// 마이그레이션이 적용된 인메모리 SQLite 저장소
///
/// `sqlite::memory:`는 연결마다 별도의 DB이므로 연결을 하나로 고정하고 닫히지 않게 합니다.
pub async fn sqlite_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    SqliteStore::new(pool)
}

pub async fn seed_user(store: &dyn Store) -> User {
    let mut q = store.acquire().await.unwrap();
    q.create_user(CreateUserParams {
        email: format!("{}@inkclip.test", Uuid::new_v4()),
        hashed_password: "not-a-real-hash".to_string(),
    })
    .await
    .unwrap()
}

pub async fn seed_webs(store: &dyn Store, user_id: Uuid, n: usize) -> Vec<Web> {
    let mut q = store.acquire().await.unwrap();
    let mut webs = Vec::with_capacity(n);
    for i in 0..n {
        let web = q
            .create_web(CreateWebParams {
                user_id,
                url: format!("https://example.com/{}/{}", i, Uuid::new_v4()),
                title: format!("page {}", i),
                thumbnail_url: None,
                html: "<html></html>".to_string(),
            })
            .await
            .unwrap();
        webs.push(web);
    }
    webs
}

pub fn note_params(user_id: Uuid, title: &str) -> CreateNoteParams {
    CreateNoteParams {
        user_id,
        title: title.to_string(),
        content: "content".to_string(),
        is_public: false,
    }
}

pub fn page(user_id: Uuid) -> PageParams {
    PageParams {
        user_id,
        limit: 10,
        offset: 0,
    }
}

/// 트랜잭션 안의 `delete_note`만 실패시키는 저장소
///
/// 그 앞 단계(연결 삭제)는 정상적으로 실행되므로 롤백 여부를 확인할 수 있습니다.
pub struct FailingDeleteStore {
    pub inner: Arc<dyn Store>,
}

struct FailingDeleteTx {
    inner: Box<dyn StoreTx>,
}

#[async_trait]
impl Store for FailingDeleteStore {
    async fn acquire(&self) -> Result<Box<dyn Querier>, AppError> {
        self.inner.acquire().await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(FailingDeleteTx { inner }))
    }
}

#[async_trait]
impl StoreTx for FailingDeleteTx {
    fn querier(&mut self) -> &mut dyn Querier {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl Querier for FailingDeleteTx {
    async fn create_note(&mut self, params: CreateNoteParams) -> Result<Note, AppError> {
        self.inner.create_note(params).await
    }
    async fn get_note(&mut self, id: Uuid) -> Result<Note, AppError> {
        self.inner.get_note(id).await
    }
    async fn update_note(&mut self, params: UpdateNoteParams) -> Result<Note, AppError> {
        self.inner.update_note(params).await
    }
    async fn delete_note(&mut self, _id: Uuid) -> Result<(), AppError> {
        Err(AppError::Internal("delete_note failed".to_string()))
    }
    async fn list_notes_by_user_id(&mut self, page: PageParams) -> Result<Vec<Note>, AppError> {
        self.inner.list_notes_by_user_id(page).await
    }
    async fn create_web(&mut self, params: CreateWebParams) -> Result<Web, AppError> {
        self.inner.create_web(params).await
    }
    async fn get_web(&mut self, id: Uuid) -> Result<Web, AppError> {
        self.inner.get_web(id).await
    }
    async fn delete_web(&mut self, id: Uuid) -> Result<(), AppError> {
        self.inner.delete_web(id).await
    }
    async fn list_webs_by_user_id(&mut self, page: PageParams) -> Result<Vec<Web>, AppError> {
        self.inner.list_webs_by_user_id(page).await
    }
    async fn list_webs_by_note_id(&mut self, note_id: Uuid) -> Result<Vec<Web>, AppError> {
        self.inner.list_webs_by_note_id(note_id).await
    }
    async fn list_webs_by_note_ids(
        &mut self,
        note_ids: &[Uuid],
    ) -> Result<Vec<LinkedWeb>, AppError> {
        self.inner.list_webs_by_note_ids(note_ids).await
    }
    async fn create_note_web_link(
        &mut self,
        params: CreateNoteWebParams,
    ) -> Result<NoteWeb, AppError> {
        self.inner.create_note_web_link(params).await
    }
    async fn delete_note_web_link(
        &mut self,
        note_id: Uuid,
        web_id: Uuid,
    ) -> Result<(), AppError> {
        self.inner.delete_note_web_link(note_id, web_id).await
    }
    async fn list_note_web_links_by_note_id(
        &mut self,
        note_id: Uuid,
    ) -> Result<Vec<NoteWeb>, AppError> {
        self.inner.list_note_web_links_by_note_id(note_id).await
    }
    async fn create_user(&mut self, params: CreateUserParams) -> Result<User, AppError> {
        self.inner.create_user(params).await
    }
    async fn get_user(&mut self, id: Uuid) -> Result<User, AppError> {
        self.inner.get_user(id).await
    }
    async fn get_user_by_email(&mut self, email: &str) -> Result<User, AppError> {
        self.inner.get_user_by_email(email).await
    }
    async fn create_temporary_user(
        &mut self,
        params: CreateTemporaryUserParams,
    ) -> Result<TemporaryUser, AppError> {
        self.inner.create_temporary_user(params).await
    }
    async fn get_temporary_user_by_email_and_token(
        &mut self,
        email: &str,
        token: &str,
    ) -> Result<TemporaryUser, AppError> {
        self.inner
            .get_temporary_user_by_email_and_token(email, token)
            .await
    }
    async fn delete_temporary_user(&mut self, email: &str) -> Result<(), AppError> {
        self.inner.delete_temporary_user(email).await
    }
    async fn create_session(&mut self, params: CreateSessionParams) -> Result<Session, AppError> {
        self.inner.create_session(params).await
    }
    async fn get_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        self.inner.get_session(id).await
    }
    async fn block_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        self.inner.block_session(id).await
    }
}
