//! # SQLite 저장소 (sqlx)
//!
//! `SqliteQuerier<C>`는 `SqliteConnection`으로 역참조되는 무엇이든 감쌉니다.
//! - `PoolConnection<Sqlite>`: 자동 커밋 핸들 (`Store::acquire`)
//! - `Transaction<'static, Sqlite>`: 트랜잭션 핸들 (`Store::begin`)
//!
//! 쿼리 자체는 `notes`, `webs`, `users`, `sessions` 모듈의 함수가 담당합니다.

use std::ops::DerefMut;

use async_trait::async_trait;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use uuid::Uuid;

use super::{notes, sessions, users, webs, Querier, Store, StoreTx};
use crate::error::AppError;
use crate::models::*;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn acquire(&self) -> Result<Box<dyn Querier>, AppError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(SqliteQuerier { conn }))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteQuerier { conn: tx }))
    }
}

pub struct SqliteQuerier<C> {
    conn: C,
}

#[async_trait]
impl StoreTx for SqliteQuerier<Transaction<'static, Sqlite>> {
    fn querier(&mut self) -> &mut dyn Querier {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.conn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.conn.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl<C> Querier for SqliteQuerier<C>
where
    C: DerefMut<Target = SqliteConnection> + Send,
{
    async fn create_note(&mut self, params: CreateNoteParams) -> Result<Note, AppError> {
        notes::create_note(&mut self.conn, params).await
    }

    async fn get_note(&mut self, id: Uuid) -> Result<Note, AppError> {
        notes::get_note(&mut self.conn, id).await
    }

    async fn update_note(&mut self, params: UpdateNoteParams) -> Result<Note, AppError> {
        notes::update_note(&mut self.conn, params).await
    }

    async fn delete_note(&mut self, id: Uuid) -> Result<(), AppError> {
        notes::delete_note(&mut self.conn, id).await
    }

    async fn list_notes_by_user_id(&mut self, page: PageParams) -> Result<Vec<Note>, AppError> {
        notes::list_notes_by_user_id(&mut self.conn, page).await
    }

    async fn create_web(&mut self, params: CreateWebParams) -> Result<Web, AppError> {
        webs::create_web(&mut self.conn, params).await
    }

    async fn get_web(&mut self, id: Uuid) -> Result<Web, AppError> {
        webs::get_web(&mut self.conn, id).await
    }

    async fn delete_web(&mut self, id: Uuid) -> Result<(), AppError> {
        webs::delete_web(&mut self.conn, id).await
    }

    async fn list_webs_by_user_id(&mut self, page: PageParams) -> Result<Vec<Web>, AppError> {
        webs::list_webs_by_user_id(&mut self.conn, page).await
    }

    async fn list_webs_by_note_id(&mut self, note_id: Uuid) -> Result<Vec<Web>, AppError> {
        webs::list_webs_by_note_id(&mut self.conn, note_id).await
    }

    async fn list_webs_by_note_ids(
        &mut self,
        note_ids: &[Uuid],
    ) -> Result<Vec<LinkedWeb>, AppError> {
        webs::list_webs_by_note_ids(&mut self.conn, note_ids).await
    }

    async fn create_note_web_link(
        &mut self,
        params: CreateNoteWebParams,
    ) -> Result<NoteWeb, AppError> {
        notes::create_note_web_link(&mut self.conn, params).await
    }

    async fn delete_note_web_link(
        &mut self,
        note_id: Uuid,
        web_id: Uuid,
    ) -> Result<(), AppError> {
        notes::delete_note_web_link(&mut self.conn, note_id, web_id).await
    }

    async fn list_note_web_links_by_note_id(
        &mut self,
        note_id: Uuid,
    ) -> Result<Vec<NoteWeb>, AppError> {
        notes::list_note_web_links_by_note_id(&mut self.conn, note_id).await
    }

    async fn create_user(&mut self, params: CreateUserParams) -> Result<User, AppError> {
        users::create_user(&mut self.conn, params).await
    }

    async fn get_user(&mut self, id: Uuid) -> Result<User, AppError> {
        users::get_user(&mut self.conn, id).await
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<User, AppError> {
        users::get_user_by_email(&mut self.conn, email).await
    }

    async fn create_temporary_user(
        &mut self,
        params: CreateTemporaryUserParams,
    ) -> Result<TemporaryUser, AppError> {
        users::create_temporary_user(&mut self.conn, params).await
    }

    async fn get_temporary_user_by_email_and_token(
        &mut self,
        email: &str,
        token: &str,
    ) -> Result<TemporaryUser, AppError> {
        users::get_temporary_user_by_email_and_token(&mut self.conn, email, token).await
    }

    async fn delete_temporary_user(&mut self, email: &str) -> Result<(), AppError> {
        users::delete_temporary_user(&mut self.conn, email).await
    }

    async fn create_session(&mut self, params: CreateSessionParams) -> Result<Session, AppError> {
        sessions::create_session(&mut self.conn, params).await
    }

    async fn get_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        sessions::get_session(&mut self.conn, id).await
    }

    async fn block_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        sessions::block_session(&mut self.conn, id).await
    }
}
