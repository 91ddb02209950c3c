//! # 메모리 저장소
//!
//! SQLite 스키마와 같은 키/참조 규칙을 지키는 인메모리 `Store` 구현입니다.
//! - users.email, temporary_users.email, sessions.id 유일
//! - webs (user_id, url) 유일, note_webs (note_id, web_id) 기본키
//! - 연결 행은 존재하는 노트/웹만 가리킬 수 있음
//! - 웹 삭제 시 연결 행 cascade, 연결 행이 남은 노트는 삭제 불가
//!
//! 트랜잭션은 전체 상태의 잠금을 쥔 채 사본(staged)에 쓰고,
//! 커밋할 때 사본을 공유 상태에 덮어씁니다. 커밋 없이 drop되면 사본만 버려집니다.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use uuid::Uuid;

use super::{Querier, Store, StoreTx};
use crate::error::AppError;
use crate::models::*;

#[derive(Debug, Clone, Default)]
struct MemState {
    users: Vec<User>,
    temporary_users: Vec<TemporaryUser>,
    sessions: Vec<Session>,
    notes: Vec<Note>,
    webs: Vec<Web>,
    note_webs: Vec<NoteWeb>,
}

fn unique_violation(constraint: &str) -> AppError {
    AppError::Conflict(format!("UNIQUE constraint failed: {}", constraint))
}

fn foreign_key_violation() -> AppError {
    AppError::Internal("FOREIGN KEY constraint failed".to_string())
}

fn paginate<T>(items: impl Iterator<Item = T>, page: PageParams) -> Vec<T> {
    items
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

impl MemState {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn create_note(&mut self, params: CreateNoteParams) -> Result<Note, AppError> {
        if !self.user_exists(params.user_id) {
            return Err(foreign_key_violation());
        }
        let note = Note {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            title: params.title,
            content: params.content,
            is_public: params.is_public,
            created_at: Utc::now(),
        };
        self.notes.push(note.clone());
        Ok(note)
    }

    fn get_note(&self, id: Uuid) -> Result<Note, AppError> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn update_note(&mut self, params: UpdateNoteParams) -> Result<Note, AppError> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == params.id)
            .ok_or(AppError::NotFound)?;
        note.title = params.title;
        note.content = params.content;
        note.is_public = params.is_public;
        Ok(note.clone())
    }

    fn delete_note(&mut self, id: Uuid) -> Result<(), AppError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(AppError::NotFound)?;
        if self.note_webs.iter().any(|l| l.note_id == id) {
            return Err(foreign_key_violation());
        }
        self.notes.remove(index);
        Ok(())
    }

    fn list_notes_by_user_id(&self, page: PageParams) -> Vec<Note> {
        paginate(
            self.notes.iter().filter(|n| n.user_id == page.user_id).cloned(),
            page,
        )
    }

    fn create_web(&mut self, params: CreateWebParams) -> Result<Web, AppError> {
        if !self.user_exists(params.user_id) {
            return Err(foreign_key_violation());
        }
        if self
            .webs
            .iter()
            .any(|w| w.user_id == params.user_id && w.url == params.url)
        {
            return Err(unique_violation("webs.user_id, webs.url"));
        }
        let web = Web {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            url: params.url,
            title: params.title,
            thumbnail_url: params.thumbnail_url,
            html: params.html,
            created_at: Utc::now(),
        };
        self.webs.push(web.clone());
        Ok(web)
    }

    fn get_web(&self, id: Uuid) -> Result<Web, AppError> {
        self.webs
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn delete_web(&mut self, id: Uuid) -> Result<(), AppError> {
        let index = self
            .webs
            .iter()
            .position(|w| w.id == id)
            .ok_or(AppError::NotFound)?;
        self.webs.remove(index);
        self.note_webs.retain(|l| l.web_id != id);
        Ok(())
    }

    fn list_webs_by_user_id(&self, page: PageParams) -> Vec<Web> {
        paginate(
            self.webs.iter().filter(|w| w.user_id == page.user_id).cloned(),
            page,
        )
    }

    fn list_webs_by_note_ids(&self, note_ids: &[Uuid]) -> Vec<LinkedWeb> {
        let wanted: HashSet<&Uuid> = note_ids.iter().collect();
        self.note_webs
            .iter()
            .filter(|l| wanted.contains(&l.note_id))
            .filter_map(|l| {
                self.webs.iter().find(|w| w.id == l.web_id).map(|w| LinkedWeb {
                    web: w.clone(),
                    note_id: l.note_id,
                })
            })
            .collect()
    }

    fn create_note_web_link(&mut self, params: CreateNoteWebParams) -> Result<NoteWeb, AppError> {
        let note_exists = self.notes.iter().any(|n| n.id == params.note_id);
        let web_exists = self.webs.iter().any(|w| w.id == params.web_id);
        if !note_exists || !web_exists {
            return Err(foreign_key_violation());
        }
        if self
            .note_webs
            .iter()
            .any(|l| l.note_id == params.note_id && l.web_id == params.web_id)
        {
            return Err(unique_violation("note_webs.note_id, note_webs.web_id"));
        }
        let link = NoteWeb {
            note_id: params.note_id,
            web_id: params.web_id,
            created_at: Utc::now(),
        };
        self.note_webs.push(link.clone());
        Ok(link)
    }

    fn delete_note_web_link(&mut self, note_id: Uuid, web_id: Uuid) {
        self.note_webs
            .retain(|l| !(l.note_id == note_id && l.web_id == web_id));
    }

    fn list_note_web_links_by_note_id(&self, note_id: Uuid) -> Vec<NoteWeb> {
        self.note_webs
            .iter()
            .filter(|l| l.note_id == note_id)
            .cloned()
            .collect()
    }

    fn create_user(&mut self, params: CreateUserParams) -> Result<User, AppError> {
        if self.users.iter().any(|u| u.email == params.email) {
            return Err(unique_violation("users.email"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: params.email,
            hashed_password: params.hashed_password,
            password_changed_at: now,
            created_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn create_temporary_user(
        &mut self,
        params: CreateTemporaryUserParams,
    ) -> Result<TemporaryUser, AppError> {
        if self.temporary_users.iter().any(|t| t.email == params.email) {
            return Err(unique_violation("temporary_users.email"));
        }
        let temporary_user = TemporaryUser {
            email: params.email,
            hashed_password: params.hashed_password,
            token: params.token,
            expires_at: params.expires_at,
            created_at: Utc::now(),
        };
        self.temporary_users.push(temporary_user.clone());
        Ok(temporary_user)
    }

    fn get_temporary_user_by_email_and_token(
        &self,
        email: &str,
        token: &str,
    ) -> Result<TemporaryUser, AppError> {
        self.temporary_users
            .iter()
            .find(|t| t.email == email && t.token == token)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn delete_temporary_user(&mut self, email: &str) {
        self.temporary_users.retain(|t| t.email != email);
    }

    fn create_session(&mut self, params: CreateSessionParams) -> Result<Session, AppError> {
        if !self.user_exists(params.user_id) {
            return Err(foreign_key_violation());
        }
        if self.sessions.iter().any(|s| s.id == params.id) {
            return Err(unique_violation("sessions.id"));
        }
        let session = Session {
            id: params.id,
            user_id: params.user_id,
            refresh_token: params.refresh_token,
            user_agent: params.user_agent,
            client_ip: params.client_ip,
            is_blocked: params.is_blocked,
            expires_at: params.expires_at,
            created_at: Utc::now(),
        };
        self.sessions.push(session.clone());
        Ok(session)
    }

    fn get_session(&self, id: Uuid) -> Result<Session, AppError> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn block_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        session.is_blocked = true;
        Ok(session.clone())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn Querier>, AppError> {
        Ok(Box::new(MemQuerier {
            mode: Mode::Direct(self.state.clone()),
        }))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemQuerier {
            mode: Mode::Staged { guard, staged },
        }))
    }
}

enum Mode {
    /// 연산마다 잠그고 바로 반영
    Direct(Arc<Mutex<MemState>>),
    /// 트랜잭션: 잠금을 유지한 채 사본에 씀
    Staged {
        guard: OwnedMutexGuard<MemState>,
        staged: MemState,
    },
}

pub struct MemQuerier {
    mode: Mode,
}

enum StateRef<'a> {
    Locked(MutexGuard<'a, MemState>),
    Staged(&'a mut MemState),
}

impl Deref for StateRef<'_> {
    type Target = MemState;

    fn deref(&self) -> &MemState {
        match self {
            StateRef::Locked(guard) => &**guard,
            StateRef::Staged(state) => &**state,
        }
    }
}

impl DerefMut for StateRef<'_> {
    fn deref_mut(&mut self) -> &mut MemState {
        match self {
            StateRef::Locked(guard) => &mut **guard,
            StateRef::Staged(state) => &mut **state,
        }
    }
}

impl MemQuerier {
    async fn state(&mut self) -> StateRef<'_> {
        match &mut self.mode {
            Mode::Direct(state) => StateRef::Locked(state.lock().await),
            Mode::Staged { staged, .. } => StateRef::Staged(staged),
        }
    }
}

#[async_trait]
impl StoreTx for MemQuerier {
    fn querier(&mut self) -> &mut dyn Querier {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        match self.mode {
            Mode::Staged { mut guard, staged } => {
                *guard = staged;
                Ok(())
            }
            Mode::Direct(_) => Err(AppError::Internal("no transaction to commit".to_string())),
        }
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl Querier for MemQuerier {
    async fn create_note(&mut self, params: CreateNoteParams) -> Result<Note, AppError> {
        self.state().await.create_note(params)
    }

    async fn get_note(&mut self, id: Uuid) -> Result<Note, AppError> {
        self.state().await.get_note(id)
    }

    async fn update_note(&mut self, params: UpdateNoteParams) -> Result<Note, AppError> {
        self.state().await.update_note(params)
    }

    async fn delete_note(&mut self, id: Uuid) -> Result<(), AppError> {
        self.state().await.delete_note(id)
    }

    async fn list_notes_by_user_id(&mut self, page: PageParams) -> Result<Vec<Note>, AppError> {
        Ok(self.state().await.list_notes_by_user_id(page))
    }

    async fn create_web(&mut self, params: CreateWebParams) -> Result<Web, AppError> {
        self.state().await.create_web(params)
    }

    async fn get_web(&mut self, id: Uuid) -> Result<Web, AppError> {
        self.state().await.get_web(id)
    }

    async fn delete_web(&mut self, id: Uuid) -> Result<(), AppError> {
        self.state().await.delete_web(id)
    }

    async fn list_webs_by_user_id(&mut self, page: PageParams) -> Result<Vec<Web>, AppError> {
        Ok(self.state().await.list_webs_by_user_id(page))
    }

    async fn list_webs_by_note_id(&mut self, note_id: Uuid) -> Result<Vec<Web>, AppError> {
        let rows = self.state().await.list_webs_by_note_ids(&[note_id]);
        Ok(rows.into_iter().map(|row| row.web).collect())
    }

    async fn list_webs_by_note_ids(
        &mut self,
        note_ids: &[Uuid],
    ) -> Result<Vec<LinkedWeb>, AppError> {
        Ok(self.state().await.list_webs_by_note_ids(note_ids))
    }

    async fn create_note_web_link(
        &mut self,
        params: CreateNoteWebParams,
    ) -> Result<NoteWeb, AppError> {
        self.state().await.create_note_web_link(params)
    }

    async fn delete_note_web_link(
        &mut self,
        note_id: Uuid,
        web_id: Uuid,
    ) -> Result<(), AppError> {
        self.state().await.delete_note_web_link(note_id, web_id);
        Ok(())
    }

    async fn list_note_web_links_by_note_id(
        &mut self,
        note_id: Uuid,
    ) -> Result<Vec<NoteWeb>, AppError> {
        Ok(self.state().await.list_note_web_links_by_note_id(note_id))
    }

    async fn create_user(&mut self, params: CreateUserParams) -> Result<User, AppError> {
        self.state().await.create_user(params)
    }

    async fn get_user(&mut self, id: Uuid) -> Result<User, AppError> {
        self.state().await.get_user(id)
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<User, AppError> {
        self.state().await.get_user_by_email(email)
    }

    async fn create_temporary_user(
        &mut self,
        params: CreateTemporaryUserParams,
    ) -> Result<TemporaryUser, AppError> {
        self.state().await.create_temporary_user(params)
    }

    async fn get_temporary_user_by_email_and_token(
        &mut self,
        email: &str,
        token: &str,
    ) -> Result<TemporaryUser, AppError> {
        self.state()
            .await
            .get_temporary_user_by_email_and_token(email, token)
    }

    async fn delete_temporary_user(&mut self, email: &str) -> Result<(), AppError> {
        self.state().await.delete_temporary_user(email);
        Ok(())
    }

    async fn create_session(&mut self, params: CreateSessionParams) -> Result<Session, AppError> {
        self.state().await.create_session(params)
    }

    async fn get_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        self.state().await.get_session(id)
    }

    async fn block_session(&mut self, id: Uuid) -> Result<Session, AppError> {
        self.state().await.block_session(id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::*;
    use super::*;

    #[tokio::test]
    async fn enforces_same_keys_as_sqlite() {
        let store = MemoryStore::new();
        let user = seed_user(&store).await;
        let webs = seed_webs(&store, user.id, 2).await;
        let mut q = store.acquire().await.unwrap();

        let dup_user = q
            .create_user(CreateUserParams {
                email: user.email.clone(),
                hashed_password: "x".into(),
            })
            .await;
        assert!(matches!(dup_user, Err(AppError::Conflict(_))));

        let dup_web = q
            .create_web(CreateWebParams {
                user_id: user.id,
                url: webs[0].url.clone(),
                title: "again".into(),
                thumbnail_url: None,
                html: String::new(),
            })
            .await;
        assert!(matches!(dup_web, Err(AppError::Conflict(_))));

        let note = q.create_note(note_params(user.id, "n")).await.unwrap();
        let link = CreateNoteWebParams { note_id: note.id, web_id: webs[0].id };
        q.create_note_web_link(link).await.unwrap();
        assert!(matches!(
            q.create_note_web_link(link).await,
            Err(AppError::Conflict(_))
        ));
        assert!(q
            .create_note_web_link(CreateNoteWebParams { note_id: note.id, web_id: Uuid::new_v4() })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn web_delete_cascades_and_linked_note_delete_fails() {
        let store = MemoryStore::new();
        let user = seed_user(&store).await;
        let webs = seed_webs(&store, user.id, 2).await;
        let mut q = store.acquire().await.unwrap();

        let note = q.create_note(note_params(user.id, "n")).await.unwrap();
        for web in &webs {
            q.create_note_web_link(CreateNoteWebParams { note_id: note.id, web_id: web.id })
                .await
                .unwrap();
        }
        assert!(q.delete_note(note.id).await.is_err());

        q.delete_web(webs[0].id).await.unwrap();
        let remaining = q.list_webs_by_note_id(note.id).await.unwrap();
        assert_eq!(remaining, vec![webs[1].clone()]);

        q.delete_note_web_link(note.id, webs[1].id).await.unwrap();
        q.delete_note(note.id).await.unwrap();
        assert!(matches!(q.get_note(note.id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn staged_writes_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let user = seed_user(&store).await;

        let mut tx = store.begin().await.unwrap();
        let note = tx.create_note(note_params(user.id, "staged")).await.unwrap();
        assert_eq!(tx.get_note(note.id).await.unwrap(), note);
        tx.commit().await.unwrap();

        let mut q = store.acquire().await.unwrap();
        assert_eq!(q.get_note(note.id).await.unwrap(), note);
    }

    #[tokio::test]
    async fn pagination_uses_limit_and_offset() {
        let store = MemoryStore::new();
        let user = seed_user(&store).await;
        seed_webs(&store, user.id, 7).await;
        let mut q = store.acquire().await.unwrap();

        let first = q
            .list_webs_by_user_id(PageParams { user_id: user.id, limit: 5, offset: 0 })
            .await
            .unwrap();
        let second = q
            .list_webs_by_user_id(PageParams { user_id: user.id, limit: 5, offset: 5 })
            .await
            .unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].title, "page 5");
    }
}
