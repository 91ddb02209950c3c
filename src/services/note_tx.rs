//! # 노트 트랜잭션 엔진
//!
//! 노트 한 건과 그 노트에 연결된 웹 목록을 하나의 원자적 단위로 생성/수정/삭제합니다.
//!
//! ```text
//! create: 노트 INSERT → (웹마다) get_web → 연결 INSERT
//! update: 노트 UPDATE → 기존 연결 전부 삭제 → (새 웹마다) get_web → 연결 INSERT
//! delete: 연결 전부 삭제 → 노트 DELETE
//! ```
//!
//! 어느 단계든 실패하면 트랜잭션 전체가 롤백됩니다.
//! 소유권(노트가 요청한 사용자 것인지)은 여기서 확인하지 않습니다. 라우트가 담당합니다.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::db::{exec_tx, Querier, Store};
use crate::error::AppError;
use crate::models::*;

#[derive(Clone)]
pub struct NoteTxEngine {
    store: Arc<dyn Store>,
}

/// 웹마다 존재를 확인한 뒤 연결 행을 만듭니다. 조회한 순서대로 웹을 돌려줍니다.
async fn link_webs<Q: Querier + ?Sized>(
    q: &mut Q,
    note_id: Uuid,
    web_ids: &[Uuid],
) -> Result<Vec<Web>, AppError> {
    let mut webs = Vec::with_capacity(web_ids.len());
    for &web_id in web_ids {
        let web = q.get_web(web_id).await?;
        q.create_note_web_link(CreateNoteWebParams { note_id, web_id })
            .await?;
        webs.push(web);
    }
    Ok(webs)
}

/// 노트의 연결 행을 정확히 (note_id, web_id) 쌍 단위로 모두 지웁니다.
async fn unlink_all<Q: Querier + ?Sized>(q: &mut Q, note_id: Uuid) -> Result<(), AppError> {
    let links = q.list_note_web_links_by_note_id(note_id).await?;
    for link in links {
        q.delete_note_web_link(link.note_id, link.web_id).await?;
    }
    Ok(())
}

impl NoteTxEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        params: CreateNoteParams,
        web_ids: Vec<Uuid>,
    ) -> Result<NoteWithWebs, AppError> {
        ensure_unique_web_ids(&web_ids)?;

        let result = exec_tx(self.store.as_ref(), move |q| {
            Box::pin(async move {
                let note = q.create_note(params).await?;
                let webs = link_webs(q, note.id, &web_ids).await?;
                Ok(NoteWithWebs { note, webs })
            })
        })
        .await?;

        tracing::debug!(note_id = %result.note.id, webs = result.webs.len(), "note created");
        Ok(result)
    }

    /// 연결 목록은 통째로 교체됩니다. 같은 입력으로 두 번 호출해도 결과가 같습니다.
    pub async fn update(
        &self,
        params: UpdateNoteParams,
        web_ids: Vec<Uuid>,
    ) -> Result<NoteWithWebs, AppError> {
        ensure_unique_web_ids(&web_ids)?;

        let result = exec_tx(self.store.as_ref(), move |q| {
            Box::pin(async move {
                let note = q.update_note(params).await?;
                unlink_all(q, note.id).await?;
                let webs = link_webs(q, note.id, &web_ids).await?;
                Ok(NoteWithWebs { note, webs })
            })
        })
        .await?;

        tracing::debug!(note_id = %result.note.id, webs = result.webs.len(), "note updated");
        Ok(result)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        exec_tx(self.store.as_ref(), move |q| {
            Box::pin(async move {
                unlink_all(q, id).await?;
                q.delete_note(id).await
            })
        })
        .await?;

        tracing::debug!(note_id = %id, "note deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<NoteWithWebs, AppError> {
        let mut q = self.store.acquire().await?;
        let note = q.get_note(id).await?;
        let webs = q.list_webs_by_note_id(id).await?;
        Ok(NoteWithWebs { note, webs })
    }

    /// 사용자의 노트 한 페이지를, 노트별로 묶은 웹과 함께 돌려줍니다.
    /// 웹은 노트 수와 상관없이 쿼리 한 번으로 가져옵니다.
    pub async fn list_for_user(&self, page: PageParams) -> Result<Vec<NoteWithWebs>, AppError> {
        let mut q = self.store.acquire().await?;
        let notes = q.list_notes_by_user_id(page).await?;
        let note_ids: Vec<Uuid> = notes.iter().map(|n| n.id).collect();

        let mut grouped: HashMap<Uuid, Vec<Web>> = HashMap::new();
        for row in q.list_webs_by_note_ids(&note_ids).await? {
            grouped.entry(row.note_id).or_default().push(row.web);
        }

        Ok(notes
            .into_iter()
            .map(|note| {
                let webs = grouped.remove(&note.id).unwrap_or_default();
                NoteWithWebs { note, webs }
            })
            .collect())
    }
}
