//! # 노트(Note) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST   /notes`               → 노트 + 웹 연결 생성
//! - `GET    /notes`               → 내 노트 목록 (`?page_id=&page_size=`)
//! - `GET    /notes/{id}`          → 노트 하나 조회 (본인 것만)
//! - `PUT    /notes/{id}`          → 노트 수정, 웹 연결 전체 교체 (본인 것만)
//! - `DELETE /notes/{id}`          → 노트와 웹 연결 삭제 (본인 것만)
//! - `GET    /public_notes/{id}`   → 공개 노트 조회 (인증 불필요)
//!
//! 쓰기 작업은 모두 `NoteTxEngine`을 거쳐 한 트랜잭션으로 처리됩니다.
//! 엔진은 소유권을 확인하지 않으므로 노트와 연결할 웹의 소유자를 여기서 먼저 확인합니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};

fn ensure_owner(note: &Note, user_id: Uuid) -> Result<(), AppError> {
    if note.user_id != user_id {
        return Err(AppError::Unauthorized(
            "note doesn't belong to the authenticated user".to_string(),
        ));
    }
    Ok(())
}

/// 쓰기 전에 노트 소유자를 확인합니다. 연결은 확인 직후 반납합니다.
async fn check_note_owner(state: &AppState, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let mut q = state.store.acquire().await?;
    let note = q.get_note(id).await?;
    ensure_owner(&note, user_id)
}

/// 연결할 웹이 모두 요청한 사용자 것인지 확인합니다.
async fn check_web_owners(
    state: &AppState,
    web_ids: &[Uuid],
    user_id: Uuid,
) -> Result<(), AppError> {
    let mut q = state.store.acquire().await?;
    for &web_id in web_ids {
        let web = q.get_web(web_id).await?;
        if web.user_id != user_id {
            return Err(AppError::Unauthorized(
                "web doesn't belong to the authenticated user".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn create_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<NoteRequest>,
) -> Result<Json<NoteWithWebs>, AppError> {
    req.validate()?;
    check_web_owners(&state, &req.web_ids, auth_user.user_id).await?;

    let created = state
        .notes
        .create(
            CreateNoteParams {
                user_id: auth_user.user_id,
                title: req.title,
                content: req.content,
                is_public: req.is_public,
            },
            req.web_ids,
        )
        .await?;

    Ok(Json(created))
}

pub async fn get_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteWithWebs>, AppError> {
    let note = state.notes.get(id).await?;
    ensure_owner(&note.note, auth_user.user_id)?;
    Ok(Json(note))
}

pub async fn list_notes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListNotesResponse>, AppError> {
    let page = query.into_params(auth_user.user_id)?;
    let notes = state.notes.list_for_user(page).await?;
    Ok(Json(ListNotesResponse { notes }))
}

pub async fn update_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<NoteWithWebs>, AppError> {
    req.validate()?;
    check_note_owner(&state, id, auth_user.user_id).await?;
    check_web_owners(&state, &req.web_ids, auth_user.user_id).await?;

    let updated = state
        .notes
        .update(
            UpdateNoteParams {
                id,
                title: req.title,
                content: req.content,
                is_public: req.is_public,
            },
            req.web_ids,
        )
        .await?;

    Ok(Json(updated))
}

pub async fn delete_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_note_owner(&state, id, auth_user.user_id).await?;
    state.notes.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 비공개 노트는 존재 여부를 드러내지 않도록 404로 응답합니다.
pub async fn get_public_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteWithWebs>, AppError> {
    let note = state.notes.get(id).await?;
    if !note.note.is_public {
        return Err(AppError::NotFound);
    }
    Ok(Json(note))
}
