//! # 노트 모델
//!
//! 노트는 여러 웹 페이지를 묶는 단위입니다. 노트와 웹은 `note_webs` 조인 테이블로
//! 다대다(N:M) 관계를 맺습니다.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Web;
use crate::error::AppError;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 10_000;
pub const MAX_WEBS_PER_NOTE: usize = 5;

/// 노트 엔티티 (`notes` 테이블)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// 노트-웹 연결 행 (`note_webs` 테이블). (note_id, web_id)가 기본키입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteWeb {
    pub note_id: Uuid,
    pub web_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNoteParams {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub is_public: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateNoteParams {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateNoteWebParams {
    pub note_id: Uuid,
    pub web_id: Uuid,
}

/// 노트와, 그 노트에 연결된 웹 목록
///
/// JSON으로는 노트 필드가 펼쳐지고 `webs` 배열이 붙습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteWithWebs {
    #[serde(flatten)]
    pub note: Note,
    pub webs: Vec<Web>,
}

/// `POST /notes`, `PUT /notes/{id}` 요청 본문
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRequest {
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub web_ids: Vec<Uuid>,
}

impl NoteRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let title_len = self.title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_LEN {
            return Err(AppError::BadRequest(format!(
                "Title must be 1 to {} characters",
                MAX_TITLE_LEN
            )));
        }
        if self.content.chars().count() > MAX_CONTENT_LEN {
            return Err(AppError::BadRequest(format!(
                "Content must be at most {} characters",
                MAX_CONTENT_LEN
            )));
        }
        if self.web_ids.is_empty() || self.web_ids.len() > MAX_WEBS_PER_NOTE {
            return Err(AppError::BadRequest(format!(
                "A note needs 1 to {} webs",
                MAX_WEBS_PER_NOTE
            )));
        }
        ensure_unique_web_ids(&self.web_ids)
    }
}

/// 한 요청 안에서 같은 웹 id가 두 번 나오면 BadRequest.
pub fn ensure_unique_web_ids(web_ids: &[Uuid]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(web_ids.len());
    for id in web_ids {
        if !seen.insert(id) {
            return Err(AppError::BadRequest(format!("duplicate web id: {}", id)));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListNotesResponse {
    pub notes: Vec<NoteWithWebs>,
}
