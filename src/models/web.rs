use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 저장된 웹 페이지 (`webs` 테이블)
///
/// (user_id, url) 조합은 유일합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Web {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub html: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateWebParams {
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub html: String,
}

/// 노트 묶음 조회 결과 한 행: 웹과 그 웹이 연결된 노트 id
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkedWeb {
    #[sqlx(flatten)]
    pub web: Web,
    pub note_id: Uuid,
}

/// `POST /webs` 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateWebRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListWebsResponse {
    pub webs: Vec<Web>,
}
