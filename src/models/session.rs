//! # refresh 세션 모델
//!
//! 로그인할 때마다 세션 한 행이 생기고, refresh 토큰으로 access 토큰을 갱신할 때
//! 이 행의 상태(차단 여부, 만료, 토큰 일치)를 확인합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 세션 엔티티 (`sessions` 테이블)
///
/// `id`는 refresh 토큰 payload의 id와 같습니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
}

/// 요청을 보낸 클라이언트 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub user_agent: String,
    pub client_ip: String,
}
