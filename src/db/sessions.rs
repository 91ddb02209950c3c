//! # refresh 세션 SQLite 쿼리
//!
//! ```text
//! 로그인 → create_session() → (갱신 때마다 get_session()) → 로그아웃 → block_session()
//! ```
//! 세션 행은 지우지 않고 `is_blocked`로만 무효화합니다.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CreateSessionParams, Session};

pub async fn create_session(
    conn: &mut SqliteConnection,
    params: CreateSessionParams,
) -> Result<Session, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions
            (id, user_id, refresh_token, user_agent, client_ip, is_blocked, expires_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, refresh_token, user_agent, client_ip, is_blocked,
                  expires_at, created_at
        "#,
    )
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.refresh_token)
    .bind(params.user_agent)
    .bind(params.client_ip)
    .bind(params.is_blocked)
    .bind(params.expires_at)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(session)
}

pub async fn get_session(conn: &mut SqliteConnection, id: Uuid) -> Result<Session, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, refresh_token, user_agent, client_ip, is_blocked,
               expires_at, created_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(session)
}

pub async fn block_session(conn: &mut SqliteConnection, id: Uuid) -> Result<Session, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        UPDATE sessions
        SET is_blocked = TRUE
        WHERE id = ?
        RETURNING id, user_id, refresh_token, user_agent, client_ip, is_blocked,
                  expires_at, created_at
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(session)
}
