//! # 웹 SQLite 쿼리

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;

pub async fn create_web(
    conn: &mut SqliteConnection,
    params: CreateWebParams,
) -> Result<Web, AppError> {
    let web = sqlx::query_as::<_, Web>(
        r#"
        INSERT INTO webs (id, user_id, url, title, thumbnail_url, html, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, url, title, thumbnail_url, html, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(params.user_id)
    .bind(params.url)
    .bind(params.title)
    .bind(params.thumbnail_url) // None이면 NULL
    .bind(params.html)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(web)
}

pub async fn get_web(conn: &mut SqliteConnection, id: Uuid) -> Result<Web, AppError> {
    let web = sqlx::query_as::<_, Web>(
        r#"
        SELECT id, user_id, url, title, thumbnail_url, html, created_at
        FROM webs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(web)
}

/// note_webs.web_id가 ON DELETE CASCADE이므로 연결 행도 같이 사라집니다.
pub async fn delete_web(conn: &mut SqliteConnection, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM webs WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn list_webs_by_user_id(
    conn: &mut SqliteConnection,
    page: PageParams,
) -> Result<Vec<Web>, AppError> {
    let webs = sqlx::query_as::<_, Web>(
        r#"
        SELECT id, user_id, url, title, thumbnail_url, html, created_at
        FROM webs
        WHERE user_id = ?
        ORDER BY rowid
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(conn)
    .await?;

    Ok(webs)
}

pub async fn list_webs_by_note_id(
    conn: &mut SqliteConnection,
    note_id: Uuid,
) -> Result<Vec<Web>, AppError> {
    let webs = sqlx::query_as::<_, Web>(
        r#"
        SELECT w.id, w.user_id, w.url, w.title, w.thumbnail_url, w.html, w.created_at
        FROM webs w
        JOIN note_webs nw ON nw.web_id = w.id
        WHERE nw.note_id = ?
        ORDER BY nw.rowid
        "#,
    )
    .bind(note_id)
    .fetch_all(conn)
    .await?;

    Ok(webs)
}

/// 여러 노트의 웹을 한 번의 쿼리로 가져옵니다. 각 행에 연결된 노트 id가 붙습니다.
pub async fn list_webs_by_note_ids(
    conn: &mut SqliteConnection,
    note_ids: &[Uuid],
) -> Result<Vec<LinkedWeb>, AppError> {
    if note_ids.is_empty() {
        return Ok(Vec::new());
    }

    // IN (?, ?, ...) 자리표시자 개수가 입력에 따라 달라지므로 QueryBuilder로 조립합니다.
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT w.id, w.user_id, w.url, w.title, w.thumbnail_url, w.html, w.created_at,
               nw.note_id
        FROM webs w
        JOIN note_webs nw ON nw.web_id = w.id
        WHERE nw.note_id IN ("#,
    );
    let mut separated = builder.separated(", ");
    for id in note_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY nw.rowid");

    let rows = builder
        .build_query_as::<LinkedWeb>()
        .fetch_all(conn)
        .await?;

    Ok(rows)
}
