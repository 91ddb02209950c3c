//! # 노트 / 노트-웹 연결 SQLite 쿼리
//!
//! 모든 함수는 `&mut SqliteConnection`을 받으므로 풀 연결과 트랜잭션 양쪽에서 쓸 수 있습니다.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;

pub async fn create_note(
    conn: &mut SqliteConnection,
    params: CreateNoteParams,
) -> Result<Note, AppError> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        INSERT INTO notes (id, user_id, title, content, is_public, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, title, content, is_public, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(params.user_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.is_public)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(note)
}

pub async fn get_note(conn: &mut SqliteConnection, id: Uuid) -> Result<Note, AppError> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        SELECT id, user_id, title, content, is_public, created_at
        FROM notes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(conn) // 0행이면 RowNotFound → AppError::NotFound
    .await?;

    Ok(note)
}

pub async fn update_note(
    conn: &mut SqliteConnection,
    params: UpdateNoteParams,
) -> Result<Note, AppError> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        UPDATE notes
        SET title = ?, content = ?, is_public = ?
        WHERE id = ?
        RETURNING id, user_id, title, content, is_public, created_at
        "#,
    )
    .bind(params.title)
    .bind(params.content)
    .bind(params.is_public)
    .bind(params.id)
    .fetch_one(conn)
    .await?;

    Ok(note)
}

pub async fn delete_note(conn: &mut SqliteConnection, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn list_notes_by_user_id(
    conn: &mut SqliteConnection,
    page: PageParams,
) -> Result<Vec<Note>, AppError> {
    let notes = sqlx::query_as::<_, Note>(
        r#"
        SELECT id, user_id, title, content, is_public, created_at
        FROM notes
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

    Ok(notes)
}

pub async fn create_note_web_link(
    conn: &mut SqliteConnection,
    params: CreateNoteWebParams,
) -> Result<NoteWeb, AppError> {
    let link = sqlx::query_as::<_, NoteWeb>(
        r#"
        INSERT INTO note_webs (note_id, web_id, created_at)
        VALUES (?, ?, ?)
        RETURNING note_id, web_id, created_at
        "#,
    )
    .bind(params.note_id)
    .bind(params.web_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(link)
}

/// 정확히 (note_id, web_id) 한 쌍만 지웁니다.
pub async fn delete_note_web_link(
    conn: &mut SqliteConnection,
    note_id: Uuid,
    web_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM note_webs WHERE note_id = ? AND web_id = ?")
        .bind(note_id)
        .bind(web_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn list_note_web_links_by_note_id(
    conn: &mut SqliteConnection,
    note_id: Uuid,
) -> Result<Vec<NoteWeb>, AppError> {
    let links = sqlx::query_as::<_, NoteWeb>(
        r#"
        SELECT note_id, web_id, created_at
        FROM note_webs
        WHERE note_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(note_id)
    .fetch_all(conn)
    .await?;

    Ok(links)
}
