use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;

pub async fn create_user(
    conn: &mut SqliteConnection,
    params: CreateUserParams,
) -> Result<User, AppError> {
    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, hashed_password, password_changed_at, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, email, hashed_password, password_changed_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(user)
}

pub async fn get_user(conn: &mut SqliteConnection, id: Uuid) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hashed_password, password_changed_at, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hashed_password, password_changed_at, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_one(conn)
    .await?;

    Ok(user)
}

pub async fn create_temporary_user(
    conn: &mut SqliteConnection,
    params: CreateTemporaryUserParams,
) -> Result<TemporaryUser, AppError> {
    let temporary_user = sqlx::query_as::<_, TemporaryUser>(
        r#"
        INSERT INTO temporary_users (email, hashed_password, token, expires_at, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING email, hashed_password, token, expires_at, created_at
        "#,
    )
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.token)
    .bind(params.expires_at)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(temporary_user)
}

pub async fn get_temporary_user_by_email_and_token(
    conn: &mut SqliteConnection,
    email: &str,
    token: &str,
) -> Result<TemporaryUser, AppError> {
    let temporary_user = sqlx::query_as::<_, TemporaryUser>(
        r#"
        SELECT email, hashed_password, token, expires_at, created_at
        FROM temporary_users
        WHERE email = ? AND token = ?
        "#,
    )
    .bind(email)
    .bind(token)
    .fetch_one(conn)
    .await?;

    Ok(temporary_user)
}

pub async fn delete_temporary_user(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM temporary_users WHERE email = ?")
        .bind(email)
        .execute(conn)
        .await?;

    Ok(())
}
