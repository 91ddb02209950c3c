use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// 사용자 엔티티 (`users` 테이블 한 행)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// 클라이언트에 돌려주는 사용자 정보 (비밀번호 해시 제외)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

/// 이메일 인증을 기다리는 가입 대기 사용자 (`temporary_users` 테이블)
///
/// 인증이 끝나면 같은 트랜잭션 안에서 `User`로 승격되고 삭제됩니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemporaryUser {
    pub email: String,
    pub hashed_password: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub email: String,
    pub hashed_password: String,
}

#[derive(Debug, Clone)]
pub struct CreateTemporaryUserParams {
    pub email: String,
    pub hashed_password: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// ── 요청/응답 DTO ──

/// `POST /register`, `POST /users` 요청 본문
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if self.password.chars().count() < 8 {
            return Err(AppError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// `GET /verify?email=&token=` 쿼리
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenewAccessTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}
