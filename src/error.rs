//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 종류를 하나의 `AppError`로 통합합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 저장소, 토큰, 트랜잭션 엔진이 모두 이 타입을 반환
//! - `From<sqlx::Error>`: DB 에러를 NotFound / Conflict / Database로 분류
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::token::TokenError;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 노트 트랜잭션 엔진과 토큰 엔진은 이 에러를 변환하지 않고 그대로 전파합니다.
/// HTTP 상태 코드로의 변환은 `IntoResponse`에서 한 번만 일어납니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 노트/웹/세션/사용자가 존재하지 않음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 실패, 소유권 불일치, 차단/만료된 세션 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 토큰 서명 또는 구조가 잘못됨 (HTTP 401)
    #[error("token is invalid")]
    InvalidToken,

    /// 토큰 유효기간이 지남 (HTTP 401)
    /// InvalidToken과 구분하여 클라이언트가 재로그인 / 토큰 갱신을 선택할 수 있게 합니다.
    #[error("token has expired")]
    ExpiredToken,

    /// 유니크 제약 위반 (HTTP 403)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 그 밖의 데이터베이스 오류 (HTTP 500)
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

// #[from] 대신 직접 From을 구현합니다.
// sqlx 에러 중 일부(행 없음, 유니크 위반)는 도메인 에러로 분류해야 하기 때문입니다.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(db_err.message().to_string())
            }
            other => AppError::Database(other),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::InvalidToken,
            TokenError::Expired => AppError::ExpiredToken,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::ExpiredToken => {
                (StatusCode::UNAUTHORIZED, "expired_token", self.to_string())
            }
            // 유니크 위반은 403으로 응답합니다.
            AppError::Conflict(ref msg) => (StatusCode::FORBIDDEN, "conflict", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
