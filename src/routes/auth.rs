//! # 사용자 / 인증 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /register`           → 가입 대기 사용자 생성 + 인증 메일 발송
//! - `GET  /verify`             → 가입 대기 사용자를 정식 사용자로 승격
//! - `POST /users`              → 사용자 바로 생성
//! - `POST /users/login`        → access / refresh 토큰 발급, 세션 저장
//! - `POST /users/renew_access` → refresh 토큰으로 access 토큰 갱신
//! - `POST /users/logout`       → 세션 차단
//! - `GET  /users/me`           → 내 정보

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::exec_tx,
    error::AppError,
    mail::verify_mail_content,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::password::{check_password, hash_password},
};

/// 인증 메일 링크의 유효기간
const VERIFY_TOKEN_TTL_HOURS: i64 = 24;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate()?;

    let hashed_password = hash_password(&req.password)?;
    let token = Uuid::new_v4().to_string();

    // 연결을 오래 잡지 않도록 블록 안에서만 사용합니다.
    let temporary_user = {
        let mut q = state.store.acquire().await?;
        match q.get_user_by_email(&req.email).await {
            Ok(_) => return Err(AppError::Conflict("Email already exists".to_string())),
            Err(AppError::NotFound) => {}
            Err(e) => return Err(e),
        }

        q.create_temporary_user(CreateTemporaryUserParams {
            email: req.email,
            hashed_password,
            token,
            expires_at: Utc::now() + Duration::hours(VERIFY_TOKEN_TTL_HOURS),
        })
        .await?
    };

    let mail = verify_mail_content(
        &state.config.front_url,
        &state.config.mail_from,
        &temporary_user.email,
        &temporary_user.token,
    )?;
    state.mailer.send(mail).await?;

    tracing::info!(email = %temporary_user.email, "verification mail sent");
    Ok(Json(json!({})))
}

/// 인증 링크가 맞으면 사용자를 만들고 가입 대기 행을 지웁니다 (한 트랜잭션).
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let user = exec_tx(state.store.as_ref(), move |q| {
        Box::pin(async move {
            let temporary_user = q
                .get_temporary_user_by_email_and_token(&query.email, &query.token)
                .await?;
            tracing::debug!(
                email = %temporary_user.email,
                requested_at = %temporary_user.created_at,
                "verifying pending user"
            );
            if Utc::now() > temporary_user.expires_at {
                return Err(AppError::Unauthorized(
                    "verification link has expired".to_string(),
                ));
            }

            let user = q
                .create_user(CreateUserParams {
                    email: temporary_user.email.clone(),
                    hashed_password: temporary_user.hashed_password,
                })
                .await?;
            q.delete_temporary_user(&temporary_user.email).await?;
            Ok(user)
        })
    })
    .await?;

    tracing::info!(user_id = %user.id, "user verified");
    Ok(Json(user.into()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()?;

    let hashed_password = hash_password(&req.password)?;
    let mut q = state.store.acquire().await?;
    let user = q
        .create_user(CreateUserParams {
            email: req.email,
            hashed_password,
        })
        .await?;

    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = {
        let mut q = state.store.acquire().await?;
        q.get_user_by_email(&req.email).await.map_err(|e| match e {
            AppError::NotFound => AppError::Unauthorized("Invalid email or password".to_string()),
            other => other,
        })?
    };

    check_password(&req.password, &user.hashed_password)?;

    let pair = state.sessions.issue_token_pair(user.id, client).await?;

    Ok(Json(LoginResponse {
        session_id: pair.session_id,
        access_token: pair.access_token,
        access_token_expires_at: pair.access_payload.expires_at,
        refresh_token: pair.refresh_token,
        refresh_token_expires_at: pair.refresh_payload.expires_at,
        user: user.into(),
    }))
}

pub async fn renew_access_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<RenewAccessTokenResponse>, AppError> {
    let (access_token, payload) = state
        .sessions
        .renew_access_token(&req.refresh_token)
        .await?;

    Ok(Json(RenewAccessTokenResponse {
        access_token,
        access_token_expires_at: payload.expires_at,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .revoke_session(&req.refresh_token, auth_user.user_id)
        .await?;

    tracing::debug!(access_token_id = %auth_user.payload.id, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let mut q = state.store.acquire().await?;
    let user = q.get_user(auth_user.user_id).await?;

    Ok(Json(user.into()))
}
