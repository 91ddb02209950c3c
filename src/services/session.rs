//! # 세션 관리 (Session Reconciler)
//!
//! 로그인 시 access / refresh 토큰 쌍을 발급하고 refresh 세션을 저장합니다.
//! access 토큰 갱신 요청은 저장된 세션 상태와 대조해 검증합니다.
//!
//! 갱신 검사 순서 (앞에서 실패하면 즉시 반환):
//! 1. refresh 토큰 서명 / 만료
//! 2. 세션 존재 (`payload.id`)
//! 3. 차단 여부
//! 4. 세션 사용자 == 토큰 사용자
//! 5. 저장된 토큰 문자열 == 제시된 토큰 문자열
//! 6. 세션 만료
//!
//! 갱신은 상태를 바꾸지 않고, refresh 토큰도 교체하지 않습니다.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::Store;
use crate::error::AppError;
use crate::models::{ClientMeta, CreateSessionParams};
use crate::token::{Payload, TokenMaker};

/// 로그인 결과
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub session_id: Uuid,
    pub access_token: String,
    pub access_payload: Payload,
    pub refresh_token: String,
    pub refresh_payload: Payload,
}

#[derive(Clone)]
pub struct SessionReconciler {
    store: Arc<dyn Store>,
    tokens: Arc<TokenMaker>,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl SessionReconciler {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: Arc<TokenMaker>,
        access_token_duration: Duration,
        refresh_token_duration: Duration,
    ) -> Self {
        Self {
            store,
            tokens,
            access_token_duration,
            refresh_token_duration,
        }
    }

    /// access / refresh 토큰을 만들고, refresh payload id를 키로 세션을 저장합니다.
    pub async fn issue_token_pair(
        &self,
        user_id: Uuid,
        client: ClientMeta,
    ) -> Result<TokenPair, AppError> {
        let (access_token, access_payload) = self
            .tokens
            .create_token(user_id, self.access_token_duration)?;
        let (refresh_token, refresh_payload) = self
            .tokens
            .create_token(user_id, self.refresh_token_duration)?;

        let mut q = self.store.acquire().await?;
        let session = q
            .create_session(CreateSessionParams {
                id: refresh_payload.id,
                user_id,
                refresh_token: refresh_token.clone(),
                user_agent: client.user_agent,
                client_ip: client.client_ip,
                is_blocked: false,
                expires_at: refresh_payload.expires_at,
            })
            .await?;

        tracing::info!(session_id = %session.id, user_id = %user_id, "session created");

        Ok(TokenPair {
            session_id: session.id,
            access_token,
            access_payload,
            refresh_token,
            refresh_payload,
        })
    }

    pub async fn renew_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<(String, Payload), AppError> {
        let refresh_payload = self.tokens.verify_token(refresh_token)?;

        let mut q = self.store.acquire().await?;
        let session = q.get_session(refresh_payload.id).await?;

        if session.is_blocked {
            return Err(AppError::Unauthorized("session is blocked".to_string()));
        }
        if session.user_id != refresh_payload.user_id {
            return Err(AppError::Unauthorized("incorrect session user".to_string()));
        }
        if session.refresh_token != refresh_token {
            return Err(AppError::Unauthorized("mismatched session token".to_string()));
        }
        if Utc::now() > session.expires_at {
            return Err(AppError::Unauthorized("expired session".to_string()));
        }

        let renewed = self
            .tokens
            .create_token(refresh_payload.user_id, self.access_token_duration)?;
        Ok(renewed)
    }

    /// 로그아웃: 세션을 차단합니다. 이후 같은 refresh 토큰으로는 갱신할 수 없습니다.
    pub async fn revoke_session(&self, refresh_token: &str, user_id: Uuid) -> Result<(), AppError> {
        let refresh_payload = self.tokens.verify_token(refresh_token)?;

        let mut q = self.store.acquire().await?;
        let session = q.get_session(refresh_payload.id).await?;
        if session.user_id != user_id {
            return Err(AppError::Unauthorized("incorrect session user".to_string()));
        }

        q.block_session(session.id).await?;
        tracing::info!(session_id = %session.id, "session blocked");
        Ok(())
    }
}
