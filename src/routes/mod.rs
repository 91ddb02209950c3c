//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 공유 상태(`AppState`), 라우터 구성을 담습니다.
//!
//! 각 하위 모듈:
//! - `auth`: 가입, 이메일 인증, 로그인, 토큰 갱신, 로그아웃, 내 정보
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `notes`: 노트 CRUD와 공개 노트 조회
//! - `webs`: 웹 페이지 저장 / 조회 / 삭제

pub mod auth;
pub mod health;
pub mod notes;
pub mod webs;


use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::Config;
use crate::db::Store;
use crate::mail::Mailer;
use crate::services::{NoteTxEngine, PageFetcher, SessionReconciler};
use crate::token::{TokenError, TokenMaker};

/// 애플리케이션 공유 상태
///
/// 모든 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 필드는 모두 Arc 기반이라 clone 비용이 작습니다.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenMaker>,
    pub notes: NoteTxEngine,
    pub sessions: SessionReconciler,
    pub fetcher: Arc<dyn PageFetcher>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 비밀키가 32바이트보다 짧으면 여기서 실패합니다.
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        fetcher: Arc<dyn PageFetcher>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenMaker::new(&config.token_secret_key)?);
        let sessions = SessionReconciler::new(
            store.clone(),
            tokens.clone(),
            config.access_token_duration,
            config.refresh_token_duration,
        );

        Ok(Self {
            notes: NoteTxEngine::new(store.clone()),
            store,
            tokens,
            sessions,
            fetcher,
            mailer,
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/verify", get(auth::verify))
        .route("/users", post(auth::create_user))
        .route("/users/login", post(auth::login))
        .route("/users/renew_access", post(auth::renew_access_token))
        .route("/users/logout", post(auth::logout))
        .route("/users/me", get(auth::me));

    Router::new()
        .merge(user_routes)
        // {id}는 URL 경로 파라미터 (Path<Uuid>로 추출)
        .route("/webs", get(webs::list_webs).post(webs::create_web))
        .route("/webs/{id}", get(webs::get_web).delete(webs::delete_web))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/public_notes/{id}", get(notes::get_public_note))
        .route("/health", get(health::health_check))
        .with_state(state)
}
