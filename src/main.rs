//! # Inkclip 웹 서버 진입점
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 읽기
//! 4. SQLite 연결 풀 생성 + 마이그레이션
//! 5. 공유 상태(AppState)와 라우터 구성
//! 6. HTTP 서버 시작 (Ctrl+C로 graceful shutdown)

mod config;
mod db;
mod error;
mod mail;
mod middleware;
mod models;
mod routes;
mod services;
mod token;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::SqliteStore;
use crate::mail::{LogMailer, Mailer, SmtpMailer};
use crate::routes::AppState;
use crate::services::HttpPageFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 inkclip, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkclip=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        env = %config.env,
        "Starting Inkclip server on {}:{}",
        config.host,
        config.port
    );

    // 파일이 없으면 새로 만들고, 외래키 제약을 켭니다.
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // SMTP 서버가 설정되지 않았으면 메일을 로그로만 남깁니다.
    let mailer: Arc<dyn Mailer> = if config.mail_hostname.is_empty() {
        tracing::warn!("MAIL_HOSTNAME is not set, verification mails are only logged");
        Arc::new(LogMailer)
    } else {
        Arc::new(SmtpMailer::new(
            &config.mail_hostname,
            config.mail_port,
            &config.mail_username,
            &config.mail_password,
        ))
    };

    let state = AppState::new(
        config.clone(),
        Arc::new(SqliteStore::new(pool)),
        Arc::new(HttpPageFetcher::new()?),
        mailer,
    )?;

    // 개발 환경에서는 모든 출처를 허용합니다. 운영에서는 FRONT_URL만 허용합니다.
    let cors = if config.env == "dev" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(config.front_url.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo: 세션에 클라이언트 IP를 기록하기 위해 소켓 주소를 요청에 붙입니다.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
