//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `TOKEN_SECRET_KEY`: JWT 서명 비밀키, 32바이트 이상 (필수)
//! - `ACCESS_TOKEN_DURATION`: access 토큰 유효기간 (기본값: 15m)
//! - `REFRESH_TOKEN_DURATION`: refresh 토큰/세션 유효기간 (기본값: 24h)
//! - `HOST`, `PORT`: 서버 바인딩 주소 (PORT를 해석할 수 없으면 에러)
//! - `APP_ENV`: 실행 환경 이름 (dev, prod 등)
//! - `FRONT_URL`: 인증 메일 링크에 쓰이는 프론트엔드 주소
//! - `MAIL_FROM`: 발신 메일 주소
//! - `MAIL_HOSTNAME`, `MAIL_PORT`, `MAIL_USERNAME`, `MAIL_PASSWORD`: SMTP 서버
//!   (`MAIL_HOSTNAME`이 비어 있으면 메일을 보내지 않고 로그로 남김)

use chrono::Duration;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid duration for {key}: {value:?}")]
    InvalidDuration { key: &'static str, value: String },

    #[error("invalid port for {key}: {value:?}")]
    InvalidPort { key: &'static str, value: String },
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 한 번 읽은 뒤 생성자에 명시적으로 전달됩니다 (전역 싱글톤 없음).
#[derive(Debug, Clone)]
pub struct Config {
    pub env: String,
    pub database_url: String,
    pub token_secret_key: String,
    pub access_token_duration: Duration,
    pub refresh_token_duration: Duration,
    pub host: String,
    pub port: u16,
    pub front_url: String,
    pub mail_from: String,
    pub mail_hostname: String,
    pub mail_port: u16,
    pub mail_username: String,
    pub mail_password: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`, `TOKEN_SECRET_KEY`가 없거나 기간 값을 해석할 수 없으면 에러가 발생합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string()),
            database_url: required("DATABASE_URL")?,
            token_secret_key: required("TOKEN_SECRET_KEY")?,
            access_token_duration: duration_var("ACCESS_TOKEN_DURATION", "15m")?,
            refresh_token_duration: duration_var("REFRESH_TOKEN_DURATION", "24h")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: port_var("PORT", "8080")?,
            front_url: env::var("FRONT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@inkclip.app".to_string()),
            mail_hostname: env::var("MAIL_HOSTNAME").unwrap_or_default(),
            mail_port: port_var("MAIL_PORT", "25")?,
            mail_username: env::var("MAIL_USERNAME").unwrap_or_default(),
            mail_password: env::var("MAIL_PASSWORD").unwrap_or_default(),
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn duration_var(key: &'static str, default: &str) -> Result<Duration, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    parse_duration(&value).ok_or(ConfigError::InvalidDuration { key, value })
}

fn port_var(key: &'static str, default: &str) -> Result<u16, ConfigError> {
    parse_port(key, env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn parse_port(key: &'static str, value: String) -> Result<u16, ConfigError> {
    match value.trim().parse() {
        Ok(port) => Ok(port),
        Err(_) => Err(ConfigError::InvalidPort { key, value }),
    }
}

/// `"15m"`, `"24h"`, `"1h30m"`, `"45s"`, `"7d"` 형태의 기간 문자열을 해석합니다.
///
/// 숫자 뒤에는 반드시 단위(s, m, h, d)가 와야 하며, 앞에 `-`를 붙이면 음수 기간이 됩니다.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    if rest.is_empty() {
        return None;
    }

    let mut total = Duration::zero();
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: i64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit = rest.chars().next()?;
        let part = match unit {
            's' => Duration::try_seconds(amount)?,
            'm' => Duration::try_minutes(amount)?,
            'h' => Duration::try_hours(amount)?,
            'd' => Duration::try_days(amount)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
        rest = &rest[unit.len_utf8()..];
    }

    Some(if negative { -total } else { total })
}
