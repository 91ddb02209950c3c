//! # 토큰 엔진
//!
//! access / refresh 토큰을 발급하고 검증합니다.
//! 두 토큰은 구조가 같고, 유효기간과 세션 저장 여부로만 구분됩니다.
//!
//! - `payload`: 토큰 클레임(`Payload`)과 만료 판정
//! - `maker`: HS256 서명 / 검증 (`TokenMaker`)

pub mod maker;
pub mod payload;

pub use maker::*;
pub use payload::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid key size: must be at least 32 bytes, got {0}")]
    InvalidKeySize(usize),

    #[error("token is invalid")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}
