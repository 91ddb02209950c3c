//! # 요청 추출기(Extractor)
//!
//! - `auth`: `Authorization: Bearer <token>` 헤더를 검증해 `AuthUser`로 꺼냄
//! - `client`: User-Agent와 클라이언트 IP를 `ClientMeta`로 꺼냄

pub mod auth;
pub mod client;
