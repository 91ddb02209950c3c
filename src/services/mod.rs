//! # 비즈니스 로직 서비스
//!
//! - `note_tx`: 노트와 노트-웹 연결을 하나의 트랜잭션으로 다루는 엔진
//! - `session`: refresh 세션 검증 / 토큰 쌍 발급 / 세션 차단
//! - `opengraph`: 웹 페이지를 받아 Open Graph 메타데이터 추출
//! - `password`: Argon2 비밀번호 해시

pub mod note_tx;
pub mod opengraph;
pub mod password;
pub mod session;

pub use note_tx::NoteTxEngine;
pub use opengraph::{HttpPageFetcher, PageFetcher};
pub use session::SessionReconciler;
