//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `user`: 사용자, 가입 대기 사용자(TemporaryUser), 인증 요청/응답
//! - `session`: refresh 토큰 세션과 클라이언트 메타데이터
//! - `note`: 노트와 노트-웹 연결(NoteWeb)
//! - `web`: 저장된 웹 페이지
//! - `page`: 페이지네이션 파라미터
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Note`처럼 짧게 접근합니다.

pub mod note;
pub mod page;
pub mod session;
pub mod user;
pub mod web;

pub use note::*;
pub use page::*;
pub use session::*;
pub use user::*;
pub use web::*;
