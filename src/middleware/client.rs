use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts},
};

use crate::models::ClientMeta;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// 세션에 기록할 클라이언트 정보
///
/// IP는 프록시가 붙인 `X-Forwarded-For`의 첫 항목을 우선하고,
/// 없으면 소켓 주소(`ConnectInfo`)를 씁니다. 둘 다 없으면 빈 문자열입니다.
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let forwarded = parts
            .headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let client_ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();

        Ok(ClientMeta {
            user_agent,
            client_ip,
        })
    }
}
