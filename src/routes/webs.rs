//! # 웹(Web) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST   /webs`       → URL을 받아 페이지를 가져오고 Open Graph 정보와 함께 저장
//! - `GET    /webs`       → 내 웹 목록 (`?page_id=&page_size=`)
//! - `GET    /webs/{id}`  → 웹 하나 조회 (본인 것만)
//! - `DELETE /webs/{id}`  → 웹 삭제 (본인 것만, 노트 연결도 함께 삭제)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    db::Querier,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::opengraph::parse_web_url,
};

/// 웹을 조회하고 요청한 사용자 소유인지 확인합니다.
async fn get_owned_web(q: &mut dyn Querier, id: Uuid, user_id: Uuid) -> Result<Web, AppError> {
    let web = q.get_web(id).await?;
    if web.user_id != user_id {
        return Err(AppError::Unauthorized(
            "web doesn't belong to the authenticated user".to_string(),
        ));
    }
    Ok(web)
}

pub async fn create_web(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateWebRequest>,
) -> Result<Json<Web>, AppError> {
    let url = parse_web_url(&req.url)?;
    let page = state.fetcher.fetch(&url).await?;

    let mut q = state.store.acquire().await?;
    let web = q
        .create_web(CreateWebParams {
            user_id: auth_user.user_id,
            url: req.url.trim().to_string(),
            title: page.title,
            thumbnail_url: page.thumbnail_url,
            html: page.html,
        })
        .await?;

    tracing::info!(web_id = %web.id, url = %web.url, "web saved");
    Ok(Json(web))
}

pub async fn get_web(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Web>, AppError> {
    let mut q = state.store.acquire().await?;
    let web = get_owned_web(q.as_mut(), id, auth_user.user_id).await?;
    Ok(Json(web))
}

pub async fn list_webs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListWebsResponse>, AppError> {
    let page = query.into_params(auth_user.user_id)?;

    let mut q = state.store.acquire().await?;
    let webs = q.list_webs_by_user_id(page).await?;
    Ok(Json(ListWebsResponse { webs }))
}

pub async fn delete_web(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut q = state.store.acquire().await?;
    get_owned_web(q.as_mut(), id, auth_user.user_id).await?;
    q.delete_web(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
