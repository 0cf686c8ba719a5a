//! Admin handlers for managing redirections.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::PageInfo;
use crate::api::dto::redirect::{
    CreateRedirectRequest, ListRedirectsParams, RedirectListResponse, RedirectResponse,
    UpdateRedirectRequest,
};
use crate::domain::entities::ListFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a redirection.
///
/// # Endpoint
///
/// `POST /api/redirections`
///
/// # Responses
///
/// - **201 Created**: the stored record, `clicks = 0`
/// - **400 Bad Request**: validation failed
/// - **409 Conflict**: the slug is already taken
pub async fn create_redirect_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRedirectRequest>,
) -> Result<(StatusCode, Json<RedirectResponse>), AppError> {
    payload.validate()?;

    let record = state.admin_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Lists redirections.
///
/// # Endpoint
///
/// `GET /api/redirections?q=&sort=newest|clicks&page=&page_size=`
pub async fn list_redirects_handler(
    State(state): State<AppState>,
    Query(params): Query<ListRedirectsParams>,
) -> Result<Json<RedirectListResponse>, AppError> {
    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let page = state
        .admin_service
        .list(ListFilter {
            query: params.q,
            sort: params.sort,
            offset,
            limit,
        })
        .await?;

    Ok(Json(RedirectListResponse {
        items: page.items.into_iter().map(RedirectResponse::from).collect(),
        pagination: PageInfo::new(
            params.pagination.page(),
            params.pagination.page_size(),
            page.total,
        ),
    }))
}

/// Returns one redirection with its click counter.
///
/// # Endpoint
///
/// `GET /api/redirections/{slug}`
pub async fn get_redirect_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RedirectResponse>, AppError> {
    let record = state.admin_service.get(&slug).await?;
    Ok(Json(record.into()))
}

/// Edits redirection metadata. The click counter is never changed.
///
/// # Endpoint
///
/// `PATCH /api/redirections/{slug}`
pub async fn update_redirect_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateRedirectRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    payload.validate()?;

    let record = state.admin_service.update(&slug, payload.into()).await?;

    Ok(Json(record.into()))
}

/// Permanently deletes a redirection.
///
/// # Endpoint
///
/// `DELETE /api/redirections/{slug}`
///
/// # Responses
///
/// - **204 No Content**: deleted; the slug resolves to 404 from now on
/// - **404 Not Found**: no such slug
pub async fn delete_redirect_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    state.admin_service.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resets the click counter to zero.
///
/// # Endpoint
///
/// `POST /api/redirections/{slug}/reset-clicks`
pub async fn reset_clicks_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RedirectResponse>, AppError> {
    state.click_service.reset(&slug).await?;
    tracing::info!(slug = %slug, "Click counter reset");

    let record = state.admin_service.get(&slug).await?;
    Ok(Json(record.into()))
}
