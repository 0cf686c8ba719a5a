//! Handlers for public slug resolution and browsing.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::api::dto::pagination::PageInfo;
use crate::api::dto::redirect::{
    ListRedirectsParams, PreviewResponse, RedirectSummary, RedirectSummaryListResponse,
    RedirectionQuery,
};
use crate::application::services::{Intent, Outcome, RedirectPage};
use crate::domain::entities::ListFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Shows the preview of a slug, or follows it.
///
/// # Endpoint
///
/// `GET /redirections/{slug}[?redirect=true]`
///
/// # Responses
///
/// - **200 OK**: preview metadata with a `follow_url`; the click counter is untouched
/// - **307 Temporary Redirect**: `?redirect=true` was given; one click is queued
/// - **404 Not Found**: unknown slug, or the record store is unavailable
///
/// A malformed query string is treated as a preview request.
pub async fn redirection_handler(
    Path(slug): Path<String>,
    query: Result<Query<RedirectionQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let intent = Intent::from_redirect_param(query.redirect.as_deref());

    match state.redirect_engine.handle(&slug, intent).await {
        Outcome::NotFound => Err(AppError::not_found(
            "Redirection not found",
            json!({ "slug": slug }),
        )),
        Outcome::Preview(payload) => {
            let follow_url = state.follow_url(&slug);
            Ok(Json(PreviewResponse::new(payload, follow_url)).into_response())
        }
        Outcome::Redirect(target) => Ok(Redirect::temporary(&target.url).into_response()),
    }
}

/// Public, searchable listing of redirections.
///
/// # Endpoint
///
/// `GET /redirections?q=&sort=newest|clicks&page=&page_size=`
///
/// # Responses
///
/// - **200 OK**: one page of entries with preview and follow URLs, never the destination.
///   An unavailable record store yields an empty page.
/// - **400 Bad Request**: invalid pagination
pub async fn browse_redirections_handler(
    State(state): State<AppState>,
    Query(params): Query<ListRedirectsParams>,
) -> Result<Json<RedirectSummaryListResponse>, AppError> {
    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let filter = ListFilter {
        query: params.q,
        sort: params.sort,
        offset,
        limit,
    };

    let page = match state.admin_service.list(filter).await {
        Ok(page) => page,
        Err(e) if e.is_infrastructure() => {
            tracing::error!(error = %e, "Public listing unavailable");
            RedirectPage {
                items: Vec::new(),
                total: 0,
            }
        }
        Err(e) => return Err(e),
    };

    let items = page
        .items
        .into_iter()
        .map(|record| {
            let preview_url = state.preview_url(&record.slug);
            let follow_url = state.follow_url(&record.slug);
            RedirectSummary::new(record, preview_url, follow_url)
        })
        .collect();

    Ok(Json(RedirectSummaryListResponse {
        items,
        pagination: PageInfo::new(
            params.pagination.page(),
            params.pagination.page_size(),
            page.total,
        ),
    }))
}
