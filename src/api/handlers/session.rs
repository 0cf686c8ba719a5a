//! Handlers for the administrator session.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::api::dto::session::SessionResponse;
use crate::api::middleware::auth::SessionToken;
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the administrator behind the Bearer token.
///
/// `GET /api/session`
pub async fn session_handler(Extension(principal): Extension<Principal>) -> Json<SessionResponse> {
    Json(principal.into())
}

/// Signs out by revoking the presented token.
///
/// `DELETE /api/session`
pub async fn sign_out_handler(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<StatusCode, AppError> {
    state.auth_service.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
