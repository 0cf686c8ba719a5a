//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_redirect_handler, delete_redirect_handler, events_handler, get_redirect_handler,
    list_redirects_handler, reset_clicks_handler, session_handler, sign_out_handler,
    update_redirect_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All admin routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /redirections`                     - List (filter, sort, paginate)
/// - `POST   /redirections`                     - Create
/// - `GET    /redirections/{slug}`              - Full record
/// - `PATCH  /redirections/{slug}`              - Edit metadata
/// - `DELETE /redirections/{slug}`              - Delete
/// - `POST   /redirections/{slug}/reset-clicks` - Reset the click counter
/// - `GET    /events`                           - SSE stream of changes
/// - `GET    /session`                          - Current administrator
/// - `DELETE /session`                          - Sign out
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/redirections",
            get(list_redirects_handler).post(create_redirect_handler),
        )
        .route(
            "/redirections/{slug}",
            get(get_redirect_handler)
                .patch(update_redirect_handler)
                .delete(delete_redirect_handler),
        )
        .route(
            "/redirections/{slug}/reset-clicks",
            post(reset_clicks_handler),
        )
        .route("/events", get(events_handler))
        .route("/session", get(session_handler).delete(sign_out_handler))
}
