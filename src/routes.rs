//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /redirections`        - Browse and search redirections (public)
//! - `GET /redirections/{slug}` - Preview or follow a slug (public)
//! - `GET /health`              - Health check: record store, click queue (public)
//! - `/api/*`                   - Admin API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on the admin API
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{browse_redirections_handler, health_handler, redirection_handler};
use crate::api::middleware::rate_limit::RateLimit;
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// `rate_limit` selects how client IPs are keyed; see [`RateLimit`].
pub fn app_router(state: AppState, rate_limit: RateLimit) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, rate_limit))
}

/// Same routes and middleware as [`app_router`], without path normalization.
pub fn router(state: AppState, rate_limit: RateLimit) -> Router {
    let api_router = rate_limit.secure(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
    );

    let public_router = rate_limit.public(
        Router::new()
            .route("/redirections", get(browse_redirections_handler))
            .route("/redirections/{slug}", get(redirection_handler)),
    );

    Router::new()
        .merge(public_router)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}
