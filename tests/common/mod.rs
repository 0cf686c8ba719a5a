#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use slug_redirector::api::middleware::rate_limit::RateLimit;
use slug_redirector::application::services::{CreateRedirect, WriterDefaults, hash_token};
use slug_redirector::domain::click_event::ClickEvent;
use slug_redirector::domain::entities::RedirectRecord;
use slug_redirector::domain::repositories::{RedirectRepository, TokenRepository};
use slug_redirector::infrastructure::persistence::{
    MemoryRedirectRepository, MemoryTokenRepository,
};
use slug_redirector::routes::router;
use slug_redirector::state::AppState;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// In-memory application wired the way the server wires it.
pub struct TestApp {
    pub state: AppState,
    pub rx: mpsc::Receiver<ClickEvent>,
    pub repo: Arc<MemoryRedirectRepository>,
    pub tokens: Arc<MemoryTokenRepository>,
}

pub async fn create_test_app() -> TestApp {
    let repo = Arc::new(MemoryRedirectRepository::new());
    create_test_app_with(repo.clone(), repo).await
}

/// Builds an app over an arbitrary record store; `repo` is still returned for
/// direct inspection by tests.
pub async fn create_test_app_with(
    repo: Arc<MemoryRedirectRepository>,
    store: Arc<dyn RedirectRepository>,
) -> TestApp {
    let tokens = Arc::new(MemoryTokenRepository::new());
    tokens
        .create_token("test", &hash_token(SIGNING_SECRET, ADMIN_TOKEN))
        .await
        .unwrap();

    let (tx, rx) = mpsc::channel(100);
    let state = AppState::new(
        store,
        tokens.clone(),
        tx,
        SIGNING_SECRET.to_string(),
        WriterDefaults::default(),
        None,
    );

    TestApp {
        state,
        rx,
        repo,
        tokens,
    }
}

pub fn server(state: AppState) -> TestServer {
    TestServer::new(router(state, RateLimit::Disabled)).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {ADMIN_TOKEN}")
}

/// Inserts a record through the admin service so writer defaults apply.
pub async fn create_test_redirect(state: &AppState, slug: &str, url: &str) -> RedirectRecord {
    state
        .admin_service
        .create(CreateRedirect {
            slug: Some(slug.to_string()),
            url: url.to_string(),
            title: format!("Title of {slug}"),
            description: format!("Description of {slug}"),
            image_url: "https://example.com/og.png".to_string(),
            keywords: "launch,news".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub fn create_body(slug: &str) -> Value {
    json!({
        "slug": slug,
        "url": "https://example.com/landing",
        "title": "Launch day",
        "description": "Everything about launch day",
        "image_url": "https://example.com/og.png",
        "keywords": "launch,news"
    })
}
