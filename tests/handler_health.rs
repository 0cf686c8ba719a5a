mod common;

use axum::http::StatusCode;
use slug_redirector::infrastructure::persistence::{
    MemoryRedirectRepository, UnavailableRedirectRepository,
};
use std::sync::Arc;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::create_test_app().await;
    let _rx = app.rx;
    let server = common::server(app.state);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("click_queue").is_some());
}

#[tokio::test]
async fn test_health_degraded_without_store() {
    let app = common::create_test_app_with(
        Arc::new(MemoryRedirectRepository::new()),
        Arc::new(UnavailableRedirectRepository::new("DATABASE_URL is not set")),
    )
    .await;
    let _rx = app.rx;
    let server = common::server(app.state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "error");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let app = common::create_test_app().await;
    drop(app.rx);
    let server = common::server(app.state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["click_queue"]["status"], "error");
}
