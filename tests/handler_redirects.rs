mod common;

use axum::http::{StatusCode, header};
use serde_json::json;
use slug_redirector::domain::repositories::RedirectRepository;

// ─── AUTH ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_admin_api_requires_bearer_token() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    let response = server.get("/api/redirections").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.header(header::WWW_AUTHENTICATE).to_str().unwrap(),
        "Bearer"
    );
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "unauthorized"
    );

    server
        .get("/api/redirections")
        .add_header(header::AUTHORIZATION, "Bearer wrong-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_do_not_require_token() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    let server = common::server(app.state);

    server.get("/redirections/launch").await.assert_status_ok();
    server.get("/health").await.assert_status_ok();
}

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_redirect_applies_defaults() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    let response = server
        .post("/api/redirections")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&common::create_body("launch"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["slug"], "launch");
    assert_eq!(json["clicks"], 0);
    assert_eq!(json["canonical_url"], "https://example.com/landing");
    assert_eq!(json["author"], "thisisio");
    assert_eq!(json["site_name"], "thisisio");
    assert_eq!(json["content_type"], "website");
    assert_eq!(json["keywords"], json!(["launch", "news"]));
    assert!(json["published_time"].is_string());
}

#[tokio::test]
async fn test_create_redirect_derives_slug_from_title() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    let mut body = common::create_body("");
    body["title"] = json!("Hello, World 2026!");

    let response = server
        .post("/api/redirections")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&body)
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<serde_json::Value>()["slug"],
        "hello-world-2026"
    );
}

#[tokio::test]
async fn test_create_redirect_duplicate_slug_conflicts() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    let server = common::server(app.state);

    let response = server
        .post("/api/redirections")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&common::create_body("launch"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<serde_json::Value>()["error"]["code"], "conflict");
}

#[tokio::test]
async fn test_create_redirect_rejects_invalid_input() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    let mut body = common::create_body("Not A Slug");
    body["url"] = json!("not-a-url");

    let response = server
        .post("/api/redirections")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&body)
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["details"].get("slug").is_some());
    assert!(json["error"]["details"].get("url").is_some());
}

// ─── READ / LIST ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_redirect_shows_destination_and_clicks() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    app.repo.increment_clicks("launch").await.unwrap();
    let server = common::server(app.state);

    let response = server
        .get("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["url"], "https://example.com/a");
    assert_eq!(json["clicks"], 1);

    server
        .get("/api/redirections/missing")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_redirects_filters_sorts_and_paginates() {
    let app = common::create_test_app().await;
    for slug in ["alpha", "beta", "gamma"] {
        common::create_test_redirect(&app.state, slug, "https://example.com/a").await;
    }
    app.repo.increment_clicks("beta").await.unwrap();
    app.repo.increment_clicks("beta").await.unwrap();
    app.repo.increment_clicks("gamma").await.unwrap();
    let server = common::server(app.state);

    let json = server
        .get("/api/redirections?sort=clicks&page_size=2")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .json::<serde_json::Value>();

    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["items"][0]["slug"], "beta");
    assert_eq!(json["items"][1]["slug"], "gamma");
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["total_pages"], 2);

    let json = server
        .get("/api/redirections?q=ALPHA")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .json::<serde_json::Value>();

    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["items"][0]["slug"], "alpha");
}

#[tokio::test]
async fn test_list_redirects_rejects_oversized_page() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    server
        .get("/api/redirections?page_size=1000")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status_bad_request();
}

// ─── UPDATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_redirect_preserves_clicks() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    for _ in 0..3 {
        app.repo.increment_clicks("launch").await.unwrap();
    }
    let server = common::server(app.state);

    let response = server
        .patch("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&json!({ "title": "Renamed", "url": "https://example.com/b" }))
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["url"], "https://example.com/b");
    assert_eq!(json["clicks"], 3);
    assert!(json["modified_time"].is_string());
}

#[tokio::test]
async fn test_update_redirect_blank_canonical_resets_to_url() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    let server = common::server(app.state);

    server
        .patch("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&json!({ "canonical_url": "https://canonical.example.com" }))
        .await
        .assert_status_ok();

    let json = server
        .patch("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&json!({ "canonical_url": "", "author": "" }))
        .await
        .json::<serde_json::Value>();

    assert_eq!(json["canonical_url"], "https://example.com/a");
    assert_eq!(json["author"], "thisisio");
}

#[tokio::test]
async fn test_update_redirect_cannot_set_clicks() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    let server = common::server(app.state);

    let response = server
        .patch("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&json!({ "clicks": 1000 }))
        .await;

    assert!(response.status_code().is_client_error());
    assert_eq!(app.repo.get("launch").await.unwrap().unwrap().clicks, 0);
}

#[tokio::test]
async fn test_update_missing_redirect_is_not_found() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    server
        .patch("/api/redirections/missing")
        .add_header(header::AUTHORIZATION, common::bearer())
        .json(&json!({ "title": "Renamed" }))
        .await
        .assert_status_not_found();
}

// ─── DELETE / RESET ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_redirect_then_public_not_found() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    let server = common::server(app.state);

    server
        .delete("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/redirections/launch?redirect=true")
        .await
        .assert_status_not_found();

    // Second delete returns 404.
    server
        .delete("/api/redirections/launch")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_reset_clicks() {
    let app = common::create_test_app().await;
    common::create_test_redirect(&app.state, "launch", "https://example.com/a").await;
    for _ in 0..4 {
        app.repo.increment_clicks("launch").await.unwrap();
    }
    let server = common::server(app.state);

    let response = server
        .post("/api/redirections/launch/reset-clicks")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["clicks"], 0);

    server
        .post("/api/redirections/missing/reset-clicks")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status_not_found();
}

// ─── SESSION ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_and_sign_out() {
    let app = common::create_test_app().await;
    let server = common::server(app.state);

    let response = server
        .get("/api/session")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["name"], "test");

    server
        .delete("/api/session")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/api/session")
        .add_header(header::AUTHORIZATION, common::bearer())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
