use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use slug_redirector::domain::repositories::TokenRepository;
use slug_redirector::infrastructure::persistence::PgTokenRepository;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token("test-token", "hash123").await.unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert!(token.revoked_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_active(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let created = repo.create_token("active", "activehash").await.unwrap();

    let found = repo.find_active("activehash").await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(created.id));

    assert!(repo.find_active("nonexistent").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_active_skips_revoked(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token("revoked", "revokedhash").await.unwrap();
    repo.revoke_token(token.id).await.unwrap();

    assert!(repo.find_active("revokedhash").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    let token = repo.create_token("update-token", "updatehash").await.unwrap();

    repo.update_last_used("updatehash").await.unwrap();

    let last_used: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT last_used_at FROM api_tokens WHERE id = $1")
            .bind(token.id)
            .fetch_one(&pool)
            .await
            .unwrap();

    assert!(last_used.is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_list_and_find(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let first = repo.create_token("token1", "hash1").await.unwrap();
    repo.create_token("token2", "hash2").await.unwrap();

    assert_eq!(repo.list_tokens().await.unwrap().len(), 2);

    let by_id = repo.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(by_id.name, "token1");

    let by_name = repo.find_by_name("token2").await.unwrap().unwrap();
    assert_eq!(by_name.token_hash, "hash2");

    assert!(repo.find_by_name("missing").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_revoke_already_revoked(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token("double-revoke", "doublehash").await.unwrap();

    repo.revoke_token(token.id).await.unwrap();
    assert!(repo.revoke_token(token.id).await.is_ok());

    let token = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(token.is_revoked());
}
