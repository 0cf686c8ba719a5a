//! PostgreSQL implementation of the redirect record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use sqlx::postgres::PgListener;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{
    ChangeEvent, ChangeKind, ContentType, ListFilter, ListSort, NewRedirect, RedirectPatch,
    RedirectRecord,
};
use crate::domain::repositories::{ChangeStream, RedirectRepository};
use crate::error::AppError;

/// Channel the `redirections_changed` trigger notifies on.
pub const CHANGE_CHANNEL: &str = "redirections_changed";

const COLUMNS: &str = "slug, url, title, description, image_url, keywords, site_name, \
     content_type, canonical_url, author, clicks, created_at, updated_at, \
     published_time, modified_time";

const SEARCH: &str = "($1::text IS NULL \
     OR slug ILIKE $1 OR title ILIKE $1 OR description ILIKE $1 OR keywords ILIKE $1 \
     OR content_type ILIKE $1)";

#[derive(FromRow)]
struct RedirectRow {
    slug: String,
    url: String,
    title: String,
    description: String,
    image_url: String,
    keywords: String,
    site_name: String,
    content_type: String,
    canonical_url: String,
    author: String,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_time: Option<DateTime<Utc>>,
    modified_time: Option<DateTime<Utc>>,
}

impl TryFrom<RedirectRow> for RedirectRecord {
    type Error = AppError;

    fn try_from(row: RedirectRow) -> Result<Self, Self::Error> {
        let content_type = row.content_type.parse::<ContentType>().map_err(|e: String| {
            AppError::internal("Corrupt redirection row", json!({ "slug": row.slug, "reason": e }))
        })?;
        let clicks = u64::try_from(row.clicks).map_err(|_| {
            AppError::internal(
                "Corrupt redirection row",
                json!({ "slug": row.slug, "reason": "negative click counter" }),
            )
        })?;

        Ok(RedirectRecord {
            slug: row.slug,
            url: row.url,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            keywords: row.keywords,
            site_name: row.site_name,
            content_type,
            canonical_url: row.canonical_url,
            author: row.author,
            clicks,
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_time: row.published_time,
            modified_time: row.modified_time,
        })
    }
}

#[derive(Deserialize)]
struct ChangePayload {
    slug: String,
    op: String,
}

fn parse_change(payload: &str) -> Option<ChangeEvent> {
    let parsed: ChangePayload = serde_json::from_str(payload).ok()?;
    let kind = parsed.op.parse::<ChangeKind>().ok()?;
    Some(ChangeEvent::new(parsed.slug, kind))
}

/// Turns a free-text query into an `ILIKE` pattern, escaping wildcards.
fn like_pattern(query: Option<&str>) -> Option<String> {
    let query = query.map(str::trim).filter(|q| !q.is_empty())?;
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

/// PostgreSQL repository for redirect records.
///
/// Click increments are a single `UPDATE ... SET clicks = clicks + 1`, so
/// concurrent followers on any number of instances never lose updates.
pub struct PgRedirectRepository {
    pool: Arc<PgPool>,
}

impl PgRedirectRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedirectRepository for PgRedirectRepository {
    async fn get(&self, slug: &str) -> Result<Option<RedirectRecord>, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {COLUMNS} FROM redirections WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(RedirectRecord::try_from).transpose()
    }

    async fn increment_clicks(&self, slug: &str) -> Result<Option<u64>, AppError> {
        let clicks: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE redirections
            SET clicks = clicks + 1, updated_at = NOW()
            WHERE slug = $1
            RETURNING clicks
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(clicks.map(|c| c.max(0) as u64))
    }

    async fn create(&self, new_redirect: NewRedirect) -> Result<RedirectRecord, AppError> {
        let slug = new_redirect.slug.clone();

        let result = sqlx::query_as::<_, RedirectRow>(&format!(
            r#"
            INSERT INTO redirections (
                slug, url, title, description, image_url, keywords, site_name,
                content_type, canonical_url, author, published_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&new_redirect.slug)
        .bind(&new_redirect.url)
        .bind(&new_redirect.title)
        .bind(&new_redirect.description)
        .bind(&new_redirect.image_url)
        .bind(&new_redirect.keywords)
        .bind(&new_redirect.site_name)
        .bind(new_redirect.content_type.as_str())
        .bind(&new_redirect.canonical_url)
        .bind(&new_redirect.author)
        .bind(new_redirect.published_time)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => row.try_into(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::conflict("Slug already exists", json!({ "slug": slug })),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, slug: &str, patch: RedirectPatch) -> Result<RedirectRecord, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            r#"
            UPDATE redirections
            SET url            = COALESCE($2, url),
                title          = COALESCE($3, title),
                description    = COALESCE($4, description),
                image_url      = COALESCE($5, image_url),
                keywords       = COALESCE($6, keywords),
                site_name      = COALESCE($7, site_name),
                content_type   = COALESCE($8, content_type),
                canonical_url  = COALESCE($9, canonical_url),
                author         = COALESCE($10, author),
                published_time = COALESCE($11, published_time),
                updated_at     = NOW(),
                modified_time  = NOW()
            WHERE slug = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(slug)
        .bind(patch.url)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.image_url)
        .bind(patch.keywords)
        .bind(patch.site_name)
        .bind(patch.content_type.map(|c| c.as_str()))
        .bind(patch.canonical_url)
        .bind(patch.author)
        .bind(patch.published_time)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::not_found(
                "Redirection not found",
                json!({ "slug": slug }),
            )),
        }
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM redirections WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<RedirectRecord>, AppError> {
        let order = match filter.sort {
            ListSort::Newest => "created_at DESC, slug",
            ListSort::Clicks => "clicks DESC, created_at DESC, slug",
        };

        let rows = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {COLUMNS} FROM redirections WHERE {SEARCH} ORDER BY {order} LIMIT $2 OFFSET $3"
        ))
        .bind(like_pattern(filter.query.as_deref()))
        .bind(i64::try_from(filter.limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(filter.offset).unwrap_or(i64::MAX))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(RedirectRecord::try_from).collect()
    }

    async fn count(&self, query: Option<String>) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM redirections WHERE {SEARCH}"
        ))
        .bind(like_pattern(query.as_deref()))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn reset_clicks(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE redirections SET clicks = 0, updated_at = NOW() WHERE slug = $1",
        )
        .bind(slug)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn watch(&self) -> Result<ChangeStream, AppError> {
        let mut listener = PgListener::connect_with(self.pool.as_ref()).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        debug!(channel = CHANGE_CHANNEL, "Listening for redirection changes");

        let stream = listener.into_stream().filter_map(|notification| async move {
            match notification {
                Ok(n) => {
                    let event = parse_change(n.payload());
                    if event.is_none() {
                        warn!(payload = n.payload(), "Ignoring malformed change notification");
                    }
                    event
                }
                Err(e) => {
                    warn!(error = %e, "Change listener error");
                    None
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("50%_off")).unwrap(), "%50\\%\\_off%");
        assert_eq!(like_pattern(Some(" rust ")).unwrap(), "%rust%");
        assert!(like_pattern(Some("  ")).is_none());
        assert!(like_pattern(None).is_none());
    }

    #[test]
    fn test_parse_change_payload() {
        let event = parse_change(r#"{"slug":"launch","op":"update"}"#).unwrap();
        assert_eq!(event, ChangeEvent::new("launch", ChangeKind::Updated));

        assert!(parse_change(r#"{"slug":"launch","op":"truncate"}"#).is_none());
        assert!(parse_change("not json").is_none());
    }

    #[test]
    fn test_row_with_negative_clicks_is_rejected() {
        let now = Utc::now();
        let row = RedirectRow {
            slug: "launch".to_string(),
            url: "https://example.com".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            image_url: "https://example.com/i.png".to_string(),
            keywords: String::new(),
            site_name: "s".to_string(),
            content_type: "website".to_string(),
            canonical_url: "https://example.com".to_string(),
            author: "a".to_string(),
            clicks: -1,
            created_at: now,
            updated_at: now,
            published_time: None,
            modified_time: None,
        };

        assert!(matches!(
            RedirectRecord::try_from(row),
            Err(AppError::Internal { .. })
        ));
    }
}
