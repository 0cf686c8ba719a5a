//! Administrator operations on redirect records.
//!
//! This is the writer side: it applies the write-time defaults (canonical URL,
//! author, site name) so readers can surface stored values verbatim. It never
//! writes the click counter; see
//! [`ClickService::reset`](crate::application::services::ClickService::reset).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::domain::entities::{ContentType, ListFilter, NewRedirect, RedirectPatch, RedirectRecord};
use crate::domain::repositories::{ChangeStream, RedirectRepository};
use crate::error::AppError;
use crate::utils::slug::{slugify, validate_slug};

/// Fallback values the writer fills in when a field is left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterDefaults {
    pub author: String,
    pub site_name: String,
}

impl Default for WriterDefaults {
    fn default() -> Self {
        Self {
            author: "thisisio".to_string(),
            site_name: "thisisio".to_string(),
        }
    }
}

/// Validated creation input.
///
/// `slug` is derived from `title` when absent. Empty optional strings are
/// treated as absent.
#[derive(Debug, Clone, Default)]
pub struct CreateRedirect {
    pub slug: Option<String>,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub keywords: String,
    pub site_name: Option<String>,
    pub content_type: ContentType,
    pub canonical_url: Option<String>,
    pub author: Option<String>,
    pub published_time: Option<DateTime<Utc>>,
}

/// One page of records plus the total number matching the query.
#[derive(Debug, Clone)]
pub struct RedirectPage {
    pub items: Vec<RedirectRecord>,
    pub total: u64,
}

/// Create, edit, delete, list and watch redirect records.
pub struct RedirectAdminService<R: RedirectRepository + ?Sized> {
    repository: Arc<R>,
    defaults: WriterDefaults,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn not_found(slug: &str) -> AppError {
    AppError::not_found("Redirection not found", json!({ "slug": slug }))
}

impl<R: RedirectRepository + ?Sized> RedirectAdminService<R> {
    pub fn new(repository: Arc<R>, defaults: WriterDefaults) -> Self {
        Self {
            repository,
            defaults,
        }
    }

    /// Creates a record with `clicks = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if no valid slug can be given or derived,
    /// and [`AppError::Conflict`] if the slug is already taken.
    pub async fn create(&self, input: CreateRedirect) -> Result<RedirectRecord, AppError> {
        let slug = match non_blank(input.slug) {
            Some(slug) => slug,
            None => slugify(&input.title),
        };
        validate_slug(&slug)?;

        let canonical_url = non_blank(input.canonical_url).unwrap_or_else(|| input.url.clone());
        let author = non_blank(input.author).unwrap_or_else(|| self.defaults.author.clone());
        let site_name =
            non_blank(input.site_name).unwrap_or_else(|| self.defaults.site_name.clone());

        let new_redirect = NewRedirect {
            slug,
            url: input.url,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            keywords: input.keywords,
            site_name,
            content_type: input.content_type,
            canonical_url,
            author,
            published_time: Some(input.published_time.unwrap_or_else(Utc::now)),
        };

        let record = self.repository.create(new_redirect).await?;
        info!(slug = %record.slug, "Redirection created");
        Ok(record)
    }

    /// Retrieves a record for administrators.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist. Store faults
    /// are returned as-is rather than masked.
    pub async fn get(&self, slug: &str) -> Result<RedirectRecord, AppError> {
        self.repository
            .get(slug)
            .await?
            .ok_or_else(|| not_found(slug))
    }

    /// Applies a metadata patch.
    ///
    /// An empty canonical URL resets it to the (possibly new) destination URL;
    /// an empty author or site name resets it to the configured default.
    ///
    /// # Errors
    ///
    /// Returns a validation error from [`AppError::bad_request`] for an empty patch and
    /// [`AppError::NotFound`] if the slug does not exist.
    pub async fn update(
        &self,
        slug: &str,
        mut patch: RedirectPatch,
    ) -> Result<RedirectRecord, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "slug": slug }),
            ));
        }

        if patch.canonical_url.as_deref().is_some_and(|c| c.trim().is_empty()) {
            let url = match patch.url.clone() {
                Some(url) => url,
                None => self.get(slug).await?.url,
            };
            patch.canonical_url = Some(url);
        }

        if patch.author.as_deref().is_some_and(|a| a.trim().is_empty()) {
            patch.author = Some(self.defaults.author.clone());
        }

        if patch.site_name.as_deref().is_some_and(|s| s.trim().is_empty()) {
            patch.site_name = Some(self.defaults.site_name.clone());
        }

        let record = self.repository.update(slug, patch).await?;
        info!(slug, "Redirection updated");
        Ok(record)
    }

    /// Deletes a record immediately and permanently.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist.
    pub async fn delete(&self, slug: &str) -> Result<(), AppError> {
        if !self.repository.delete(slug).await? {
            return Err(not_found(slug));
        }

        info!(slug, "Redirection deleted");
        Ok(())
    }

    /// Lists records with an optional substring filter.
    pub async fn list(&self, filter: ListFilter) -> Result<RedirectPage, AppError> {
        let total = self.repository.count(filter.query.clone()).await?;
        let items = self.repository.list(filter).await?;
        Ok(RedirectPage { items, total })
    }

    /// Subscribes to record changes.
    pub async fn watch(&self) -> Result<ChangeStream, AppError> {
        self.repository.watch().await
    }
}
