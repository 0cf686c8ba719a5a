//! DTOs for redirection endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use validator::{Validate, ValidationError};

use crate::api::dto::pagination::{PageInfo, PaginationParams};
use crate::application::services::{CreateRedirect, PreviewPayload};
use crate::domain::entities::{ContentType, ListSort, RedirectPatch, RedirectRecord};
use crate::utils::slug::SLUG_REGEX;

/// Empty means "reset to default"; anything else must be a URL.
fn empty_or_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || url::Url::parse(value).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Invalid URL format".into()))
    }
}

/// Query string of `GET /redirections/{slug}`.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectionQuery {
    /// Only the exact value `true` follows the redirect.
    pub redirect: Option<String>,
}

/// Request body for `POST /api/redirections`.
///
/// Empty strings in optional fields count as absent, so the writer defaults apply.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRedirectRequest {
    /// Derived from `title` when omitted.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    #[validate(regex(path = "*SLUG_REGEX", message = "Slug must match ^[a-z0-9-]+$"))]
    pub slug: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    #[validate(length(min = 1, max = 160))]
    pub title: String,

    #[validate(length(min = 1, max = 300))]
    pub description: String,

    #[validate(url(message = "Invalid URL format"))]
    pub image_url: String,

    #[validate(length(min = 1))]
    pub keywords: String,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub site_name: Option<String>,

    #[serde(default)]
    pub content_type: ContentType,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(url(message = "Invalid URL format"))]
    pub canonical_url: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub author: Option<String>,

    pub published_time: Option<DateTime<Utc>>,
}

impl From<CreateRedirectRequest> for CreateRedirect {
    fn from(req: CreateRedirectRequest) -> Self {
        Self {
            slug: req.slug,
            url: req.url,
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            keywords: req.keywords,
            site_name: req.site_name,
            content_type: req.content_type,
            canonical_url: req.canonical_url,
            author: req.author,
            published_time: req.published_time,
        }
    }
}

/// Request body for `PATCH /api/redirections/{slug}`.
///
/// Absent fields are left unchanged. An empty `canonical_url` resets it to the
/// destination URL; an empty `author` or `site_name` resets it to the default.
/// The click counter cannot be set here.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateRedirectRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    #[validate(length(min = 1, max = 160))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 300))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub image_url: Option<String>,

    #[validate(length(min = 1))]
    pub keywords: Option<String>,

    pub site_name: Option<String>,

    pub content_type: Option<ContentType>,

    #[validate(custom(function = "empty_or_url"))]
    pub canonical_url: Option<String>,

    pub author: Option<String>,

    pub published_time: Option<DateTime<Utc>>,
}

impl From<UpdateRedirectRequest> for RedirectPatch {
    fn from(req: UpdateRedirectRequest) -> Self {
        Self {
            url: req.url,
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            keywords: req.keywords,
            site_name: req.site_name,
            content_type: req.content_type,
            canonical_url: req.canonical_url,
            author: req.author,
            published_time: req.published_time,
        }
    }
}

/// Full record as seen by administrators.
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub keywords: Vec<String>,
    pub site_name: String,
    pub content_type: ContentType,
    pub canonical_url: String,
    pub author: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
}

impl From<RedirectRecord> for RedirectResponse {
    fn from(record: RedirectRecord) -> Self {
        let keywords = record.keyword_tags();
        Self {
            slug: record.slug,
            url: record.url,
            title: record.title,
            description: record.description,
            image_url: record.image_url,
            keywords,
            site_name: record.site_name,
            content_type: record.content_type,
            canonical_url: record.canonical_url,
            author: record.author,
            clicks: record.clicks,
            created_at: record.created_at,
            updated_at: record.updated_at,
            published_time: record.published_time,
            modified_time: record.modified_time,
        }
    }
}

/// Interstitial page metadata. The destination URL is only revealed by following.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub keywords: String,
    pub site_name: String,
    pub content_type: ContentType,
    pub canonical_url: String,
    pub author: String,
    pub published_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub clicks: u64,
    pub follow_url: String,
}

impl PreviewResponse {
    pub fn new(payload: PreviewPayload, follow_url: String) -> Self {
        Self {
            slug: payload.slug,
            title: payload.title,
            description: payload.description,
            image_url: payload.image_url,
            keywords: payload.keywords,
            site_name: payload.site_name,
            content_type: payload.content_type,
            canonical_url: payload.canonical_url,
            author: payload.author,
            published_time: payload.published_time,
            modified_time: payload.modified_time,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            clicks: payload.clicks,
            follow_url,
        }
    }
}

/// Query string of `GET /redirections` and `GET /api/redirections`.
#[derive(Debug, Default, Deserialize)]
pub struct ListRedirectsParams {
    /// Case-insensitive substring over slug, title, description, keywords and
    /// content type.
    pub q: Option<String>,

    #[serde(default)]
    pub sort: ListSort,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// One page of redirections.
#[derive(Debug, Serialize)]
pub struct RedirectListResponse {
    pub items: Vec<RedirectResponse>,
    pub pagination: PageInfo,
}

/// Public listing entry. Like the preview, it does not reveal the destination.
#[derive(Debug, Serialize)]
pub struct RedirectSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub keywords: String,
    pub site_name: String,
    pub content_type: ContentType,
    pub clicks: u64,
    pub preview_url: String,
    pub follow_url: String,
}

impl RedirectSummary {
    pub fn new(record: RedirectRecord, preview_url: String, follow_url: String) -> Self {
        Self {
            slug: record.slug,
            title: record.title,
            description: record.description,
            image_url: record.image_url,
            keywords: record.keywords,
            site_name: record.site_name,
            content_type: record.content_type,
            clicks: record.clicks,
            preview_url,
            follow_url,
        }
    }
}

/// One page of the public listing.
#[derive(Debug, Serialize)]
pub struct RedirectSummaryListResponse {
    pub items: Vec<RedirectSummary>,
    pub pagination: PageInfo,
}
