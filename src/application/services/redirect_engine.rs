//! Redirect decision engine: preview or follow.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::services::click_service::ClickDispatcher;
use crate::application::services::resolve_service::ResolveService;
use crate::domain::entities::{ContentType, RedirectRecord};
use crate::domain::repositories::RedirectRepository;

/// What the visitor asked for.
///
/// Derived per request from the `redirect` query parameter; nothing is kept
/// between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Preview,
    Follow,
}

impl Intent {
    /// Only the exact string `"true"` asks to follow.
    pub fn from_redirect_param(value: Option<&str>) -> Self {
        match value {
            Some("true") => Self::Follow,
            _ => Self::Preview,
        }
    }
}

/// Presentation metadata shown on the interstitial page.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPayload {
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
}

impl From<RedirectRecord> for PreviewPayload {
    fn from(record: RedirectRecord) -> Self {
        Self {
            slug: record.slug,
            title: record.title,
            description: record.description,
            image_url: record.image_url,
            keywords: record.keywords,
            site_name: record.site_name,
            content_type: record.content_type,
            canonical_url: record.canonical_url,
            author: record.author,
            published_time: record.published_time,
            modified_time: record.modified_time,
            created_at: record.created_at,
            updated_at: record.updated_at,
            clicks: record.clicks,
        }
    }
}

/// Destination a followed slug redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub url: String,
}

/// Result of handling one request for a slug.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NotFound,
    Preview(PreviewPayload),
    Redirect(RedirectTarget),
}

/// Turns a resolved slug and the visitor's intent into a response outcome.
///
/// Following triggers click accounting without waiting for it: the redirect
/// target is returned whether or not the click is ever counted.
pub struct RedirectEngine<R: RedirectRepository + ?Sized> {
    resolver: Arc<ResolveService<R>>,
    clicks: ClickDispatcher,
}

impl<R: RedirectRepository + ?Sized> RedirectEngine<R> {
    pub fn new(resolver: Arc<ResolveService<R>>, clicks: ClickDispatcher) -> Self {
        Self { resolver, clicks }
    }

    /// Resolves `slug` and decides the outcome for `intent`.
    pub async fn handle(&self, slug: &str, intent: Intent) -> Outcome {
        let record = self.resolver.resolve(slug).await;
        self.decide(record, intent)
    }

    /// Decides the outcome for an already resolved record.
    ///
    /// A missing record short-circuits to [`Outcome::NotFound`] before the
    /// intent is looked at. No retries happen here.
    pub fn decide(&self, record: Option<RedirectRecord>, intent: Intent) -> Outcome {
        let Some(record) = record else {
            return Outcome::NotFound;
        };

        match intent {
            Intent::Preview => Outcome::Preview(record.into()),
            Intent::Follow => {
                // Dispatch failures are already logged by the dispatcher.
                let _ = self.clicks.dispatch(&record.slug);
                Outcome::Redirect(RedirectTarget { url: record.url })
            }
        }
    }
}
