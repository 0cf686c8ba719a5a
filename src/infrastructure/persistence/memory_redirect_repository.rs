//! In-process redirect record store.
//!
//! Used for local development (`STORE_BACKEND=memory`) and tests. State lives in
//! a single process, so it is only suitable for one instance.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};
use tracing::warn;

use crate::domain::entities::{
    ChangeEvent, ChangeKind, ListFilter, ListSort, NewRedirect, RedirectPatch, RedirectRecord,
};
use crate::domain::repositories::{ChangeStream, RedirectRepository};
use crate::error::AppError;

const CHANGE_BUFFER: usize = 256;

/// Redirect records kept in a `HashMap` behind an async `RwLock`.
///
/// Every mutation happens under the write lock, which makes the click increment
/// atomic with respect to other writers.
pub struct MemoryRedirectRepository {
    records: RwLock<HashMap<String, RedirectRecord>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryRedirectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRedirectRepository {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            records: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn publish(&self, slug: &str, kind: ChangeKind) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeEvent::new(slug, kind));
    }

    fn filtered(
        records: &HashMap<String, RedirectRecord>,
        query: Option<&str>,
    ) -> Vec<RedirectRecord> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        records
            .values()
            .filter(|r| query.is_none_or(|q| r.matches_query(q)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RedirectRepository for MemoryRedirectRepository {
    async fn get(&self, slug: &str) -> Result<Option<RedirectRecord>, AppError> {
        Ok(self.records.read().await.get(slug).cloned())
    }

    async fn increment_clicks(&self, slug: &str) -> Result<Option<u64>, AppError> {
        let clicks = {
            let mut records = self.records.write().await;
            let Some(record) = records.get_mut(slug) else {
                return Ok(None);
            };
            record.clicks += 1;
            record.updated_at = Utc::now();
            record.clicks
        };

        self.publish(slug, ChangeKind::Updated);
        Ok(Some(clicks))
    }

    async fn create(&self, new_redirect: NewRedirect) -> Result<RedirectRecord, AppError> {
        let record = {
            let mut records = self.records.write().await;
            if records.contains_key(&new_redirect.slug) {
                return Err(AppError::conflict(
                    "Slug already exists",
                    json!({ "slug": new_redirect.slug }),
                ));
            }

            let now = Utc::now();
            let record = RedirectRecord {
                slug: new_redirect.slug,
                url: new_redirect.url,
                title: new_redirect.title,
                description: new_redirect.description,
                image_url: new_redirect.image_url,
                keywords: new_redirect.keywords,
                site_name: new_redirect.site_name,
                content_type: new_redirect.content_type,
                canonical_url: new_redirect.canonical_url,
                author: new_redirect.author,
                clicks: 0,
                created_at: now,
                updated_at: now,
                published_time: new_redirect.published_time,
                modified_time: None,
            };
            records.insert(record.slug.clone(), record.clone());
            record
        };

        self.publish(&record.slug, ChangeKind::Created);
        Ok(record)
    }

    async fn update(&self, slug: &str, patch: RedirectPatch) -> Result<RedirectRecord, AppError> {
        let record = {
            let mut records = self.records.write().await;
            let Some(record) = records.get_mut(slug) else {
                return Err(AppError::not_found(
                    "Redirection not found",
                    json!({ "slug": slug }),
                ));
            };

            if let Some(url) = patch.url {
                record.url = url;
            }
            if let Some(title) = patch.title {
                record.title = title;
            }
            if let Some(description) = patch.description {
                record.description = description;
            }
            if let Some(image_url) = patch.image_url {
                record.image_url = image_url;
            }
            if let Some(keywords) = patch.keywords {
                record.keywords = keywords;
            }
            if let Some(site_name) = patch.site_name {
                record.site_name = site_name;
            }
            if let Some(content_type) = patch.content_type {
                record.content_type = content_type;
            }
            if let Some(canonical_url) = patch.canonical_url {
                record.canonical_url = canonical_url;
            }
            if let Some(author) = patch.author {
                record.author = author;
            }
            if let Some(published_time) = patch.published_time {
                record.published_time = Some(published_time);
            }

            let now = Utc::now();
            record.updated_at = now;
            record.modified_time = Some(now);
            record.clone()
        };

        self.publish(slug, ChangeKind::Updated);
        Ok(record)
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        let removed = self.records.write().await.remove(slug).is_some();
        if removed {
            self.publish(slug, ChangeKind::Deleted);
        }
        Ok(removed)
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<RedirectRecord>, AppError> {
        let mut items = Self::filtered(&*self.records.read().await, filter.query.as_deref());

        match filter.sort {
            ListSort::Newest => items.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| a.slug.cmp(&b.slug))
            }),
            ListSort::Clicks => items.sort_by(|a, b| {
                b.clicks
                    .cmp(&a.clicks)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| a.slug.cmp(&b.slug))
            }),
        }

        let offset = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
        Ok(items.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, query: Option<String>) -> Result<u64, AppError> {
        let records = self.records.read().await;
        Ok(Self::filtered(&records, query.as_deref()).len() as u64)
    }

    async fn reset_clicks(&self, slug: &str) -> Result<bool, AppError> {
        {
            let mut records = self.records.write().await;
            let Some(record) = records.get_mut(slug) else {
                return Ok(false);
            };
            record.clicks = 0;
            record.updated_at = Utc::now();
        }

        self.publish(slug, ChangeKind::Updated);
        Ok(true)
    }

    async fn watch(&self) -> Result<ChangeStream, AppError> {
        let rx = self.changes.subscribe();

        let changes = stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Change subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(changes.boxed())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
