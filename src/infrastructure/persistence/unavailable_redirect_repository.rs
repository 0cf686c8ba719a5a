//! Record store stand-in used when no backend could be configured.
//!
//! Keeping the process up with this store lets visitors get ordinary 404s
//! instead of a crash, while every call is logged as a store fault upstream.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::entities::{ListFilter, NewRedirect, RedirectPatch, RedirectRecord};
use crate::domain::repositories::{ChangeStream, RedirectRepository};
use crate::error::AppError;

/// Fails every operation with [`AppError::StoreUnavailable`].
pub struct UnavailableRedirectRepository {
    reason: String,
}

impl UnavailableRedirectRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn error(&self) -> AppError {
        AppError::store_unavailable(
            "Record store is not available",
            json!({ "reason": self.reason }),
        )
    }
}

#[async_trait]
impl RedirectRepository for UnavailableRedirectRepository {
    async fn get(&self, _slug: &str) -> Result<Option<RedirectRecord>, AppError> {
        Err(self.error())
    }

    async fn increment_clicks(&self, _slug: &str) -> Result<Option<u64>, AppError> {
        Err(self.error())
    }

    async fn create(&self, _new_redirect: NewRedirect) -> Result<RedirectRecord, AppError> {
        Err(self.error())
    }

    async fn update(&self, _slug: &str, _patch: RedirectPatch) -> Result<RedirectRecord, AppError> {
        Err(self.error())
    }

    async fn delete(&self, _slug: &str) -> Result<bool, AppError> {
        Err(self.error())
    }

    async fn list(&self, _filter: ListFilter) -> Result<Vec<RedirectRecord>, AppError> {
        Err(self.error())
    }

    async fn count(&self, _query: Option<String>) -> Result<u64, AppError> {
        Err(self.error())
    }

    async fn reset_clicks(&self, _slug: &str) -> Result<bool, AppError> {
        Err(self.error())
    }

    async fn watch(&self) -> Result<ChangeStream, AppError> {
        Err(self.error())
    }

    async fn health_check(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_operation_is_unavailable() {
        let repo = UnavailableRedirectRepository::new("DATABASE_URL is not set");

        assert!(matches!(
            repo.get("launch").await.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));
        assert!(matches!(
            repo.increment_clicks("launch").await.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));
        assert!(repo.watch().await.is_err());
        assert!(!repo.health_check().await);
        assert_eq!(repo.reason(), "DATABASE_URL is not set");
    }
}
