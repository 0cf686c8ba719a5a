//! Record store contract for redirect records.

use crate::domain::entities::{ChangeEvent, ListFilter, NewRedirect, RedirectPatch, RedirectRecord};
use crate::error::AppError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Lazy stream of change notifications returned by [`RedirectRepository::watch`].
pub type ChangeStream = BoxStream<'static, ChangeEvent>;

/// Durable storage of redirect records keyed by slug.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRedirectRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryRedirectRepository`] - in-process map
/// - [`crate::infrastructure::persistence::UnavailableRedirectRepository`] - store not configured
///
/// Every method may fail with [`AppError::StoreUnavailable`] when the backend
/// cannot be reached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectRepository: Send + Sync {
    /// Fetches a record by its exact slug.
    ///
    /// Returns `Ok(None)` when no record exists under that key.
    async fn get(&self, slug: &str) -> Result<Option<RedirectRecord>, AppError>;

    /// Adds one to the click counter and stamps `updated_at` in one atomic step.
    ///
    /// Returns the new counter value, or `Ok(None)` if the slug does not exist.
    /// Implementations must not read the counter into the process and write it back.
    async fn increment_clicks(&self, slug: &str) -> Result<Option<u64>, AppError>;

    /// Inserts a new record with `clicks = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is already taken; an existing
    /// record is never overwritten.
    async fn create(&self, new_redirect: NewRedirect) -> Result<RedirectRecord, AppError>;

    /// Applies a metadata patch, stamping `updated_at` and `modified_time`.
    ///
    /// The click counter is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist.
    async fn update(&self, slug: &str, patch: RedirectPatch) -> Result<RedirectRecord, AppError>;

    /// Permanently removes a record. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, slug: &str) -> Result<bool, AppError>;

    /// Lists records matching the filter.
    async fn list(&self, filter: ListFilter) -> Result<Vec<RedirectRecord>, AppError>;

    /// Counts records matching an optional substring query.
    async fn count(&self, query: Option<String>) -> Result<u64, AppError>;

    /// Sets the click counter back to zero. Returns `Ok(false)` if the slug does not exist.
    async fn reset_clicks(&self, slug: &str) -> Result<bool, AppError>;

    /// Subscribes to change notifications for all records.
    async fn watch(&self) -> Result<ChangeStream, AppError>;

    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> bool;
}
