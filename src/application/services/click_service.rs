//! Click accounting: dispatching click events and applying increments.
//!
//! Accounting is best-effort. Each followed redirect produces at most one
//! increment attempt, and no failure here is ever visible to the visitor.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;

/// Successful increment with the counter value the store reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledged {
    pub clicks: u64,
}

/// Reasons a click was not counted.
#[derive(Debug, thiserror::Error)]
pub enum AccountingFailure {
    #[error("redirection '{slug}' no longer exists")]
    RecordMissing { slug: String },
    #[error("click store error: {0}")]
    Store(#[source] AppError),
    #[error("click queue is full")]
    QueueFull,
    #[error("click worker is not running")]
    QueueClosed,
}

impl AccountingFailure {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RecordMissing { .. } => "record_missing",
            Self::Store(AppError::StoreUnavailable { .. }) => "store_unavailable",
            Self::Store(_) => "store_error",
            Self::QueueFull => "queue_full",
            Self::QueueClosed => "queue_closed",
        }
    }
}

/// Applies click increments through the record store's atomic primitive.
pub struct ClickService<R: RedirectRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: RedirectRepository + ?Sized> ClickService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Makes exactly one increment attempt for `slug`.
    ///
    /// The store adds one to the counter and stamps `updated_at` itself; the
    /// current count is never read into this process.
    ///
    /// # Errors
    ///
    /// Returns [`AccountingFailure::RecordMissing`] if the slug was deleted after
    /// it was resolved, and [`AccountingFailure::Store`] for store faults.
    pub async fn increment(&self, slug: &str) -> Result<Acknowledged, AccountingFailure> {
        match self.repository.increment_clicks(slug).await {
            Ok(Some(clicks)) => Ok(Acknowledged { clicks }),
            Ok(None) => Err(AccountingFailure::RecordMissing {
                slug: slug.to_string(),
            }),
            Err(e) => Err(AccountingFailure::Store(e)),
        }
    }

    /// Resets the counter of `slug` to zero.
    ///
    /// The only way besides [`Self::increment`] to change the counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist.
    pub async fn reset(&self, slug: &str) -> Result<(), AppError> {
        if self.repository.reset_clicks(slug).await? {
            Ok(())
        } else {
            Err(AppError::not_found(
                "Redirection not found",
                json!({ "slug": slug }),
            ))
        }
    }
}

/// Non-blocking hand-off of click events to the background worker.
#[derive(Clone)]
pub struct ClickDispatcher {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickDispatcher {
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self { sender }
    }

    /// Queues one click for `slug` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`AccountingFailure::QueueFull`] or [`AccountingFailure::QueueClosed`];
    /// the click is dropped in both cases.
    pub fn dispatch(&self, slug: &str) -> Result<(), AccountingFailure> {
        match self.sender.try_send(ClickEvent::new(slug)) {
            Ok(()) => {
                debug!(slug, "Click queued");
                metrics::counter!("click_dispatch_total", "outcome" => "queued").increment(1);
                Ok(())
            }
            Err(e) => {
                let failure = match e {
                    TrySendError::Full(_) => AccountingFailure::QueueFull,
                    TrySendError::Closed(_) => AccountingFailure::QueueClosed,
                };
                warn!(slug, reason = failure.kind(), "Click dropped before accounting");
                metrics::counter!("click_dispatch_total", "outcome" => failure.kind())
                    .increment(1);
                Err(failure)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockRedirectRepository;

    #[tokio::test]
    async fn test_increment_acknowledged() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .withf(|slug| slug == "launch")
            .times(1)
            .returning(|_| Ok(Some(3)));

        let service = ClickService::new(Arc::new(mock_repo));

        let ack = service.increment("launch").await.unwrap();
        assert_eq!(ack, Acknowledged { clicks: 3 });
    }

    #[tokio::test]
    async fn test_increment_missing_record() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(None));

        let service = ClickService::new(Arc::new(mock_repo));

        let err = service.increment("gone").await.unwrap_err();
        assert!(matches!(err, AccountingFailure::RecordMissing { ref slug } if slug == "gone"));
        assert_eq!(err.kind(), "record_missing");
    }

    #[tokio::test]
    async fn test_increment_store_failure() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));

        let service = ClickService::new(Arc::new(mock_repo));

        let err = service.increment("launch").await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
    }

    #[tokio::test]
    async fn test_increment_makes_single_attempt() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::internal("boom", json!({}))));
        mock_repo.expect_get().times(0);

        let service = ClickService::new(Arc::new(mock_repo));

        assert!(service.increment("launch").await.is_err());
    }

    #[tokio::test]
    async fn test_reset_not_found() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_reset_clicks()
            .times(1)
            .returning(|_| Ok(false));

        let service = ClickService::new(Arc::new(mock_repo));

        let err = service.reset("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_queues_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let dispatcher = ClickDispatcher::new(tx);

        dispatcher.dispatch("launch").unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.slug, "launch");
    }

    #[tokio::test]
    async fn test_dispatch_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let dispatcher = ClickDispatcher::new(tx);

        dispatcher.dispatch("a").unwrap();
        let err = dispatcher.dispatch("b").unwrap_err();
        assert!(matches!(err, AccountingFailure::QueueFull));
    }

    #[tokio::test]
    async fn test_dispatch_closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let dispatcher = ClickDispatcher::new(tx);

        assert!(dispatcher.is_closed());
        let err = dispatcher.dispatch("a").unwrap_err();
        assert!(matches!(err, AccountingFailure::QueueClosed));
    }
}
