//! Background worker that applies queued clicks to the record store.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::application::services::ClickService;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::RedirectRepository;

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` increments are in flight at once. Each event gets one
/// attempt; failures are logged and counted, never retried. When the channel
/// closes, in-flight increments are awaited before returning.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    clicks: Arc<ClickService<R>>,
    concurrency: usize,
) where
    R: RedirectRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };

        // Reap finished tasks so the set does not grow without bound.
        while in_flight.try_join_next().is_some() {}

        let clicks = Arc::clone(&clicks);
        in_flight.spawn(async move {
            let _permit = permit;
            apply(&clicks, event).await;
        });
    }

    debug!(pending = in_flight.len(), "Click queue closed, draining");
    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn apply<R>(clicks: &ClickService<R>, event: ClickEvent)
where
    R: RedirectRepository + ?Sized,
{
    let latency = event.queue_latency(Utc::now());
    metrics::histogram!("click_queue_latency_seconds").record(latency.as_secs_f64());

    match clicks.increment(&event.slug).await {
        Ok(ack) => {
            info!(
                slug = %event.slug,
                clicks = ack.clicks,
                queued_ms = latency.as_millis() as u64,
                "Click counted"
            );
            metrics::counter!("click_accounting_total", "outcome" => "acknowledged").increment(1);
        }
        Err(failure) => {
            warn!(
                slug = %event.slug,
                reason = failure.kind(),
                queued_ms = latency.as_millis() as u64,
                error = %failure,
                "Click not counted"
            );
            metrics::counter!("click_accounting_total", "outcome" => failure.kind())
                .increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockRedirectRepository;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_worker_applies_every_event() {
        let counter = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&counter);

        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .times(5)
            .returning(move |_| Ok(Some(seen.fetch_add(1, Ordering::SeqCst) + 1)));

        let clicks = Arc::new(ClickService::new(Arc::new(mock_repo)));
        let (tx, rx) = mpsc::channel(16);

        for _ in 0..5 {
            tx.send(ClickEvent::new("launch")).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, clicks, 2).await;

        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_worker_survives_failures() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .withf(|slug| slug == "broken")
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));
        mock_repo
            .expect_increment_clicks()
            .withf(|slug| slug == "gone")
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_increment_clicks()
            .withf(|slug| slug == "launch")
            .times(1)
            .returning(|_| Ok(Some(1)));

        let clicks = Arc::new(ClickService::new(Arc::new(mock_repo)));
        let (tx, rx) = mpsc::channel(16);

        for slug in ["broken", "gone", "launch"] {
            tx.send(ClickEvent::new(slug)).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, clicks, 1).await;
    }

    #[tokio::test]
    async fn test_worker_zero_concurrency_still_runs() {
        let mut mock_repo = MockRedirectRepository::new();
        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(Some(1)));

        let clicks = Arc::new(ClickService::new(Arc::new(mock_repo)));
        let (tx, rx) = mpsc::channel(1);
        tx.send(ClickEvent::new("launch")).await.unwrap();
        drop(tx);

        run_click_worker(rx, clicks, 0).await;
    }
}
