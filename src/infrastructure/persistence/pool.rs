//! PostgreSQL connection pool setup.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::{Config, mask_connection_string};

/// Opens a pool using the `DB_*` pool settings, retrying failed attempts with
/// jittered exponential backoff (100ms base, capped at 10s).
///
/// # Errors
///
/// Returns the last connection error once `config.db_connect_retries` retries
/// are exhausted.
pub async fn connect_with_retry(
    config: &Config,
    database_url: &str,
) -> Result<PgPool, sqlx::Error> {
    // 100ms, 200ms, 400ms, ...
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(config.db_connect_retries);

    let mut attempt = 0u32;
    Retry::start(strategy, || {
        attempt += 1;
        let options = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime));
        let current = attempt;

        async move {
            options.connect(database_url).await.inspect_err(|e| {
                tracing::warn!(
                    attempt = current,
                    database = %mask_connection_string(database_url),
                    error = %e,
                    "Database connection attempt failed"
                );
            })
        }
    })
    .await
}
