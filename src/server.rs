//! HTTP server initialization and runtime setup.
//!
//! Selects the record store, runs migrations, spawns the click worker and
//! drives the Axum server until a shutdown signal arrives.

use crate::api::middleware::rate_limit::RateLimit;
use crate::application::services::{WriterDefaults, generate_token, hash_token, token_hint};
use crate::config::{Config, StoreBackend};
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{RedirectRepository, TokenRepository};
use crate::infrastructure::persistence::{
    MemoryRedirectRepository, MemoryTokenRepository, PgRedirectRepository, PgTokenRepository,
    UnavailableRedirectRepository, connect_with_retry,
};
use crate::routes::app_router;
use crate::state::{AppState, Shutdown};

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

type Stores = (Arc<dyn RedirectRepository>, Arc<dyn TokenRepository>);

/// Stores used when the record store cannot be reached.
///
/// The token store is empty, so the admin API answers 401 until the service
/// is restarted with a working database.
fn unavailable(reason: &str) -> Stores {
    tracing::error!(reason, "Record store unavailable, every slug will resolve to 404");
    (
        Arc::new(UnavailableRedirectRepository::new(reason)),
        Arc::new(MemoryTokenRepository::new()),
    )
}

/// Registers the admin token of the in-memory store.
///
/// The admin CLI cannot reach a process-local store. `ADMIN_TOKEN` is used when
/// set; otherwise a token is generated and written once to stderr. Logs only
/// carry a hint of the token. Returns the registered token.
async fn issue_memory_admin_token(
    tokens: &MemoryTokenRepository,
    config: &Config,
) -> Option<String> {
    let (token, generated) = match &config.admin_token {
        Some(token) => (token.clone(), false),
        None => (generate_token(), true),
    };

    if let Err(e) = tokens
        .create_token("dev", &hash_token(&config.token_signing_secret, &token))
        .await
    {
        tracing::error!(error = %e, "Failed to issue admin token");
        return None;
    }

    if generated {
        eprintln!("Admin token for the in-memory store: {token}");
        tracing::warn!(
            hint = %token_hint(&token),
            "Generated admin token written to stderr; set ADMIN_TOKEN to choose one"
        );
    } else {
        tracing::info!(hint = %token_hint(&token), "Admin token loaded from ADMIN_TOKEN");
    }

    Some(token)
}

/// Builds the record and token stores for the configured backend.
///
/// Never fails: a missing or unreachable database yields the unavailable store.
async fn build_stores(config: &Config) -> Stores {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let tokens = MemoryTokenRepository::new();
            issue_memory_admin_token(&tokens, config).await;

            (Arc::new(MemoryRedirectRepository::new()), Arc::new(tokens))
        }
        StoreBackend::Postgres => {
            let Some(database_url) = config.database_url.as_deref() else {
                return unavailable("database is not configured");
            };

            let pool = match connect_with_retry(config, database_url).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database");
                    return unavailable("database connection failed");
                }
            };
            tracing::info!("Connected to database");

            if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                tracing::error!(error = %e, "Failed to run migrations");
                return unavailable("database migrations failed");
            }

            let pool = Arc::new(pool);
            (
                Arc::new(PgRedirectRepository::new(Arc::clone(&pool))),
                Arc::new(PgTokenRepository::new(pool)),
            )
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// On shutdown, stops accepting requests, ends open event streams, lets the
/// click worker drain queued clicks, then returns.
///
/// # Errors
///
/// Returns an error if the listen address is invalid, the bind fails, or the
/// server stops with an I/O error.
pub async fn run(config: Config) -> Result<()> {
    let (repository, tokens) = build_stores(&config).await;

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    let state = AppState::new(
        repository,
        tokens,
        click_tx,
        config.token_signing_secret.clone(),
        WriterDefaults {
            author: config.default_author.clone(),
            site_name: config.default_site_name.clone(),
        },
        config.public_base_url.clone(),
    );

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        Arc::clone(&state.click_service),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.click_worker_concurrency,
        "Click worker started"
    );

    // Only the flag is kept here: the worker drains once the router drops the state.
    let shutdown = state.shutdown.clone();
    let app = app_router(state, RateLimit::from_config(config.behind_proxy));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(stop_on_signal(shutdown))
    .await?;

    // The router held the last click senders; the worker exits once drained.
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Click worker panicked");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Waits for a termination signal, then tells long-lived responses to finish.
///
/// Graceful shutdown waits for every open connection, so streams that never end
/// on their own would hold the server open.
async fn stop_on_signal(shutdown: Shutdown) {
    shutdown_signal().await;
    shutdown.trigger();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
