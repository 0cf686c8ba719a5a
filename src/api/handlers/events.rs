//! Server-Sent Events stream of redirection changes.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt};

use crate::error::AppError;
use crate::state::AppState;

/// Streams record changes to administrators.
///
/// # Endpoint
///
/// `GET /api/events`
///
/// Each event is named after the change kind (`created`, `updated`, `deleted`)
/// and carries `{"slug": "...", "kind": "..."}` as data. Click increments show
/// up as `updated`. The stream ends when the server begins shutting down.
///
/// # Errors
///
/// Returns `503` if the record store cannot be watched.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let changes = state.admin_service.watch().await?;
    let shutdown = state.shutdown.clone();

    let events = changes
        .take_until(async move { shutdown.triggered().await })
        .map(|change| {
            Event::default()
                .event(change.kind.as_str())
                .json_data(&change)
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
