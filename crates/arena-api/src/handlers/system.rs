use std::{convert::Infallible, sync::Arc, time::Duration};

use arena_core::{ChangeEvent, Principal};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::Stream;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{debug, warn};

use crate::models::HealthResponse;
use crate::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        listeners: state.service.notifier().subscriber_count(),
    })
}

/// Principal behind the current session
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Authenticated principal", body = Principal),
        (status = 401, description = "Not authenticated", body = crate::models::ErrorResponse)
    ),
    tag = "system"
)]
pub async fn current_principal(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

/// Stream of change events as server-sent events
///
/// Each event is named `change` and carries a [`ChangeEvent`] telling the
/// client which collections to re-fetch.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Server-sent change events", content_type = "text/event-stream", body = ChangeEvent),
        (status = 401, description = "Not authenticated", body = crate::models::ErrorResponse)
    ),
    tag = "system"
)]
pub async fn change_events(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("{} subscribed to change events", principal.id);

    let stream = BroadcastStream::new(state.service.subscribe()).filter_map(|message| {
        match message {
            Ok(change) => match Event::default().event("change").json_data(&change) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("Failed to encode change event: {}", e);
                    None
                }
            },
            // Clients re-fetch on the next event anyway
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Change event listener lagged, skipped {} events", skipped);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
