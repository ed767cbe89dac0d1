use std::sync::Arc;

use arena_core::{Outcome, Principal, WatchPartyInput, WatchPartyView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::{identity, read_failed, respond, unauthenticated, ApiError, OutcomeResponse};
use crate::models::{search, AttendeeCount, ErrorResponse, WatchPartySearch};
use crate::AppState;

/// Watch parties the caller attends
#[utoipa::path(
    get,
    path = "/api/watch-parties/mine",
    responses(
        (status = 200, description = "Attended watch parties", body = Vec<WatchPartyView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "watch-parties"
)]
pub async fn my_watch_parties(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<WatchPartyView>>, ApiError> {
    state
        .service
        .my_watch_parties(&identity(principal))
        .await
        .map(Json)
        .map_err(read_failed)
}

#[utoipa::path(
    get,
    path = "/api/watch-parties",
    params(WatchPartySearch),
    responses(
        (status = 200, description = "Watch parties the caller can join", body = Vec<WatchPartyView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "watch-parties"
)]
pub async fn available_watch_parties(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<WatchPartySearch>,
) -> Result<Json<Vec<WatchPartyView>>, ApiError> {
    let filter = search(query.field, query.q);
    state
        .service
        .available_watch_parties(&identity(principal), filter.as_ref())
        .await
        .map(Json)
        .map_err(read_failed)
}

#[utoipa::path(
    get,
    path = "/api/watch-parties/{id}/attendees",
    params(("id" = i32, Path, description = "Watch party ID")),
    responses(
        (status = 200, description = "Current occupancy", body = AttendeeCount),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "watch-parties"
)]
pub async fn attendee_count(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<AttendeeCount>, ApiError> {
    let count = state
        .service
        .attendee_count(&identity(principal), id)
        .await
        .map_err(read_failed)?;
    Ok(Json(AttendeeCount {
        watch_party_id: id,
        count,
    }))
}

/// Create a watch party; the organizer takes the first seat
#[utoipa::path(
    post,
    path = "/api/watch-parties",
    request_body = WatchPartyInput,
    responses(
        (status = 201, description = "Watch party created", body = Outcome),
        (status = 400, description = "Invalid input", body = Outcome),
        (status = 404, description = "Tournament not found", body = Outcome)
    ),
    tag = "watch-parties"
)]
pub async fn create_watch_party(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<WatchPartyInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .create_watch_party(&identity(principal), input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/api/watch-parties/{id}",
    params(("id" = i32, Path, description = "Watch party ID")),
    request_body = WatchPartyInput,
    responses(
        (status = 200, description = "Watch party updated", body = Outcome),
        (status = 400, description = "Invalid input or capacity below occupancy", body = Outcome),
        (status = 403, description = "Not the organizer", body = Outcome),
        (status = 404, description = "Watch party not found", body = Outcome)
    ),
    tag = "watch-parties"
)]
pub async fn update_watch_party(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Json(input): Json<WatchPartyInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .update_watch_party(&identity(principal), id, input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    delete,
    path = "/api/watch-parties/{id}",
    params(("id" = i32, Path, description = "Watch party ID")),
    responses(
        (status = 200, description = "Watch party deleted", body = Outcome),
        (status = 403, description = "Not the organizer", body = Outcome),
        (status = 404, description = "Watch party not found", body = Outcome)
    ),
    tag = "watch-parties"
)]
pub async fn delete_watch_party(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .delete_watch_party(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/watch-parties/{id}/join",
    params(("id" = i32, Path, description = "Watch party ID")),
    responses(
        (status = 200, description = "Seat taken", body = Outcome),
        (status = 404, description = "Watch party not found", body = Outcome),
        (status = 409, description = "Already attending or party full", body = Outcome)
    ),
    tag = "watch-parties"
)]
pub async fn join_watch_party(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .join_watch_party(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/watch-parties/{id}/leave",
    params(("id" = i32, Path, description = "Watch party ID")),
    responses(
        (status = 200, description = "Seat released", body = Outcome),
        (status = 400, description = "Not attending", body = Outcome),
        (status = 409, description = "The organizer cannot leave", body = Outcome)
    ),
    tag = "watch-parties"
)]
pub async fn leave_watch_party(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .leave_watch_party(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}
