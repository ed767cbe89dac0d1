use std::sync::Arc;

use arena_core::{Outcome, Principal, TournamentInput, TournamentOption, TournamentView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::{identity, read_failed, respond, unauthenticated, ApiError, OutcomeResponse};
use crate::models::{search, ErrorResponse, TournamentSearch};
use crate::AppState;

/// Tournaments the caller is registered for
#[utoipa::path(
    get,
    path = "/api/tournaments/mine",
    responses(
        (status = 200, description = "Registered tournaments", body = Vec<TournamentView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "tournaments"
)]
pub async fn my_tournaments(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<TournamentView>>, ApiError> {
    state
        .service
        .my_tournaments(&identity(principal))
        .await
        .map(Json)
        .map_err(read_failed)
}

#[utoipa::path(
    get,
    path = "/api/tournaments",
    params(TournamentSearch),
    responses(
        (status = 200, description = "Tournaments open for registration", body = Vec<TournamentView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "tournaments"
)]
pub async fn available_tournaments(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<TournamentSearch>,
) -> Result<Json<Vec<TournamentView>>, ApiError> {
    let filter = search(query.field, query.q);
    state
        .service
        .available_tournaments(&identity(principal), filter.as_ref())
        .await
        .map(Json)
        .map_err(read_failed)
}

/// Id/name pairs for the watch-party form
#[utoipa::path(
    get,
    path = "/api/tournaments/options",
    responses(
        (status = 200, description = "Tournament choices", body = Vec<TournamentOption>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "tournaments"
)]
pub async fn tournament_options(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<TournamentOption>>, ApiError> {
    state
        .service
        .tournament_options(&identity(principal))
        .await
        .map(Json)
        .map_err(read_failed)
}

#[utoipa::path(
    post,
    path = "/api/tournaments",
    request_body = TournamentInput,
    responses(
        (status = 201, description = "Tournament created", body = Outcome),
        (status = 400, description = "Invalid input", body = Outcome),
        (status = 409, description = "Name already taken", body = Outcome)
    ),
    tag = "tournaments"
)]
pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<TournamentInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .create_tournament(&identity(principal), input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/api/tournaments/{id}",
    params(("id" = i32, Path, description = "Tournament ID")),
    request_body = TournamentInput,
    responses(
        (status = 200, description = "Tournament updated", body = Outcome),
        (status = 403, description = "Not the organizer", body = Outcome),
        (status = 404, description = "Tournament not found", body = Outcome),
        (status = 409, description = "Name already taken", body = Outcome)
    ),
    tag = "tournaments"
)]
pub async fn update_tournament(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Json(input): Json<TournamentInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .update_tournament(&identity(principal), id, input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

/// Delete a tournament with its watch parties (organizer only)
#[utoipa::path(
    delete,
    path = "/api/tournaments/{id}",
    params(("id" = i32, Path, description = "Tournament ID")),
    responses(
        (status = 200, description = "Tournament deleted", body = Outcome),
        (status = 403, description = "Not the organizer", body = Outcome),
        (status = 404, description = "Tournament not found", body = Outcome)
    ),
    tag = "tournaments"
)]
pub async fn delete_tournament(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .delete_tournament(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

/// Take a seat at the tournament's first watch party
#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/register",
    params(("id" = i32, Path, description = "Tournament ID")),
    responses(
        (status = 200, description = "Registered", body = Outcome),
        (status = 404, description = "Tournament or watch party not found", body = Outcome),
        (status = 409, description = "Already registered or party full", body = Outcome)
    ),
    tag = "tournaments"
)]
pub async fn register_for_tournament(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .register_for_tournament(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/unregister",
    params(("id" = i32, Path, description = "Tournament ID")),
    responses(
        (status = 200, description = "Unregistered", body = Outcome),
        (status = 400, description = "Not registered", body = Outcome),
        (status = 409, description = "Organizers keep their seat", body = Outcome)
    ),
    tag = "tournaments"
)]
pub async fn unregister_from_tournament(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .unregister_from_tournament(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}
