use std::sync::Arc;

use arena_core::{Outcome, Principal, TeamInput, TeamView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::debug;

use super::{identity, read_failed, respond, unauthenticated, ApiError, OutcomeResponse};
use crate::models::{search, ErrorResponse, TeamSearch};
use crate::AppState;

/// Teams the caller belongs to
#[utoipa::path(
    get,
    path = "/api/teams/mine",
    responses(
        (status = 200, description = "Teams the caller is a member of", body = Vec<TeamView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn my_teams(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<TeamView>>, ApiError> {
    debug!("Listing teams of {}", principal.id);
    state
        .service
        .my_teams(&identity(principal))
        .await
        .map(Json)
        .map_err(read_failed)
}

/// Teams the caller can still join
#[utoipa::path(
    get,
    path = "/api/teams",
    params(TeamSearch),
    responses(
        (status = 200, description = "Teams the caller is not a member of", body = Vec<TeamView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn available_teams(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<TeamSearch>,
) -> Result<Json<Vec<TeamView>>, ApiError> {
    let filter = search(query.field, query.q);
    state
        .service
        .available_teams(&identity(principal), filter.as_ref())
        .await
        .map(Json)
        .map_err(read_failed)
}

/// Create a team; the creator joins it
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = TeamInput,
    responses(
        (status = 201, description = "Team created", body = Outcome),
        (status = 400, description = "Invalid input", body = Outcome),
        (status = 409, description = "Name already taken", body = Outcome),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<TeamInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .create_team(&identity(principal), input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::CREATED))
}

/// Rename a team (creator only)
#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = TeamInput,
    responses(
        (status = 200, description = "Team updated", body = Outcome),
        (status = 403, description = "Not the creator", body = Outcome),
        (status = 404, description = "Team not found", body = Outcome),
        (status = 409, description = "Name already taken", body = Outcome)
    ),
    tag = "teams"
)]
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Json(input): Json<TeamInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .update_team(&identity(principal), id, input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

/// Delete a team with its memberships and lab bookings (creator only)
#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team deleted", body = Outcome),
        (status = 403, description = "Not the creator", body = Outcome),
        (status = 404, description = "Team not found", body = Outcome)
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .delete_team(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/teams/{id}/join",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Joined", body = Outcome),
        (status = 404, description = "Team not found", body = Outcome),
        (status = 409, description = "Already a member", body = Outcome)
    ),
    tag = "teams"
)]
pub async fn join_team(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .join_team(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/teams/{id}/leave",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Left", body = Outcome),
        (status = 400, description = "Not a member", body = Outcome),
        (status = 409, description = "The creator cannot leave", body = Outcome)
    ),
    tag = "teams"
)]
pub async fn leave_team(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .leave_team(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}
