use std::sync::Arc;

use arena_core::{BookingInput, BookingView, LabView, Outcome, Principal};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use super::{identity, read_failed, respond, unauthenticated, ApiError, OutcomeResponse};
use crate::models::{search, BookingWindow, ErrorResponse, LabSearch};
use crate::AppState;

/// All computer labs
#[utoipa::path(
    get,
    path = "/api/labs",
    responses(
        (status = 200, description = "Lab catalog", body = Vec<LabView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "labs"
)]
pub async fn list_labs(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<LabView>>, ApiError> {
    state
        .service
        .list_labs(&identity(principal))
        .await
        .map(Json)
        .map_err(read_failed)
}

/// Labs with no booking on the requested day
#[utoipa::path(
    get,
    path = "/api/labs/available",
    params(LabSearch),
    responses(
        (status = 200, description = "Free labs", body = Vec<LabView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "labs"
)]
pub async fn available_labs(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<LabSearch>,
) -> Result<Json<Vec<LabView>>, ApiError> {
    let filter = search(query.field, query.q);
    state
        .service
        .available_labs(&identity(principal), query.date, filter.as_ref())
        .await
        .map(Json)
        .map_err(read_failed)
}

/// The caller's bookings from a given day on
#[utoipa::path(
    get,
    path = "/api/bookings/mine",
    params(BookingWindow),
    responses(
        (status = 200, description = "Upcoming bookings", body = Vec<BookingView>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "labs"
)]
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(window): Query<BookingWindow>,
) -> Result<Json<Vec<BookingView>>, ApiError> {
    let from = window.from.unwrap_or_else(|| Utc::now().date_naive());
    state
        .service
        .my_bookings(&identity(principal), from)
        .await
        .map(Json)
        .map_err(read_failed)
}

/// Book a lab for one of the caller's teams
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = BookingInput,
    responses(
        (status = 201, description = "Booking created", body = Outcome),
        (status = 403, description = "Not a member of the team", body = Outcome),
        (status = 404, description = "Lab or team not found", body = Outcome),
        (status = 409, description = "Lab already booked that day", body = Outcome)
    ),
    tag = "labs"
)]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<BookingInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .create_booking(&identity(principal), input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::CREATED))
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}",
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = BookingInput,
    responses(
        (status = 200, description = "Booking updated", body = Outcome),
        (status = 403, description = "Not the booker", body = Outcome),
        (status = 404, description = "Booking not found", body = Outcome),
        (status = 409, description = "Lab already booked that day", body = Outcome)
    ),
    tag = "labs"
)]
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Json(input): Json<BookingInput>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .update_booking(&identity(principal), id, input)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}

#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Outcome),
        (status = 403, description = "Not the booker", body = Outcome),
        (status = 404, description = "Booking not found", body = Outcome)
    ),
    tag = "labs"
)]
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<OutcomeResponse, ApiError> {
    let outcome = state
        .service
        .delete_booking(&identity(principal), id)
        .await
        .map_err(unauthenticated)?;
    Ok(respond(outcome, StatusCode::OK))
}
