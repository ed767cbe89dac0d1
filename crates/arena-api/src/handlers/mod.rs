//! HTTP handlers
//!
//! Mutations answer with the workflow's [`Outcome`] body; the status code is
//! derived from its [`ErrorCode`]. Reads answer with the projection views.

pub mod labs;
pub mod system;
pub mod teams;
pub mod tournaments;
pub mod watch_parties;

use arena_core::{ErrorCode, Identity, Outcome, Principal, ReadError, Unauthenticated};
use axum::{http::StatusCode, Json};
use tracing::error;

use crate::models::ErrorResponse;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type OutcomeResponse = (StatusCode, Json<Outcome>);

/// HTTP status for a rejected outcome
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::DuplicateName
        | ErrorCode::SlotTaken
        | ErrorCode::AlreadyLinked
        | ErrorCode::AtCapacity
        | ErrorCode::OwnerCannotLeave => StatusCode::CONFLICT,
        ErrorCode::NotLinked | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Pair an outcome with its status; `success` is used when it committed
pub(crate) fn respond(outcome: Outcome, success: StatusCode) -> OutcomeResponse {
    let status = match outcome.code {
        Some(code) if !outcome.success => status_for(code),
        _ => success,
    };
    (status, Json(outcome))
}

pub(crate) fn identity(principal: Principal) -> Identity {
    Identity::authenticated(principal)
}

pub(crate) fn unauthenticated(err: Unauthenticated) -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(err.to_string(), "UNAUTHENTICATED")),
    )
}

pub(crate) fn read_failed(err: ReadError) -> ApiError {
    match err {
        ReadError::Unauthenticated(e) => unauthenticated(e),
        ReadError::Store(e) => {
            error!("Read projection failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Failed to load data",
                    ErrorCode::StoreFailure.as_str(),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::SlotTaken), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::OwnerCannotLeave), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::NotLinked), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorCode::StoreFailure),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_committed_outcome_keeps_success_status() {
        let (status, _) = respond(Outcome::created(7), StatusCode::CREATED);
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = respond(Outcome::committed(), StatusCode::OK);
        assert_eq!(status, StatusCode::OK);
    }
}
