//! Reservation error taxonomy
//!
//! Workflow operations never let these escape: they are converted into a
//! rejected [`Outcome`](crate::Outcome) carrying a human-readable message and
//! a stable [`ErrorCode`].

use std::fmt;

use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::identity::Unauthenticated;

/// Resource types governed by the reservation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Team,
    Lab,
    LabBooking,
    Tournament,
    WatchParty,
}

impl ResourceKind {
    fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Team => "team",
            ResourceKind::Lab => "lab",
            ResourceKind::LabBooking => "booking",
            ResourceKind::Tournament => "tournament",
            ResourceKind::WatchParty => "watch party",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ResourceKind::Team => "Team",
            ResourceKind::Lab => "Lab",
            ResourceKind::LabBooking => "Booking",
            ResourceKind::Tournament => "Tournament",
            ResourceKind::WatchParty => "Watch party",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Stable machine-readable failure code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Forbidden,
    NotFound,
    DuplicateName,
    SlotTaken,
    AlreadyLinked,
    NotLinked,
    OwnerCannotLeave,
    AtCapacity,
    InvalidInput,
    StoreFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::SlotTaken => "SLOT_TAKEN",
            ErrorCode::AlreadyLinked => "ALREADY_LINKED",
            ErrorCode::NotLinked => "NOT_LINKED",
            ErrorCode::OwnerCannotLeave => "OWNER_CANNOT_LEAVE",
            ErrorCode::AtCapacity => "AT_CAPACITY",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::StoreFailure => "STORE_FAILURE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain failures of a reservation operation
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Only the {0}'s creator can change or delete it")]
    Forbidden(ResourceKind),

    #[error("You must be a member of this team to book a lab for it")]
    NotTeamMember,

    #[error("{} not found", .0.title())]
    NotFound(ResourceKind),

    #[error("No watch party exists for this tournament yet. Please check the Watch Parties page to join an existing party or create a new one.")]
    NoWatchParty,

    #[error("A {0} with that name already exists. Please choose a different name.")]
    DuplicateName(ResourceKind),

    #[error("This lab is already booked for the selected date")]
    SlotTaken,

    #[error("{}", already_linked_message(.0))]
    AlreadyLinked(ResourceKind),

    #[error("{}", not_linked_message(.0))]
    NotLinked(ResourceKind),

    #[error("{}", owner_cannot_leave_message(.0))]
    OwnerCannotLeave(ResourceKind),

    #[error("{}", at_capacity_message(.0))]
    AtCapacity(ResourceKind),

    #[error("{0}")]
    Invalid(String),

    #[error("Store failure: {0}")]
    Store(#[from] DbErr),
}

fn already_linked_message(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Tournament => "You are already registered for this tournament",
        ResourceKind::WatchParty => "You are already attending this watch party",
        _ => "You are already a member of this team",
    }
}

fn not_linked_message(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Tournament => "You are not registered for this tournament",
        ResourceKind::WatchParty => "You are not attending this watch party",
        _ => "You are not a member of this team",
    }
}

fn owner_cannot_leave_message(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::WatchParty => {
            "As the organizer, you cannot leave the watch party. You can delete it instead."
        }
        ResourceKind::Tournament => {
            "As the organizer of this tournament's watch party, you cannot unregister. You can delete the watch party instead."
        }
        _ => "As the team creator, you cannot leave the team. You can delete it instead.",
    }
}

fn at_capacity_message(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Tournament => {
            "This watch party has reached its maximum capacity. Please check if there are other watch parties available."
        }
        _ => "This watch party is at maximum capacity",
    }
}

impl ReservationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReservationError::Forbidden(_) | ReservationError::NotTeamMember => {
                ErrorCode::Forbidden
            }
            ReservationError::NotFound(_) | ReservationError::NoWatchParty => ErrorCode::NotFound,
            ReservationError::DuplicateName(_) => ErrorCode::DuplicateName,
            ReservationError::SlotTaken => ErrorCode::SlotTaken,
            ReservationError::AlreadyLinked(_) => ErrorCode::AlreadyLinked,
            ReservationError::NotLinked(_) => ErrorCode::NotLinked,
            ReservationError::OwnerCannotLeave(_) => ErrorCode::OwnerCannotLeave,
            ReservationError::AtCapacity(_) => ErrorCode::AtCapacity,
            ReservationError::Invalid(_) => ErrorCode::InvalidInput,
            ReservationError::Store(_) => ErrorCode::StoreFailure,
        }
    }

    /// Re-express a watch-party seat failure in tournament terms
    pub(crate) fn as_registration(self) -> Self {
        match self {
            ReservationError::AlreadyLinked(ResourceKind::WatchParty) => {
                ReservationError::AlreadyLinked(ResourceKind::Tournament)
            }
            ReservationError::NotLinked(ResourceKind::WatchParty) => {
                ReservationError::NotLinked(ResourceKind::Tournament)
            }
            ReservationError::OwnerCannotLeave(ResourceKind::WatchParty) => {
                ReservationError::OwnerCannotLeave(ResourceKind::Tournament)
            }
            ReservationError::AtCapacity(ResourceKind::WatchParty) => {
                ReservationError::AtCapacity(ResourceKind::Tournament)
            }
            other => other,
        }
    }

    /// Translate a storage error, mapping constraint violations onto domain failures
    pub(crate) fn from_store(
        err: DbErr,
        on_unique: ReservationError,
        on_missing_parent: ReservationError,
    ) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => on_unique,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => on_missing_parent,
            _ => ReservationError::Store(err),
        }
    }
}

/// Failures of read projections
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Unauthenticated(#[from] Unauthenticated),

    #[error("Store failure: {0}")]
    Store(#[from] DbErr),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::OwnerCannotLeave).unwrap();
        assert_eq!(json, "\"OWNER_CANNOT_LEAVE\"");
        assert_eq!(ErrorCode::SlotTaken.as_str(), "SLOT_TAKEN");
    }

    #[test]
    fn test_messages_name_the_resource() {
        assert_eq!(
            ReservationError::DuplicateName(ResourceKind::Team).to_string(),
            "A team with that name already exists. Please choose a different name."
        );
        assert_eq!(
            ReservationError::NotFound(ResourceKind::WatchParty).to_string(),
            "Watch party not found"
        );
        assert_eq!(
            ReservationError::OwnerCannotLeave(ResourceKind::Team).to_string(),
            "As the team creator, you cannot leave the team. You can delete it instead."
        );
    }

    #[test]
    fn test_registration_relabels_seat_failures() {
        let err = ReservationError::AtCapacity(ResourceKind::WatchParty).as_registration();
        assert!(matches!(
            err,
            ReservationError::AtCapacity(ResourceKind::Tournament)
        ));
        assert_eq!(err.code(), ErrorCode::AtCapacity);

        let untouched = ReservationError::SlotTaken.as_registration();
        assert!(matches!(untouched, ReservationError::SlotTaken));
    }

    #[test]
    fn test_plain_store_errors_stay_store_failures() {
        let err = ReservationError::from_store(
            DbErr::Custom("disk full".to_string()),
            ReservationError::SlotTaken,
            ReservationError::NotFound(ResourceKind::Lab),
        );
        assert_eq!(err.code(), ErrorCode::StoreFailure);
    }
}
