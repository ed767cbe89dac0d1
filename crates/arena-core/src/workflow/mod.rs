//! Reservation workflow
//!
//! [`ArenaService`] orchestrates every mutation: it resolves the caller's
//! identity, runs ownership and capacity checks through the ledger and slot
//! store, writes inside a transaction where more than one row changes, and
//! settles the result into an [`Outcome`]. Committed mutations publish a
//! [`ChangeEvent`].

mod bookings;
mod labs;
mod teams;
mod tournaments;
mod watch_parties;

pub use bookings::BookingInput;
pub use labs::LabSpec;
pub use teams::TeamInput;
pub use tournaments::TournamentInput;
pub use watch_parties::{WatchPartyInput, DEFAULT_LOCATION, DEFAULT_MAX_ATTENDEES};

use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::error::ReservationError;
use crate::events::{ChangeAction, ChangeEvent, ChangeNotifier, Collection};
use crate::identity::Principal;
use crate::outcome::Outcome;

/// Longest accepted name or free-text field
pub const MAX_TEXT_LEN: usize = 255;

/// Entry point for the presentation layer
#[derive(Debug, Clone)]
pub struct ArenaService {
    pub(crate) db: DatabaseConnection,
    notifier: ChangeNotifier,
}

impl ArenaService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_notifier(db, ChangeNotifier::default())
    }

    pub fn with_notifier(db: DatabaseConnection, notifier: ChangeNotifier) -> Self {
        Self { db, notifier }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    /// Turn the result of a mutation into an outcome, logging and notifying
    fn settle(
        &self,
        op: &Operation,
        principal: &Principal,
        result: Result<i32, ReservationError>,
    ) -> Outcome {
        match result {
            Ok(resource_id) => {
                info!(
                    "{} ({}) committed by {}",
                    op.verb, resource_id, principal.id
                );
                self.notifier.publish(ChangeEvent {
                    action: op.action,
                    resource_id,
                    collections: op.collections.to_vec(),
                });

                if op.action == ChangeAction::Created {
                    Outcome::created(resource_id)
                } else {
                    Outcome::committed()
                }
            }
            Err(err) => {
                if let ReservationError::Store(db_err) = &err {
                    error!("Failed to {} for {}: {}", op.verb, principal.id, db_err);
                } else {
                    debug!("{} rejected for {}: {}", op.verb, principal.id, err);
                }
                Outcome::rejected(&err, op.verb)
            }
        }
    }
}

/// Static description of a mutation: its log verb and what it invalidates
pub(crate) struct Operation {
    pub verb: &'static str,
    pub action: ChangeAction,
    pub collections: &'static [Collection],
}

/// Trim a required text field, rejecting blanks and overlong values
pub(crate) fn required(value: &str, label: &str) -> Result<String, ReservationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReservationError::Invalid(format!("{} is required", label)));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ReservationError::Invalid(format!(
            "{} must be at most {} characters",
            label, MAX_TEXT_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blanks become `None`
pub(crate) fn optional(value: Option<&str>, label: &str) -> Result<Option<String>, ReservationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => required(v, label).map(Some),
        None => Ok(None),
    }
}

/// The principal has no row in `users`; the identity adapter never synced it
pub(crate) fn unknown_principal() -> ReservationError {
    ReservationError::Invalid("Your account is not registered yet. Please sign in again.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("  Alpha ", "Team name").unwrap(), "Alpha");
        let err = required("   ", "Team name").unwrap_err();
        assert_eq!(err.to_string(), "Team name is required");
    }

    #[test]
    fn test_required_rejects_overlong() {
        let long = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(required(&long, "Name").is_err());
        assert!(required(&long[..MAX_TEXT_LEN], "Name").is_ok());
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some("  "), "Genre").unwrap(), None);
        assert_eq!(optional(None, "Genre").unwrap(), None);
        assert_eq!(
            optional(Some(" FPS "), "Genre").unwrap().as_deref(),
            Some("FPS")
        );
    }
}
