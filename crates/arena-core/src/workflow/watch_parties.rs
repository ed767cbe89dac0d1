//! Watch party operations

use arena_db::entities::{tournament, watch_party, watch_party_attendee};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::{optional, unknown_principal, ArenaService, Operation};
use crate::error::{ReservationError, ResourceKind};
use crate::events::{ChangeAction, Collection};
use crate::identity::{Identity, Principal, Unauthenticated};
use crate::ledger::Ledger;
use crate::outcome::Outcome;
use crate::slots::SeatStore;

/// Location used when none is given
pub const DEFAULT_LOCATION: &str = "TBD";

/// Capacity used when none is given
pub const DEFAULT_MAX_ATTENDEES: i32 = 30;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WatchPartyInput {
    pub tournament_id: i32,
    pub date: NaiveDate,
    /// Start time as "HH:MM" (UTC)
    pub time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_attendees: Option<i32>,
}

const CREATE_PARTY: Operation = Operation {
    verb: "create watch party",
    action: ChangeAction::Created,
    collections: &[Collection::WatchParties],
};

const UPDATE_PARTY: Operation = Operation {
    verb: "update watch party",
    action: ChangeAction::Updated,
    collections: &[Collection::WatchParties],
};

const DELETE_PARTY: Operation = Operation {
    verb: "delete watch party",
    action: ChangeAction::Deleted,
    collections: &[Collection::WatchParties, Collection::Tournaments],
};

const JOIN_PARTY: Operation = Operation {
    verb: "join watch party",
    action: ChangeAction::Joined,
    collections: &[Collection::WatchParties, Collection::Tournaments],
};

const LEAVE_PARTY: Operation = Operation {
    verb: "leave watch party",
    action: ChangeAction::Left,
    collections: &[Collection::WatchParties, Collection::Tournaments],
};

struct PartyFields {
    tournament_id: i32,
    party_date_time: DateTime<Utc>,
    location: String,
    max_attendees: i32,
}

impl TryFrom<&WatchPartyInput> for PartyFields {
    type Error = ReservationError;

    fn try_from(input: &WatchPartyInput) -> Result<Self, Self::Error> {
        let max_attendees = input.max_attendees.unwrap_or(DEFAULT_MAX_ATTENDEES);
        if max_attendees < 1 {
            return Err(ReservationError::Invalid(
                "Maximum attendees must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            tournament_id: input.tournament_id,
            party_date_time: party_date_time(input.date, &input.time)?,
            location: optional(input.location.as_deref(), "Location")?
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            max_attendees,
        })
    }
}

/// Combine a calendar date with an "HH:MM" time, read as UTC
pub fn party_date_time(date: NaiveDate, time: &str) -> Result<DateTime<Utc>, ReservationError> {
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
        .map_err(|_| ReservationError::Invalid("Time must be in HH:MM format".to_string()))?;
    Ok(date.and_time(time).and_utc())
}

impl ArenaService {
    /// Create a watch party; the organizer takes the first seat in the same transaction
    pub async fn create_watch_party(
        &self,
        identity: &Identity,
        input: WatchPartyInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.insert_watch_party(principal, &input).await;
        Ok(self.settle(&CREATE_PARTY, principal, result))
    }

    pub async fn update_watch_party(
        &self,
        identity: &Identity,
        party_id: i32,
        input: WatchPartyInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.edit_watch_party(principal, party_id, &input).await;
        Ok(self.settle(&UPDATE_PARTY, principal, result))
    }

    pub async fn delete_watch_party(
        &self,
        identity: &Identity,
        party_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.remove_watch_party(principal, party_id).await;
        Ok(self.settle(&DELETE_PARTY, principal, result))
    }

    pub async fn join_watch_party(
        &self,
        identity: &Identity,
        party_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = SeatStore::new(&self.db)
            .try_reserve(&principal.id, party_id)
            .await
            .map(|_| party_id);
        Ok(self.settle(&JOIN_PARTY, principal, result))
    }

    pub async fn leave_watch_party(
        &self,
        identity: &Identity,
        party_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.vacate_seat(principal, party_id).await;
        Ok(self.settle(&LEAVE_PARTY, principal, result))
    }

    async fn vacate_seat(
        &self,
        principal: &Principal,
        party_id: i32,
    ) -> Result<i32, ReservationError> {
        if watch_party::Entity::find_by_id(party_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ReservationError::NotFound(ResourceKind::WatchParty));
        }

        SeatStore::new(&self.db)
            .release(&principal.id, party_id)
            .await?;
        Ok(party_id)
    }

    async fn insert_watch_party(
        &self,
        principal: &Principal,
        input: &WatchPartyInput,
    ) -> Result<i32, ReservationError> {
        let fields = PartyFields::try_from(input)?;
        let now = Utc::now();

        let txn = self.db.begin().await?;

        if tournament::Entity::find_by_id(fields.tournament_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ReservationError::NotFound(ResourceKind::Tournament));
        }

        let party = watch_party::ActiveModel {
            tournament_id: Set(fields.tournament_id),
            creator_id: Set(principal.id.clone()),
            party_date_time: Set(fields.party_date_time),
            location: Set(fields.location),
            max_attendees: Set(fields.max_attendees),
            seats_taken: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            ReservationError::from_store(
                e,
                ReservationError::Invalid("Watch party could not be created".to_string()),
                unknown_principal(),
            )
        })?;

        Ledger::watch_parties(&txn)
            .add(&principal.id, party.id)
            .await?;

        txn.commit().await?;
        Ok(party.id)
    }

    async fn edit_watch_party(
        &self,
        principal: &Principal,
        party_id: i32,
        input: &WatchPartyInput,
    ) -> Result<i32, ReservationError> {
        let fields = PartyFields::try_from(input)?;

        let txn = self.db.begin().await?;

        let party = watch_party::Entity::find_by_id(party_id)
            .one(&txn)
            .await?
            .ok_or(ReservationError::NotFound(ResourceKind::WatchParty))?;

        if party.creator_id != principal.id {
            return Err(ReservationError::Forbidden(ResourceKind::WatchParty));
        }

        if fields.tournament_id != party.tournament_id
            && tournament::Entity::find_by_id(fields.tournament_id)
                .one(&txn)
                .await?
                .is_none()
        {
            return Err(ReservationError::NotFound(ResourceKind::Tournament));
        }

        // Capacity can only shrink down to the seats already taken
        let updated = watch_party::Entity::update_many()
            .col_expr(
                watch_party::Column::TournamentId,
                Expr::value(fields.tournament_id),
            )
            .col_expr(
                watch_party::Column::PartyDateTime,
                Expr::value(fields.party_date_time),
            )
            .col_expr(watch_party::Column::Location, Expr::value(fields.location))
            .col_expr(
                watch_party::Column::MaxAttendees,
                Expr::value(fields.max_attendees),
            )
            .col_expr(watch_party::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(watch_party::Column::Id.eq(party_id))
            .filter(watch_party::Column::SeatsTaken.lte(fields.max_attendees))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            return Err(ReservationError::Invalid(format!(
                "Maximum attendees cannot be lower than the current number of attendees ({})",
                party.seats_taken
            )));
        }

        txn.commit().await?;
        Ok(party_id)
    }

    async fn remove_watch_party(
        &self,
        principal: &Principal,
        party_id: i32,
    ) -> Result<i32, ReservationError> {
        let txn = self.db.begin().await?;

        match Ledger::watch_parties(&txn).owner_of(party_id).await? {
            None => return Err(ReservationError::NotFound(ResourceKind::WatchParty)),
            Some(owner) if owner != principal.id => {
                return Err(ReservationError::Forbidden(ResourceKind::WatchParty))
            }
            Some(_) => {}
        }

        watch_party_attendee::Entity::delete_many()
            .filter(watch_party_attendee::Column::WatchPartyId.eq(party_id))
            .exec(&txn)
            .await?;
        watch_party::Entity::delete_by_id(party_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(party_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(time: &str) -> WatchPartyInput {
        WatchPartyInput {
            tournament_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            time: time.to_string(),
            location: None,
            max_attendees: None,
        }
    }

    #[test]
    fn test_party_time_combines_date_and_clock() {
        let at = party_date_time(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(), "18:30").unwrap();
        assert_eq!(at.to_rfc3339(), "2025-05-01T18:30:00+00:00");
    }

    #[test]
    fn test_party_time_rejects_malformed_clock() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(party_date_time(date, "6pm").is_err());
        assert!(party_date_time(date, "25:00").is_err());
        assert!(party_date_time(date, "").is_err());
    }

    #[test]
    fn test_defaults_fill_location_and_capacity() {
        let fields = PartyFields::try_from(&input("19:00")).unwrap();
        assert_eq!(fields.location, DEFAULT_LOCATION);
        assert_eq!(fields.max_attendees, DEFAULT_MAX_ATTENDEES);
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let mut bad = input("19:00");
        bad.max_attendees = Some(0);
        let err = PartyFields::try_from(&bad).err().unwrap();
        assert_eq!(err.to_string(), "Maximum attendees must be at least 1");
    }
}
