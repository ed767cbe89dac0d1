//! Tournament operations
//!
//! Registering for a tournament is attendance at one of its watch parties:
//! the principal is seated at the tournament's first watch party, subject to
//! that party's capacity. A seat at any of its parties counts as registered,
//! so unregistering gives up all of them at once.
//!
//! A tournament is managed by its creator and by every organizer of one of
//! its watch parties.

use arena_db::entities::{tournament, watch_party, watch_party_attendee};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::{optional, required, unknown_principal, ArenaService, Operation};
use crate::error::{ReservationError, ResourceKind};
use crate::events::{ChangeAction, Collection};
use crate::identity::{Identity, Principal, Unauthenticated};
use crate::ledger::Ledger;
use crate::outcome::Outcome;
use crate::slots::SeatStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TournamentInput {
    pub name: String,
    /// Game title
    pub game: String,
    #[serde(default)]
    pub genre: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub prize_fund: Option<String>,
}

const CREATE_TOURNAMENT: Operation = Operation {
    verb: "create tournament",
    action: ChangeAction::Created,
    collections: &[Collection::Tournaments],
};

const UPDATE_TOURNAMENT: Operation = Operation {
    verb: "update tournament",
    action: ChangeAction::Updated,
    collections: &[Collection::Tournaments],
};

const DELETE_TOURNAMENT: Operation = Operation {
    verb: "delete tournament",
    action: ChangeAction::Deleted,
    collections: &[Collection::Tournaments, Collection::WatchParties],
};

const REGISTER: Operation = Operation {
    verb: "register for tournament",
    action: ChangeAction::Joined,
    collections: &[Collection::Tournaments, Collection::WatchParties],
};

const UNREGISTER: Operation = Operation {
    verb: "unregister from tournament",
    action: ChangeAction::Left,
    collections: &[Collection::Tournaments, Collection::WatchParties],
};

struct TournamentFields {
    name: String,
    game_title: String,
    genre: Option<String>,
    date: NaiveDate,
    prize_fund: Option<String>,
}

impl TryFrom<&TournamentInput> for TournamentFields {
    type Error = ReservationError;

    fn try_from(input: &TournamentInput) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required(&input.name, "Tournament name")?,
            game_title: required(&input.game, "Game")?,
            genre: optional(input.genre.as_deref(), "Genre")?,
            date: input.date,
            prize_fund: optional(input.prize_fund.as_deref(), "Prize fund")?,
        })
    }
}

/// Watch parties of `tournament_id` the user holds a seat at, lowest id first
pub(crate) async fn seats_in_tournament<C>(
    conn: &C,
    user_id: &str,
    tournament_id: i32,
) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    watch_party_attendee::Entity::find()
        .select_only()
        .column(watch_party_attendee::Column::WatchPartyId)
        .join(
            sea_orm::JoinType::InnerJoin,
            watch_party_attendee::Relation::WatchParty.def(),
        )
        .filter(watch_party_attendee::Column::UserId.eq(user_id))
        .filter(watch_party::Column::TournamentId.eq(tournament_id))
        .order_by_asc(watch_party_attendee::Column::WatchPartyId)
        .into_tuple()
        .all(conn)
        .await
}

/// Whether `user_id` organizes at least one watch party of `tournament_id`
pub(crate) async fn organizes_party_of<C>(
    conn: &C,
    user_id: &str,
    tournament_id: i32,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let organized = watch_party::Entity::find()
        .filter(watch_party::Column::TournamentId.eq(tournament_id))
        .filter(watch_party::Column::CreatorId.eq(user_id))
        .count(conn)
        .await?;
    Ok(organized > 0)
}

/// Creator or watch-party organizer of the tournament
async fn may_manage<C>(
    conn: &C,
    principal: &Principal,
    tournament: &tournament::Model,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    if tournament.creator_id == principal.id {
        return Ok(true);
    }
    organizes_party_of(conn, &principal.id, tournament.id).await
}

impl ArenaService {
    pub async fn create_tournament(
        &self,
        identity: &Identity,
        input: TournamentInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.insert_tournament(principal, &input).await;
        Ok(self.settle(&CREATE_TOURNAMENT, principal, result))
    }

    pub async fn update_tournament(
        &self,
        identity: &Identity,
        tournament_id: i32,
        input: TournamentInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.edit_tournament(principal, tournament_id, &input).await;
        Ok(self.settle(&UPDATE_TOURNAMENT, principal, result))
    }

    /// Delete a tournament with all of its watch parties and their attendees
    pub async fn delete_tournament(
        &self,
        identity: &Identity,
        tournament_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.remove_tournament(principal, tournament_id).await;
        Ok(self.settle(&DELETE_TOURNAMENT, principal, result))
    }

    pub async fn register_for_tournament(
        &self,
        identity: &Identity,
        tournament_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.register(principal, tournament_id).await;
        Ok(self.settle(&REGISTER, principal, result))
    }

    pub async fn unregister_from_tournament(
        &self,
        identity: &Identity,
        tournament_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.unregister(principal, tournament_id).await;
        Ok(self.settle(&UNREGISTER, principal, result))
    }

    async fn find_tournament(
        &self,
        tournament_id: i32,
    ) -> Result<tournament::Model, ReservationError> {
        tournament::Entity::find_by_id(tournament_id)
            .one(&self.db)
            .await?
            .ok_or(ReservationError::NotFound(ResourceKind::Tournament))
    }

    async fn insert_tournament(
        &self,
        principal: &Principal,
        input: &TournamentInput,
    ) -> Result<i32, ReservationError> {
        let fields = TournamentFields::try_from(input)?;
        let now = Utc::now();

        let created = tournament::ActiveModel {
            name: Set(fields.name),
            date: Set(fields.date),
            game_title: Set(fields.game_title),
            genre: Set(fields.genre),
            prize_fund: Set(fields.prize_fund),
            creator_id: Set(principal.id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            ReservationError::from_store(
                e,
                ReservationError::DuplicateName(ResourceKind::Tournament),
                unknown_principal(),
            )
        })?;

        Ok(created.id)
    }

    async fn edit_tournament(
        &self,
        principal: &Principal,
        tournament_id: i32,
        input: &TournamentInput,
    ) -> Result<i32, ReservationError> {
        let fields = TournamentFields::try_from(input)?;
        let existing = self.find_tournament(tournament_id).await?;

        if !may_manage(&self.db, principal, &existing).await? {
            return Err(ReservationError::Forbidden(ResourceKind::Tournament));
        }

        let mut active = existing.into_active_model();
        active.name = Set(fields.name);
        active.date = Set(fields.date);
        active.game_title = Set(fields.game_title);
        active.genre = Set(fields.genre);
        active.prize_fund = Set(fields.prize_fund);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(|e| {
            ReservationError::from_store(
                e,
                ReservationError::DuplicateName(ResourceKind::Tournament),
                ReservationError::NotFound(ResourceKind::Tournament),
            )
        })?;

        Ok(tournament_id)
    }

    async fn remove_tournament(
        &self,
        principal: &Principal,
        tournament_id: i32,
    ) -> Result<i32, ReservationError> {
        let txn = self.db.begin().await?;

        let existing = tournament::Entity::find_by_id(tournament_id)
            .one(&txn)
            .await?
            .ok_or(ReservationError::NotFound(ResourceKind::Tournament))?;

        if !may_manage(&txn, principal, &existing).await? {
            return Err(ReservationError::Forbidden(ResourceKind::Tournament));
        }

        let party_ids: Vec<i32> = watch_party::Entity::find()
            .select_only()
            .column(watch_party::Column::Id)
            .filter(watch_party::Column::TournamentId.eq(tournament_id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !party_ids.is_empty() {
            watch_party_attendee::Entity::delete_many()
                .filter(watch_party_attendee::Column::WatchPartyId.is_in(party_ids))
                .exec(&txn)
                .await?;
        }
        watch_party::Entity::delete_many()
            .filter(watch_party::Column::TournamentId.eq(tournament_id))
            .exec(&txn)
            .await?;
        tournament::Entity::delete_by_id(tournament_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(tournament_id)
    }

    async fn register(
        &self,
        principal: &Principal,
        tournament_id: i32,
    ) -> Result<i32, ReservationError> {
        self.find_tournament(tournament_id).await?;

        if !seats_in_tournament(&self.db, &principal.id, tournament_id)
            .await?
            .is_empty()
        {
            return Err(ReservationError::AlreadyLinked(ResourceKind::Tournament));
        }

        let party = watch_party::Entity::find()
            .filter(watch_party::Column::TournamentId.eq(tournament_id))
            .order_by_asc(watch_party::Column::Id)
            .one(&self.db)
            .await?
            .ok_or(ReservationError::NoWatchParty)?;

        SeatStore::new(&self.db)
            .try_reserve(&principal.id, party.id)
            .await
            .map_err(ReservationError::as_registration)?;

        Ok(tournament_id)
    }

    async fn unregister(
        &self,
        principal: &Principal,
        tournament_id: i32,
    ) -> Result<i32, ReservationError> {
        self.find_tournament(tournament_id).await?;

        let txn = self.db.begin().await?;

        let seats = seats_in_tournament(&txn, &principal.id, tournament_id).await?;
        if seats.is_empty() {
            return Err(ReservationError::NotLinked(ResourceKind::Tournament));
        }

        // An organizer stays registered through their own party
        let ledger = Ledger::watch_parties(&txn);
        for party_id in &seats {
            if ledger.is_owner(&principal.id, *party_id).await? {
                return Err(ReservationError::OwnerCannotLeave(ResourceKind::Tournament));
            }
        }

        let store = SeatStore::new(&txn);
        for party_id in seats {
            store
                .release(&principal.id, party_id)
                .await
                .map_err(ReservationError::as_registration)?;
        }

        txn.commit().await?;
        Ok(tournament_id)
    }
}
