//! Ownership and membership ledger
//!
//! Team membership and watch-party attendance share one shape: a composite
//! `(user_id, resource_id)` row plus a creator column on the resource. The
//! composite primary key is what keeps a principal from being linked twice,
//! the pre-checks below only produce friendlier errors.

use std::collections::HashSet;

use arena_db::entities::{team, team_member, watch_party, watch_party_attendee};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    Set,
};

use crate::error::{ReservationError, ResourceKind};

/// Which ledger to operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Team,
    WatchParty,
}

impl LedgerKind {
    pub fn resource(&self) -> ResourceKind {
        match self {
            LedgerKind::Team => ResourceKind::Team,
            LedgerKind::WatchParty => ResourceKind::WatchParty,
        }
    }
}

/// A ledger bound to a connection or open transaction
pub struct Ledger<'c, C> {
    conn: &'c C,
    kind: LedgerKind,
}

impl<'c, C> Ledger<'c, C>
where
    C: ConnectionTrait,
{
    pub fn new(conn: &'c C, kind: LedgerKind) -> Self {
        Self { conn, kind }
    }

    pub fn teams(conn: &'c C) -> Self {
        Self::new(conn, LedgerKind::Team)
    }

    pub fn watch_parties(conn: &'c C) -> Self {
        Self::new(conn, LedgerKind::WatchParty)
    }

    pub async fn is_member(&self, user_id: &str, resource_id: i32) -> Result<bool, DbErr> {
        let found = match self.kind {
            LedgerKind::Team => team_member::Entity::find_by_id((user_id.to_string(), resource_id))
                .one(self.conn)
                .await?
                .is_some(),
            LedgerKind::WatchParty => {
                watch_party_attendee::Entity::find_by_id((user_id.to_string(), resource_id))
                    .one(self.conn)
                    .await?
                    .is_some()
            }
        };
        Ok(found)
    }

    /// Stored creator id of the resource, `None` if it does not exist
    pub async fn owner_of(&self, resource_id: i32) -> Result<Option<String>, DbErr> {
        let owner = match self.kind {
            LedgerKind::Team => team::Entity::find_by_id(resource_id)
                .one(self.conn)
                .await?
                .map(|t| t.creator_id),
            LedgerKind::WatchParty => watch_party::Entity::find_by_id(resource_id)
                .one(self.conn)
                .await?
                .map(|p| p.creator_id),
        };
        Ok(owner)
    }

    pub async fn is_owner(&self, user_id: &str, resource_id: i32) -> Result<bool, DbErr> {
        Ok(self.owner_of(resource_id).await?.as_deref() == Some(user_id))
    }

    /// Link a principal to a resource
    pub async fn add(&self, user_id: &str, resource_id: i32) -> Result<(), ReservationError> {
        let resource = self.kind.resource();

        if self.is_member(user_id, resource_id).await? {
            return Err(ReservationError::AlreadyLinked(resource));
        }

        let now = Utc::now();
        let inserted = match self.kind {
            LedgerKind::Team => {
                let row = team_member::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    team_id: Set(resource_id),
                    joined_at: Set(now),
                };
                team_member::Entity::insert(row)
                    .exec_without_returning(self.conn)
                    .await
            }
            LedgerKind::WatchParty => {
                let row = watch_party_attendee::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    watch_party_id: Set(resource_id),
                    joined_at: Set(now),
                };
                watch_party_attendee::Entity::insert(row)
                    .exec_without_returning(self.conn)
                    .await
            }
        };

        inserted.map(|_| ()).map_err(|e| {
            ReservationError::from_store(
                e,
                ReservationError::AlreadyLinked(resource),
                ReservationError::NotFound(resource),
            )
        })
    }

    /// Unlink a principal; the resource's creator can never be unlinked this way
    pub async fn remove(&self, user_id: &str, resource_id: i32) -> Result<(), ReservationError> {
        let resource = self.kind.resource();

        if !self.is_member(user_id, resource_id).await? {
            return Err(ReservationError::NotLinked(resource));
        }

        if self.is_owner(user_id, resource_id).await? {
            return Err(ReservationError::OwnerCannotLeave(resource));
        }

        let deleted = match self.kind {
            LedgerKind::Team => {
                team_member::Entity::delete_by_id((user_id.to_string(), resource_id))
                    .exec(self.conn)
                    .await?
            }
            LedgerKind::WatchParty => {
                watch_party_attendee::Entity::delete_by_id((user_id.to_string(), resource_id))
                    .exec(self.conn)
                    .await?
            }
        };

        // Lost a race with a concurrent leave
        if deleted.rows_affected == 0 {
            return Err(ReservationError::NotLinked(resource));
        }

        Ok(())
    }

    /// Resources the principal is linked to, with the time they joined
    pub async fn list_for_principal(
        &self,
        user_id: &str,
    ) -> Result<Vec<(i32, DateTime<Utc>)>, DbErr> {
        match self.kind {
            LedgerKind::Team => team_member::Entity::find()
                .select_only()
                .column(team_member::Column::TeamId)
                .column(team_member::Column::JoinedAt)
                .filter(team_member::Column::UserId.eq(user_id))
                .into_tuple()
                .all(self.conn)
                .await,
            LedgerKind::WatchParty => watch_party_attendee::Entity::find()
                .select_only()
                .column(watch_party_attendee::Column::WatchPartyId)
                .column(watch_party_attendee::Column::JoinedAt)
                .filter(watch_party_attendee::Column::UserId.eq(user_id))
                .into_tuple()
                .all(self.conn)
                .await,
        }
    }

    /// Every resource id minus the ones the principal is linked to
    pub async fn list_excluding_principal(&self, user_id: &str) -> Result<Vec<i32>, DbErr> {
        let linked: HashSet<i32> = self
            .list_for_principal(user_id)
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        let all: Vec<i32> = match self.kind {
            LedgerKind::Team => team::Entity::find()
                .select_only()
                .column(team::Column::Id)
                .into_tuple()
                .all(self.conn)
                .await?,
            LedgerKind::WatchParty => watch_party::Entity::find()
                .select_only()
                .column(watch_party::Column::Id)
                .into_tuple()
                .all(self.conn)
                .await?,
        };

        Ok(all.into_iter().filter(|id| !linked.contains(id)).collect())
    }

    /// Number of principals linked to the resource
    pub async fn occupancy(&self, resource_id: i32) -> Result<u64, DbErr> {
        match self.kind {
            LedgerKind::Team => {
                team_member::Entity::find()
                    .filter(team_member::Column::TeamId.eq(resource_id))
                    .count(self.conn)
                    .await
            }
            LedgerKind::WatchParty => {
                watch_party_attendee::Entity::find()
                    .filter(watch_party_attendee::Column::WatchPartyId.eq(resource_id))
                    .count(self.conn)
                    .await
            }
        }
    }
}
