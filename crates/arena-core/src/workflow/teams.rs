//! Team roster operations

use arena_db::entities::{lab_booking, team, team_member};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::{required, unknown_principal, ArenaService, Operation};
use crate::error::{ReservationError, ResourceKind};
use crate::events::{ChangeAction, Collection};
use crate::identity::{Identity, Principal, Unauthenticated};
use crate::ledger::Ledger;
use crate::outcome::Outcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamInput {
    pub name: String,
}

const CREATE_TEAM: Operation = Operation {
    verb: "create team",
    action: ChangeAction::Created,
    collections: &[Collection::Teams],
};

const UPDATE_TEAM: Operation = Operation {
    verb: "update team",
    action: ChangeAction::Updated,
    collections: &[Collection::Teams],
};

const DELETE_TEAM: Operation = Operation {
    verb: "delete team",
    action: ChangeAction::Deleted,
    collections: &[Collection::Teams, Collection::LabBookings],
};

const JOIN_TEAM: Operation = Operation {
    verb: "join team",
    action: ChangeAction::Joined,
    collections: &[Collection::Teams],
};

const LEAVE_TEAM: Operation = Operation {
    verb: "leave team",
    action: ChangeAction::Left,
    collections: &[Collection::Teams],
};

impl ArenaService {
    /// Create a team; the creator becomes its first member in the same transaction
    pub async fn create_team(
        &self,
        identity: &Identity,
        input: TeamInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.insert_team(principal, &input).await;
        Ok(self.settle(&CREATE_TEAM, principal, result))
    }

    pub async fn update_team(
        &self,
        identity: &Identity,
        team_id: i32,
        input: TeamInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.rename_team(principal, team_id, &input).await;
        Ok(self.settle(&UPDATE_TEAM, principal, result))
    }

    /// Delete a team along with its memberships and lab bookings
    pub async fn delete_team(
        &self,
        identity: &Identity,
        team_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.remove_team(principal, team_id).await;
        Ok(self.settle(&DELETE_TEAM, principal, result))
    }

    pub async fn join_team(
        &self,
        identity: &Identity,
        team_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.link_team(principal, team_id).await;
        Ok(self.settle(&JOIN_TEAM, principal, result))
    }

    pub async fn leave_team(
        &self,
        identity: &Identity,
        team_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.unlink_team(principal, team_id).await;
        Ok(self.settle(&LEAVE_TEAM, principal, result))
    }

    async fn find_team(&self, team_id: i32) -> Result<team::Model, ReservationError> {
        team::Entity::find_by_id(team_id)
            .one(&self.db)
            .await?
            .ok_or(ReservationError::NotFound(ResourceKind::Team))
    }

    async fn link_team(&self, principal: &Principal, team_id: i32) -> Result<i32, ReservationError> {
        self.find_team(team_id).await?;
        Ledger::teams(&self.db).add(&principal.id, team_id).await?;
        Ok(team_id)
    }

    async fn unlink_team(
        &self,
        principal: &Principal,
        team_id: i32,
    ) -> Result<i32, ReservationError> {
        self.find_team(team_id).await?;
        Ledger::teams(&self.db).remove(&principal.id, team_id).await?;
        Ok(team_id)
    }

    async fn insert_team(
        &self,
        principal: &Principal,
        input: &TeamInput,
    ) -> Result<i32, ReservationError> {
        let name = required(&input.name, "Team name")?;
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let team = team::ActiveModel {
            name: Set(name),
            creator_id: Set(principal.id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            ReservationError::from_store(
                e,
                ReservationError::DuplicateName(ResourceKind::Team),
                unknown_principal(),
            )
        })?;

        Ledger::teams(&txn).add(&principal.id, team.id).await?;

        txn.commit().await?;
        Ok(team.id)
    }

    async fn rename_team(
        &self,
        principal: &Principal,
        team_id: i32,
        input: &TeamInput,
    ) -> Result<i32, ReservationError> {
        let name = required(&input.name, "Team name")?;
        let team = self.find_team(team_id).await?;

        if team.creator_id != principal.id {
            return Err(ReservationError::Forbidden(ResourceKind::Team));
        }

        let mut active = team.into_active_model();
        active.name = Set(name);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(|e| {
            ReservationError::from_store(
                e,
                ReservationError::DuplicateName(ResourceKind::Team),
                ReservationError::NotFound(ResourceKind::Team),
            )
        })?;

        Ok(team_id)
    }

    async fn remove_team(
        &self,
        principal: &Principal,
        team_id: i32,
    ) -> Result<i32, ReservationError> {
        let txn = self.db.begin().await?;

        match Ledger::teams(&txn).owner_of(team_id).await? {
            None => return Err(ReservationError::NotFound(ResourceKind::Team)),
            Some(owner) if owner != principal.id => {
                return Err(ReservationError::Forbidden(ResourceKind::Team))
            }
            Some(_) => {}
        }

        // Children first; the same rows would cascade on backends that enforce it
        lab_booking::Entity::delete_many()
            .filter(lab_booking::Column::TeamId.eq(team_id))
            .exec(&txn)
            .await?;
        team_member::Entity::delete_many()
            .filter(team_member::Column::TeamId.eq(team_id))
            .exec(&txn)
            .await?;
        team::Entity::delete_by_id(team_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(team_id)
    }
}
