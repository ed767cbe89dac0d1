//! Lab booking operations

use arena_db::entities::{computer_lab, lab_booking, team};
use chrono::NaiveDate;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::{ArenaService, Operation};
use crate::error::{ReservationError, ResourceKind};
use crate::events::{ChangeAction, Collection};
use crate::identity::{Identity, Principal, Unauthenticated};
use crate::ledger::Ledger;
use crate::outcome::Outcome;
use crate::slots::{claim_lab_slot, move_lab_slot, LabSlot};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingInput {
    pub lab_id: i32,
    /// Team the lab is booked for; the booker must be a member
    pub team_id: i32,
    pub booking_date: NaiveDate,
}

const CREATE_BOOKING: Operation = Operation {
    verb: "book lab",
    action: ChangeAction::Created,
    collections: &[Collection::LabBookings],
};

const UPDATE_BOOKING: Operation = Operation {
    verb: "update booking",
    action: ChangeAction::Updated,
    collections: &[Collection::LabBookings],
};

const DELETE_BOOKING: Operation = Operation {
    verb: "cancel booking",
    action: ChangeAction::Deleted,
    collections: &[Collection::LabBookings],
};

impl ArenaService {
    pub async fn create_booking(
        &self,
        identity: &Identity,
        input: BookingInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.book_lab(principal, &input).await;
        Ok(self.settle(&CREATE_BOOKING, principal, result))
    }

    pub async fn update_booking(
        &self,
        identity: &Identity,
        booking_id: i32,
        input: BookingInput,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.rebook_lab(principal, booking_id, &input).await;
        Ok(self.settle(&UPDATE_BOOKING, principal, result))
    }

    pub async fn delete_booking(
        &self,
        identity: &Identity,
        booking_id: i32,
    ) -> Result<Outcome, Unauthenticated> {
        let principal = identity.resolve()?;
        let result = self.cancel_booking(principal, booking_id).await;
        Ok(self.settle(&DELETE_BOOKING, principal, result))
    }

    /// Lab and team must exist and the principal must belong to the team
    async fn check_booking_target(
        &self,
        principal: &Principal,
        input: &BookingInput,
    ) -> Result<(), ReservationError> {
        if computer_lab::Entity::find_by_id(input.lab_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ReservationError::NotFound(ResourceKind::Lab));
        }

        if team::Entity::find_by_id(input.team_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ReservationError::NotFound(ResourceKind::Team));
        }

        if !Ledger::teams(&self.db)
            .is_member(&principal.id, input.team_id)
            .await?
        {
            return Err(ReservationError::NotTeamMember);
        }

        Ok(())
    }

    async fn owned_booking(
        &self,
        principal: &Principal,
        booking_id: i32,
    ) -> Result<lab_booking::Model, ReservationError> {
        let booking = lab_booking::Entity::find_by_id(booking_id)
            .one(&self.db)
            .await?
            .ok_or(ReservationError::NotFound(ResourceKind::LabBooking))?;

        if booking.booked_by_user_id != principal.id {
            return Err(ReservationError::Forbidden(ResourceKind::LabBooking));
        }

        Ok(booking)
    }

    async fn book_lab(
        &self,
        principal: &Principal,
        input: &BookingInput,
    ) -> Result<i32, ReservationError> {
        self.check_booking_target(principal, input).await?;

        let booking = claim_lab_slot(
            &self.db,
            LabSlot {
                lab_id: input.lab_id,
                team_id: input.team_id,
                booking_date: input.booking_date,
                booked_by: &principal.id,
            },
        )
        .await?;

        Ok(booking.id)
    }

    async fn rebook_lab(
        &self,
        principal: &Principal,
        booking_id: i32,
        input: &BookingInput,
    ) -> Result<i32, ReservationError> {
        let booking = self.owned_booking(principal, booking_id).await?;
        self.check_booking_target(principal, input).await?;

        move_lab_slot(
            &self.db,
            booking,
            LabSlot {
                lab_id: input.lab_id,
                team_id: input.team_id,
                booking_date: input.booking_date,
                booked_by: &principal.id,
            },
        )
        .await?;

        Ok(booking_id)
    }

    async fn cancel_booking(
        &self,
        principal: &Principal,
        booking_id: i32,
    ) -> Result<i32, ReservationError> {
        self.owned_booking(principal, booking_id).await?;

        let deleted = lab_booking::Entity::delete_by_id(booking_id)
            .exec(&self.db)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(ReservationError::NotFound(ResourceKind::LabBooking));
        }

        Ok(booking_id)
    }
}
