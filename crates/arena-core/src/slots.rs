//! Capacity-constrained slots
//!
//! Two kinds of slot live here:
//! - **Watch-party seats**: bounded by `max_attendees`. The `seats_taken`
//!   counter is only incremented by a conditional update that matches while
//!   `seats_taken < max_attendees`, so the store itself refuses the seat past
//!   capacity even when joins interleave.
//! - **Lab slots**: one booking per `(lab_id, booking_date)`, enforced by the
//!   `idx_lab_bookings_slot` unique index. Inserts are attempted directly and
//!   the violation is translated into [`ReservationError::SlotTaken`].

use arena_db::entities::{lab_booking, watch_party};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use crate::error::{ReservationError, ResourceKind};
use crate::ledger::Ledger;

/// Watch-party seat reservations on top of the attendance ledger
pub struct SeatStore<'c, C> {
    conn: &'c C,
}

impl<'c, C> SeatStore<'c, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn current_occupancy(&self, party_id: i32) -> Result<u64, DbErr> {
        Ledger::watch_parties(self.conn).occupancy(party_id).await
    }

    /// Take a seat for `user_id`; nothing is written unless every check passes
    pub async fn try_reserve(&self, user_id: &str, party_id: i32) -> Result<(), ReservationError> {
        let txn = self.conn.begin().await?;

        if watch_party::Entity::find_by_id(party_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ReservationError::NotFound(ResourceKind::WatchParty));
        }

        let ledger = Ledger::watch_parties(&txn);
        if ledger.is_member(user_id, party_id).await? {
            return Err(ReservationError::AlreadyLinked(ResourceKind::WatchParty));
        }

        let claimed = watch_party::Entity::update_many()
            .col_expr(
                watch_party::Column::SeatsTaken,
                Expr::col(watch_party::Column::SeatsTaken).add(1),
            )
            .filter(watch_party::Column::Id.eq(party_id))
            .filter(
                Expr::col(watch_party::Column::SeatsTaken)
                    .lt(Expr::col(watch_party::Column::MaxAttendees)),
            )
            .exec(&txn)
            .await?;

        if claimed.rows_affected == 0 {
            debug!("Watch party {} is full, seat refused for {}", party_id, user_id);
            return Err(ReservationError::AtCapacity(ResourceKind::WatchParty));
        }

        // A concurrent join by the same principal loses here on the primary key
        ledger.add(user_id, party_id).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Give the seat back; the organizer keeps theirs
    pub async fn release(&self, user_id: &str, party_id: i32) -> Result<(), ReservationError> {
        let txn = self.conn.begin().await?;

        Ledger::watch_parties(&txn).remove(user_id, party_id).await?;

        watch_party::Entity::update_many()
            .col_expr(
                watch_party::Column::SeatsTaken,
                Expr::col(watch_party::Column::SeatsTaken).sub(1),
            )
            .filter(watch_party::Column::Id.eq(party_id))
            .filter(watch_party::Column::SeatsTaken.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }
}

/// Requested booking of one lab for one day
#[derive(Debug, Clone)]
pub struct LabSlot<'a> {
    pub lab_id: i32,
    pub team_id: i32,
    pub booking_date: NaiveDate,
    pub booked_by: &'a str,
}

/// Insert a booking, relying on the unique slot index to settle races
pub async fn claim_lab_slot<C>(
    conn: &C,
    slot: LabSlot<'_>,
) -> Result<lab_booking::Model, ReservationError>
where
    C: ConnectionTrait,
{
    lab_booking::ActiveModel {
        lab_id: Set(slot.lab_id),
        team_id: Set(slot.team_id),
        booking_date: Set(slot.booking_date),
        booked_by_user_id: Set(slot.booked_by.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| {
        ReservationError::from_store(
            e,
            ReservationError::SlotTaken,
            ReservationError::NotFound(ResourceKind::Lab),
        )
    })
}

/// Move an existing booking to another slot, with the same guarantees as a claim
pub async fn move_lab_slot<C>(
    conn: &C,
    booking: lab_booking::Model,
    slot: LabSlot<'_>,
) -> Result<lab_booking::Model, ReservationError>
where
    C: ConnectionTrait,
{
    let mut active: lab_booking::ActiveModel = booking.into();
    active.lab_id = Set(slot.lab_id);
    active.team_id = Set(slot.team_id);
    active.booking_date = Set(slot.booking_date);

    active.update(conn).await.map_err(|e| {
        ReservationError::from_store(
            e,
            ReservationError::SlotTaken,
            ReservationError::NotFound(ResourceKind::Lab),
        )
    })
}

/// Ids of labs already booked on `date`
pub async fn booked_labs_on<C>(conn: &C, date: NaiveDate) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    lab_booking::Entity::find()
        .select_only()
        .column(lab_booking::Column::LabId)
        .filter(lab_booking::Column::BookingDate.eq(date))
        .into_tuple()
        .all(conn)
        .await
}
