//! LabBooking entity
//!
//! A lab can be booked at most once per calendar day. The rule lives in the
//! `idx_lab_bookings_slot` unique index, not in application code.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lab_bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub lab_id: i32,

    /// Team the lab is booked for
    pub team_id: i32,

    /// Booked day (no time-of-day component)
    pub booking_date: Date,

    /// User who made the booking and may change or cancel it
    pub booked_by_user_id: String,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::computer_lab::Entity",
        from = "Column::LabId",
        to = "super::computer_lab::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Lab,

    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BookedByUserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    BookedBy,
}

impl Related<super::computer_lab::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lab.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
