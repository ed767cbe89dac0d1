//! WatchParty entity: a capacity-bounded viewing of a tournament

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watch_parties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub tournament_id: i32,

    /// Organizer; always an attendee and never allowed to leave
    pub creator_id: String,

    pub party_date_time: ChronoDateTimeUtc,

    pub location: String,

    pub max_attendees: i32,

    /// Seats currently held. Only ever changed by a conditional
    /// `seats_taken < max_attendees` update inside the same transaction that
    /// writes the attendee row.
    pub seats_taken: i32,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournament::Entity",
        from = "Column::TournamentId",
        to = "super::tournament::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Tournament,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(has_many = "super::watch_party_attendee::Entity")]
    Attendees,
}

impl Related<super::tournament::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournament.def()
    }
}

impl Related<super::watch_party_attendee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
