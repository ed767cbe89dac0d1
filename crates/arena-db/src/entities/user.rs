//! User entity mirroring principals from the identity provider

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Opaque identity provider user id (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    /// When the principal was first seen
    pub created_at: ChronoDateTimeUtc,

    /// When the principal's names were last synchronized
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User created teams
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,

    /// User is a member of teams
    #[sea_orm(has_many = "super::team_member::Entity")]
    TeamMemberships,

    /// User booked labs
    #[sea_orm(has_many = "super::lab_booking::Entity")]
    LabBookings,

    /// User attends watch parties
    #[sea_orm(has_many = "super::watch_party_attendee::Entity")]
    WatchPartyAttendances,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMemberships.def()
    }
}

impl Related<super::lab_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LabBookings.def()
    }
}

impl Related<super::watch_party_attendee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchPartyAttendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
