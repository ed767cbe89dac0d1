//! Tournament entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tournaments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Tournament name (unique)
    #[sea_orm(unique)]
    pub name: String,

    /// Day the tournament is played
    pub date: Date,

    pub game_title: String,

    pub genre: Option<String>,

    pub prize_fund: Option<String>,

    /// Organizer allowed to edit or delete the tournament
    pub creator_id: String,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(has_many = "super::watch_party::Entity")]
    WatchParties,
}

impl Related<super::watch_party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchParties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
