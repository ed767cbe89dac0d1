//! Computer lab reference data

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "computer_labs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Lab name (unique)
    #[sea_orm(unique)]
    pub name: String,

    /// Number of gaming-capable machines in the lab
    pub computer_count: i32,

    pub description: Option<String>,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lab_booking::Entity")]
    Bookings,
}

impl Related<super::lab_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
