//! Computer lab reference data

use arena_db::entities::computer_lab;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ArenaService;
use crate::projections::LabView;

/// One entry of the lab catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSpec {
    pub name: String,
    #[serde(default)]
    pub computer_count: i32,
    #[serde(default)]
    pub description: Option<String>,
}

impl ArenaService {
    /// Insert a lab or refresh the one with the same name
    pub async fn register_lab(&self, spec: LabSpec) -> Result<LabView, DbErr> {
        let existing = computer_lab::Entity::find()
            .filter(computer_lab::Column::Name.eq(spec.name.as_str()))
            .one(&self.db)
            .await?;

        let lab = match existing {
            Some(lab) => {
                let mut active = lab.into_active_model();
                active.computer_count = Set(spec.computer_count);
                active.description = Set(spec.description);
                active.update(&self.db).await?
            }
            None => {
                let lab = computer_lab::ActiveModel {
                    name: Set(spec.name),
                    computer_count: Set(spec.computer_count),
                    description: Set(spec.description),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                info!("Registered lab {} ({})", lab.name, lab.id);
                lab
            }
        };

        Ok(LabView::from(lab))
    }
}
