//! Identity resolution
//!
//! Every workflow call receives an explicit [`Identity`]. Resolving it is the
//! first step of each operation and fails closed when no principal is present.

use arena_db::entities::user;
use chrono::Utc;
use sea_orm::{sea_query::OnConflict, ConnectionTrait, DbErr, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// The authenticated actor performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Principal {
    /// Opaque id issued by the identity provider
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Principal {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Raised when an operation is invoked without an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Not authenticated")]
pub struct Unauthenticated;

/// Per-call authentication context
#[derive(Debug, Clone, Default)]
pub struct Identity(Option<Principal>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self(Some(principal))
    }

    /// Resolve the current principal, failing closed if absent
    pub fn resolve(&self) -> Result<&Principal, Unauthenticated> {
        self.0.as_ref().ok_or(Unauthenticated)
    }
}

impl From<Option<Principal>> for Identity {
    fn from(principal: Option<Principal>) -> Self {
        Self(principal)
    }
}

impl From<Principal> for Identity {
    fn from(principal: Principal) -> Self {
        Self::authenticated(principal)
    }
}

/// Mirror a principal into the local `users` table
///
/// Called by the identity adapter on every authenticated request. Inserts the
/// principal on first sight and refreshes the display name afterwards.
pub async fn sync_principal<C>(conn: &C, principal: &Principal) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let row = user::ActiveModel {
        id: Set(principal.id.clone()),
        first_name: Set(principal.first_name.clone()),
        last_name: Set(principal.last_name.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user::Entity::insert(row)
        .on_conflict(
            OnConflict::column(user::Column::Id)
                .update_columns([
                    user::Column::FirstName,
                    user::Column::LastName,
                    user::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}
