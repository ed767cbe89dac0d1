//! Structured result of a workflow mutation

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{ErrorCode, ReservationError};

/// `{success: true, id?}` or `{success: false, error, code}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Outcome {
    pub success: bool,

    /// Id of the created resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    /// Human-readable failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl Outcome {
    pub fn committed() -> Self {
        Self {
            success: true,
            id: None,
            error: None,
            code: None,
        }
    }

    pub fn created(id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::committed()
        }
    }

    /// Build a rejection; store failures get a generic "Failed to <verb>" message
    pub fn rejected(err: &ReservationError, verb: &str) -> Self {
        let error = match err {
            ReservationError::Store(_) => format!("Failed to {}", verb),
            other => other.to_string(),
        };

        Self {
            success: false,
            id: None,
            error: Some(error),
            code: Some(err.code()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceKind;
    use sea_orm::DbErr;

    #[test]
    fn test_created_serializes_id_only() {
        let json = serde_json::to_value(Outcome::created(7)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "id": 7}));
    }

    #[test]
    fn test_rejected_carries_message_and_code() {
        let outcome = Outcome::rejected(&ReservationError::SlotTaken, "book lab");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": "This lab is already booked for the selected date",
                "code": "SLOT_TAKEN"
            })
        );
    }

    #[test]
    fn test_store_failure_hides_database_detail() {
        let err = ReservationError::Store(DbErr::Custom("connection reset".to_string()));
        let outcome = Outcome::rejected(&err, "create team");
        assert_eq!(outcome.error.as_deref(), Some("Failed to create team"));
        assert_eq!(outcome.code, Some(ErrorCode::StoreFailure));

        let forbidden = Outcome::rejected(&ReservationError::Forbidden(ResourceKind::Team), "x");
        assert!(!forbidden.is_success());
    }
}
