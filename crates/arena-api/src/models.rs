use arena_core::{LabField, SearchFilter, TeamField, TournamentField, WatchPartyField};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: Some(code.to_string()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Number of connected change-event listeners
    pub listeners: usize,
}

/// Current occupancy of a watch party
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendeeCount {
    pub watch_party_id: i32,
    pub count: u64,
}

/// Filter for available teams
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamSearch {
    /// Field to search (defaults to name)
    pub field: Option<TeamField>,
    /// Case-insensitive search term
    pub q: Option<String>,
}

/// Filter for available labs on a given day
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LabSearch {
    /// Day to check (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Field to search (name or description)
    pub field: Option<LabField>,
    /// Case-insensitive search term
    pub q: Option<String>,
}

/// Filter for available tournaments
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TournamentSearch {
    /// Field to search (name, game or genre)
    pub field: Option<TournamentField>,
    /// Case-insensitive search term
    pub q: Option<String>,
}

/// Filter for available watch parties
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WatchPartySearch {
    /// Field to search (tournament, location or date, e.g. "May 1, 2025")
    pub field: Option<WatchPartyField>,
    /// Case-insensitive search term
    pub q: Option<String>,
}

/// Bookings listing window
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingWindow {
    /// Earliest booking date to include (defaults to today)
    pub from: Option<NaiveDate>,
}

/// No filter when the term is absent
pub(crate) fn search<F: Copy + Default>(field: Option<F>, q: Option<String>) -> Option<SearchFilter<F>> {
    q.map(|term| SearchFilter::new(field.unwrap_or_default(), term))
}
