//! Read projections
//!
//! "Mine" and "available" views over each resource type. For any principal
//! the two views are disjoint and, without a filter, together cover every
//! resource. Nothing here writes.

mod filter;
mod queries;
mod views;

pub use filter::{
    LabField, SearchFilter, Searchable, TeamField, TournamentField, WatchPartyField,
    SEARCH_DATE_FORMAT,
};
pub use views::{BookingView, LabView, TeamView, TournamentOption, TournamentView, WatchPartyView};
