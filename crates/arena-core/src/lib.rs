//! Reservation and membership core for the school esports arena
//!
//! Principals join teams, book computer labs for their teams, register for
//! tournaments and attend watch parties. Each relationship is governed by
//! ownership, uniqueness and capacity rules that are enforced by the store:
//!
//! - [`identity`]: explicit per-call [`Identity`], failing closed
//! - [`ledger`]: team membership and watch-party attendance
//! - [`slots`]: watch-party seats and lab/day booking slots
//! - [`workflow`]: [`ArenaService`] mutations returning an [`Outcome`]
//! - [`projections`]: "mine" and "available" read views
//! - [`events`]: change notifications published after each commit

pub mod error;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod outcome;
pub mod projections;
pub mod slots;
pub mod workflow;

pub use error::{ErrorCode, ReadError, ReservationError, ResourceKind};
pub use events::{ChangeAction, ChangeEvent, ChangeNotifier, Collection};
pub use identity::{sync_principal, Identity, Principal, Unauthenticated};
pub use outcome::Outcome;
pub use projections::{
    BookingView, LabField, LabView, SearchFilter, TeamField, TeamView, TournamentField,
    TournamentOption, TournamentView, WatchPartyField, WatchPartyView,
};
pub use workflow::{
    ArenaService, BookingInput, LabSpec, TeamInput, TournamentInput, WatchPartyInput,
    DEFAULT_LOCATION, DEFAULT_MAX_ATTENDEES,
};
