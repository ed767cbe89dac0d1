//! Database entities

pub mod computer_lab;
pub mod lab_booking;
pub mod team;
pub mod team_member;
pub mod tournament;
pub mod user;
pub mod watch_party;
pub mod watch_party_attendee;

pub mod prelude {
    pub use super::computer_lab::Entity as ComputerLab;
    pub use super::lab_booking::Entity as LabBooking;
    pub use super::team::Entity as Team;
    pub use super::team_member::Entity as TeamMember;
    pub use super::tournament::Entity as Tournament;
    pub use super::user::Entity as User;
    pub use super::watch_party::Entity as WatchParty;
    pub use super::watch_party_attendee::Entity as WatchPartyAttendee;
}
