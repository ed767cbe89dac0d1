//! Read-side view types

use arena_db::entities::computer_lab;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::filter::{
    LabField, Searchable, TeamField, TournamentField, WatchPartyField, SEARCH_DATE_FORMAT,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamView {
    pub id: i32,
    pub name: String,
    pub creator_id: String,
    /// True when the viewing principal created the team
    pub is_creator: bool,
    pub member_count: u64,
    /// When the viewing principal joined; `None` in "available" views
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Searchable<TeamField> for TeamView {
    fn search_text(&self, field: TeamField) -> Option<String> {
        match field {
            TeamField::Name => Some(self.name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LabView {
    pub id: i32,
    pub name: String,
    pub computer_count: i32,
    pub description: Option<String>,
}

impl From<computer_lab::Model> for LabView {
    fn from(lab: computer_lab::Model) -> Self {
        Self {
            id: lab.id,
            name: lab.name,
            computer_count: lab.computer_count,
            description: lab.description,
        }
    }
}

impl Searchable<LabField> for LabView {
    fn search_text(&self, field: LabField) -> Option<String> {
        match field {
            LabField::Name => Some(self.name.clone()),
            LabField::Description => self.description.clone(),
        }
    }
}

/// A booking joined with lab, team and booker names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingView {
    pub id: i32,
    pub lab_id: i32,
    pub lab_name: String,
    pub team_id: i32,
    pub team_name: String,
    pub booking_date: NaiveDate,
    pub booked_by_user_id: String,
    pub booked_by_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TournamentView {
    pub id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub game_title: String,
    pub genre: Option<String>,
    pub prize_fund: Option<String>,
    pub creator_id: String,
    pub is_creator: bool,
    /// Creator, or organizer of one of its watch parties
    pub can_manage: bool,
    pub watch_party_count: u64,
    /// When the viewing principal took a seat at one of its watch parties
    pub registered_at: Option<DateTime<Utc>>,
}

impl Searchable<TournamentField> for TournamentView {
    fn search_text(&self, field: TournamentField) -> Option<String> {
        match field {
            TournamentField::Name => Some(self.name.clone()),
            TournamentField::Game => Some(self.game_title.clone()),
            TournamentField::Genre => self.genre.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WatchPartyView {
    pub id: i32,
    pub tournament_id: i32,
    pub tournament_name: String,
    pub creator_id: String,
    pub is_creator: bool,
    pub party_date_time: DateTime<Utc>,
    pub location: String,
    pub max_attendees: i32,
    pub attendee_count: u64,
    pub joined_at: Option<DateTime<Utc>>,
}

impl WatchPartyView {
    pub fn is_full(&self) -> bool {
        self.attendee_count >= self.max_attendees.max(0) as u64
    }
}

impl Searchable<WatchPartyField> for WatchPartyView {
    fn search_text(&self, field: WatchPartyField) -> Option<String> {
        match field {
            WatchPartyField::Tournament => Some(self.tournament_name.clone()),
            WatchPartyField::Location => Some(self.location.clone()),
            WatchPartyField::Date => Some(
                self.party_date_time
                    .format(SEARCH_DATE_FORMAT)
                    .to_string(),
            ),
        }
    }
}

/// Id/name pair for the watch-party form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TournamentOption {
    pub id: i32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::SearchFilter;
    use chrono::TimeZone;

    fn party() -> WatchPartyView {
        WatchPartyView {
            id: 1,
            tournament_id: 1,
            tournament_name: "Spring Invitational".to_string(),
            creator_id: "u1".to_string(),
            is_creator: false,
            party_date_time: Utc.with_ymd_and_hms(2025, 5, 1, 18, 30, 0).unwrap(),
            location: "Library".to_string(),
            max_attendees: 2,
            attendee_count: 2,
            joined_at: None,
        }
    }

    #[test]
    fn test_watch_party_date_search_uses_long_form() {
        let view = party();
        assert_eq!(
            view.search_text(WatchPartyField::Date).as_deref(),
            Some("May 1, 2025")
        );
        assert!(SearchFilter::new(WatchPartyField::Date, "may 1").matches(&view));
        assert!(!SearchFilter::new(WatchPartyField::Date, "june").matches(&view));
    }

    #[test]
    fn test_watch_party_full_when_attendees_reach_max() {
        let mut view = party();
        assert!(view.is_full());
        view.attendee_count = 1;
        assert!(!view.is_full());
    }

    #[test]
    fn test_tournament_genre_filter_skips_missing_genre() {
        let view = TournamentView {
            id: 1,
            name: "Cup".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            game_title: "Valorant".to_string(),
            genre: None,
            prize_fund: None,
            creator_id: "u1".to_string(),
            is_creator: true,
            can_manage: true,
            watch_party_count: 0,
            registered_at: None,
        };
        assert!(SearchFilter::new(TournamentField::Game, "valo").matches(&view));
        assert!(!SearchFilter::new(TournamentField::Genre, "fps").matches(&view));
    }
}
