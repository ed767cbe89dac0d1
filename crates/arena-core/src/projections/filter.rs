//! Case-insensitive substring filters for "available" views

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Long date form used when searching by date, e.g. "May 1, 2025"
pub const SEARCH_DATE_FORMAT: &str = "%B %-d, %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TeamField {
    #[default]
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum LabField {
    #[default]
    Name,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TournamentField {
    #[default]
    Name,
    Game,
    Genre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum WatchPartyField {
    #[default]
    Tournament,
    Location,
    Date,
}

/// A view that exposes text per searchable field
pub trait Searchable<F> {
    /// Text for `field`, `None` when the field is empty on this item
    fn search_text(&self, field: F) -> Option<String>;
}

/// Search term applied to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter<F> {
    pub field: F,
    pub term: String,
}

impl<F: Copy> SearchFilter<F> {
    pub fn new(field: F, term: impl Into<String>) -> Self {
        Self {
            field,
            term: term.into(),
        }
    }

    /// Blank terms match everything
    pub fn matches<T: Searchable<F>>(&self, item: &T) -> bool {
        let needle = self.term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        item.search_text(self.field)
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

pub(crate) fn apply<T, F>(items: Vec<T>, filter: Option<&SearchFilter<F>>) -> Vec<T>
where
    T: Searchable<F>,
    F: Copy,
{
    match filter {
        Some(filter) => items.into_iter().filter(|item| filter.matches(item)).collect(),
        None => items,
    }
}
