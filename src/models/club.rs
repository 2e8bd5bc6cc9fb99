//! Club (schedulable entity) model.
//!
//! A real-world club may field several entities (senior side, youth
//! satellite, women's team). Each entity is a separate `Club` with its own
//! name; entities of the same club usually share a stadium.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Venue reported when a club has no stadium on record.
pub const UNCONFIRMED_VENUE: &str = "To be confirmed";

/// A schedulable participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    /// Unique club name.
    pub name: String,
    /// Home stadium identifier. `None` = unknown venue.
    #[serde(default)]
    pub stadium: Option<String>,
    /// Category flags (e.g. "senior", "u17", "women"). Only `true` flags count.
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    /// Major division tag used to split a category into parallel brackets.
    #[serde(default)]
    pub major_division: Option<String>,
}

impl Club {
    /// Creates a club with no stadium, categories, or division.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stadium: None,
            categories: BTreeMap::new(),
            major_division: None,
        }
    }

    /// Sets the home stadium.
    pub fn with_stadium(mut self, stadium: impl Into<String>) -> Self {
        self.stadium = Some(stadium.into());
        self
    }

    /// Activates a category flag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into(), true);
        self
    }

    /// Sets the major division tag.
    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.major_division = Some(division.into());
        self
    }

    /// Whether the given category flag is active.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.get(category).copied().unwrap_or(false)
    }

    /// Venue used when this club plays at home.
    pub fn venue(&self) -> &str {
        self.stadium.as_deref().unwrap_or(UNCONFIRMED_VENUE)
    }
}

/// Clubs sharing one physical venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StadiumGroup {
    /// Stadium identifier.
    pub stadium: String,
    /// Member club names, sorted.
    pub clubs: Vec<String>,
}

impl StadiumGroup {
    /// Groups clubs by stadium, keeping only stadiums with at least two clubs.
    ///
    /// Clubs without a stadium never form a group. Output is ordered by
    /// stadium identifier.
    pub fn from_clubs<'a>(clubs: impl IntoIterator<Item = &'a Club>) -> Vec<StadiumGroup> {
        let mut by_stadium: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for club in clubs {
            if let Some(stadium) = club.stadium.as_deref() {
                by_stadium.entry(stadium).or_default().insert(club.name.as_str());
            }
        }

        by_stadium
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|(stadium, members)| StadiumGroup {
                stadium: stadium.to_string(),
                clubs: members.into_iter().map(str::to_string).collect(),
            })
            .collect()
    }
}
