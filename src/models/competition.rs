//! Competition model.
//!
//! A competition is one double round-robin tournament among a fixed roster.
//! Rosters are derived from club metadata through a [`CompetitionDef`]:
//! a club joins when any of the definition's categories is active on it
//! and, if the definition names a division, its major-division tag matches.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::Club;

/// Day-block used by competitions that do not declare one.
pub const DEFAULT_DAY_BLOCK: &str = "default";

/// Declarative competition definition (configuration input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionDef {
    /// Competition identifier (e.g. "SENIOR_A").
    pub id: String,
    /// Categories that qualify a club for this competition.
    pub categories: Vec<String>,
    /// Required major division. `None` = any division.
    #[serde(default)]
    pub division: Option<String>,
    /// Calendar day-block shared with other competitions.
    #[serde(default)]
    pub day_block: Option<String>,
}

impl CompetitionDef {
    /// Creates a definition over the given categories.
    pub fn new(id: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            id: id.into(),
            categories,
            division: None,
            day_block: None,
        }
    }

    /// Restricts membership to a major division.
    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    /// Sets the day-block.
    pub fn with_day_block(mut self, block: impl Into<String>) -> Self {
        self.day_block = Some(block.into());
        self
    }

    /// Whether a club qualifies for this competition.
    pub fn admits(&self, club: &Club) -> bool {
        let category_match = self.categories.iter().any(|c| club.has_category(c));
        let division_match = match &self.division {
            Some(div) => club.major_division.as_deref() == Some(div.as_str()),
            None => true,
        };
        category_match && division_match
    }

    /// Resolves the roster against a club list (sorted by name, deduplicated).
    pub fn resolve<'a>(&self, clubs: impl IntoIterator<Item = &'a Club>) -> Competition {
        let roster: BTreeSet<&str> = clubs
            .into_iter()
            .filter(|c| self.admits(c))
            .map(|c| c.name.as_str())
            .collect();

        Competition {
            id: self.id.clone(),
            clubs: roster.into_iter().map(str::to_string).collect(),
            day_block: self.day_block.clone(),
        }
    }
}

/// A competition with a resolved roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    /// Competition identifier.
    pub id: String,
    /// Participating clubs, in generator order.
    pub clubs: Vec<String>,
    /// Calendar day-block. `None` = the default block.
    pub day_block: Option<String>,
}

impl Competition {
    /// Creates a competition from an explicit roster.
    ///
    /// Repeated names are dropped, keeping the first occurrence, so a club
    /// never meets itself or plays twice on one date.
    pub fn new(id: impl Into<String>, clubs: Vec<String>) -> Self {
        let id = id.into();
        let listed = clubs.len();
        let mut seen = HashSet::with_capacity(listed);
        let clubs: Vec<String> = clubs.into_iter().filter(|c| seen.insert(c.clone())).collect();
        if clubs.len() < listed {
            log::warn!(
                "competition {id}: {} duplicate roster entr(ies) dropped",
                listed - clubs.len()
            );
        }
        Self {
            id,
            clubs,
            day_block: None,
        }
    }

    /// Sets the day-block.
    pub fn with_day_block(mut self, block: impl Into<String>) -> Self {
        self.day_block = Some(block.into());
        self
    }

    /// Number of clubs in the roster.
    #[inline]
    pub fn size(&self) -> usize {
        self.clubs.len()
    }

    /// Whether the roster is large enough to schedule.
    #[inline]
    pub fn is_playable(&self) -> bool {
        self.size() >= 2
    }

    /// Whether `club` takes part in this competition.
    pub fn contains(&self, club: &str) -> bool {
        self.clubs.iter().any(|c| c == club)
    }

    /// Rounds in one leg: N−1 for even rosters, N for odd (one bye per round).
    pub fn rounds_per_leg(&self) -> u32 {
        let n = self.size() as u32;
        if n < 2 {
            0
        } else if n % 2 == 0 {
            n - 1
        } else {
            n
        }
    }

    /// Total rounds over both legs.
    pub fn round_count(&self) -> u32 {
        self.rounds_per_leg() * 2
    }

    /// Expected match count over both legs: N×(N−1).
    pub fn expected_matches(&self) -> usize {
        let n = self.size();
        if n < 2 {
            0
        } else {
            n * (n - 1)
        }
    }

    /// Day-block key (the default block when none is declared).
    pub fn block(&self) -> &str {
        self.day_block.as_deref().unwrap_or(DEFAULT_DAY_BLOCK)
    }
}
