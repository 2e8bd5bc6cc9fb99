//! Schedule (solution) model.
//!
//! A schedule is the resolved season: every generated match with its home
//! club, away club, date, and venue. [`Violation`]s are what the post-solve
//! audit reports against the league's rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A match with its home side decided.
///
/// Field names are the stable export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    /// Competition identifier.
    pub competition: String,
    /// Date number (1-based).
    pub date: u32,
    /// Home club.
    pub home: String,
    /// Away club.
    pub away: String,
    /// Venue (home club's stadium).
    pub venue: String,
}

impl ResolvedMatch {
    /// Creates a resolved match.
    pub fn new(
        competition: impl Into<String>,
        date: u32,
        home: impl Into<String>,
        away: impl Into<String>,
        venue: impl Into<String>,
    ) -> Self {
        Self {
            competition: competition.into(),
            date,
            home: home.into(),
            away: away.into(),
            venue: venue.into(),
        }
    }
}

/// A rule violation found in a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related club or competition.
    pub entity_id: String,
    /// Date the violation occurs on (0 = not date-specific).
    pub date: u32,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A club plays twice in one competition on one date.
    DoubleBooking,
    /// A competition does not have N×(N−1) matches or a pair is unbalanced.
    IncompleteRoundRobin,
    /// A co-local pair stood on opposite footing.
    CoLocalBroken,
    /// A cross pair stood on the same footing.
    CrossBroken,
    /// Two clubs sharing a stadium were both at home.
    StadiumConflict,
    /// A security group exceeded its simultaneous-home cap.
    SecurityCapExceeded,
    /// A home or away run exceeded the allowed length.
    StreakTooLong,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        date: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            date,
            message: message.into(),
        }
    }
}

/// A resolved season schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Resolved matches.
    pub matches: Vec<ResolvedMatch>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolved match.
    pub fn add_match(&mut self, m: ResolvedMatch) {
        self.matches.push(m);
    }

    /// Sorts matches by competition, then date, then home club.
    pub fn sort(&mut self) {
        self.matches.sort_by(|a, b| {
            a.competition
                .cmp(&b.competition)
                .then(a.date.cmp(&b.date))
                .then_with(|| a.home.cmp(&b.home))
        });
    }

    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Last date in use (0 for an empty schedule).
    pub fn last_date(&self) -> u32 {
        self.matches.iter().map(|m| m.date).max().unwrap_or(0)
    }

    /// Matches of one competition.
    pub fn matches_for_competition(&self, competition: &str) -> Vec<&ResolvedMatch> {
        self.matches
            .iter()
            .filter(|m| m.competition == competition)
            .collect()
    }

    /// Match counts per competition.
    pub fn count_by_competition(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.matches {
            *counts.entry(m.competition.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Dates on which `club` is at home (optionally within one competition).
    pub fn home_dates(&self, club: &str, competition: Option<&str>) -> Vec<u32> {
        self.dates_where(competition, |m| m.home == club)
    }

    /// Dates on which `club` is away (optionally within one competition).
    pub fn away_dates(&self, club: &str, competition: Option<&str>) -> Vec<u32> {
        self.dates_where(competition, |m| m.away == club)
    }

    fn dates_where<F>(&self, competition: Option<&str>, pred: F) -> Vec<u32>
    where
        F: Fn(&ResolvedMatch) -> bool,
    {
        let mut dates: Vec<u32> = self
            .matches
            .iter()
            .filter(|m| competition.map_or(true, |c| m.competition == c))
            .filter(|m| pred(m))
            .map(|m| m.date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }
}
