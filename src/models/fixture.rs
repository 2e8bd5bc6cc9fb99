//! Match (fixture) model.
//!
//! A match pairs two clubs of one competition on a fixed round. Which club
//! is at home is decided later; "first" and "second" only record the
//! generator's listing order.

use serde::{Deserialize, Serialize};

/// Round-robin leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    First,
    Second,
}

/// A generated match with a fixed date and an undecided home side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Competition identifier.
    pub competition: String,
    /// Date number (1-based, shared across competitions).
    pub round: u32,
    /// First-listed club (home when the decision is `true`).
    pub first: String,
    /// Second-listed club (home when the decision is `false`).
    pub second: String,
    /// Leg this match belongs to.
    pub leg: Leg,
}

impl Match {
    /// Creates a match.
    pub fn new(
        competition: impl Into<String>,
        round: u32,
        first: impl Into<String>,
        second: impl Into<String>,
        leg: Leg,
    ) -> Self {
        Self {
            competition: competition.into(),
            round,
            first: first.into(),
            second: second.into(),
            leg,
        }
    }

    /// Whether `club` plays in this match.
    #[inline]
    pub fn involves(&self, club: &str) -> bool {
        self.first == club || self.second == club
    }

    /// Whether this match is between `a` and `b` (in either order).
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }

    /// Home and away club for a decision value.
    pub fn resolve(&self, first_is_home: bool) -> (&str, &str) {
        if first_is_home {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        }
    }
}
