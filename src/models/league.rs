//! League registry.
//!
//! Holds the static configuration of one season: clubs, resolved
//! competitions, affiliation rules, and security groups. Built once and
//! read by every later phase.

use std::collections::{BTreeMap, BTreeSet};

use super::{AffiliationRule, Club, Competition, CompetitionDef, SecurityGroup, StadiumGroup};

/// Static season configuration.
#[derive(Debug, Clone, Default)]
pub struct League {
    clubs: BTreeMap<String, Club>,
    competitions: Vec<Competition>,
    rules: Vec<AffiliationRule>,
    security_groups: Vec<SecurityGroup>,
}

impl League {
    /// Creates a league with the given clubs and no competitions.
    pub fn new(clubs: impl IntoIterator<Item = Club>) -> Self {
        Self {
            clubs: clubs.into_iter().map(|c| (c.name.clone(), c)).collect(),
            ..Self::default()
        }
    }

    /// Creates a league and resolves each definition against the club list.
    ///
    /// Definitions that resolve to fewer than two clubs are dropped.
    pub fn from_definitions(clubs: Vec<Club>, definitions: &[CompetitionDef]) -> Self {
        let mut league = Self::new(clubs);
        for def in definitions {
            let competition = def.resolve(league.clubs.values());
            if competition.is_playable() {
                league.competitions.push(competition);
            } else {
                log::info!(
                    "competition {} skipped: {} club(s) qualify",
                    def.id,
                    competition.size()
                );
            }
        }
        league
    }

    /// Adds a competition (ignored when it has fewer than two clubs).
    pub fn with_competition(mut self, competition: Competition) -> Self {
        if competition.is_playable() {
            self.competitions.push(competition);
        }
        self
    }

    /// Adds an affiliation rule.
    pub fn with_rule(mut self, rule: AffiliationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several affiliation rules, keeping declaration order.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = AffiliationRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds a security group.
    pub fn with_security_group(mut self, group: SecurityGroup) -> Self {
        self.security_groups.push(group);
        self
    }

    /// Looks up a club by name.
    pub fn club(&self, name: &str) -> Option<&Club> {
        self.clubs.get(name)
    }

    /// All clubs, ordered by name.
    pub fn clubs(&self) -> impl Iterator<Item = &Club> {
        self.clubs.values()
    }

    /// Looks up a competition by identifier.
    pub fn competition(&self, id: &str) -> Option<&Competition> {
        self.competitions.iter().find(|c| c.id == id)
    }

    /// Competitions in declaration order.
    pub fn competitions(&self) -> &[Competition] {
        &self.competitions
    }

    /// Affiliation rules in declaration order.
    pub fn rules(&self) -> &[AffiliationRule] {
        &self.rules
    }

    /// Security groups.
    pub fn security_groups(&self) -> &[SecurityGroup] {
        &self.security_groups
    }

    /// Clubs taking part in at least one competition, sorted.
    pub fn entities(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .competitions
            .iter()
            .flat_map(|c| c.clubs.iter().map(String::as_str))
            .collect();
        names.into_iter().collect()
    }

    /// Whether `club` takes part in at least one competition.
    pub fn is_entity(&self, club: &str) -> bool {
        self.competitions.iter().any(|c| c.contains(club))
    }

    /// Stadium groups among scheduled clubs.
    pub fn stadium_groups(&self) -> Vec<StadiumGroup> {
        StadiumGroup::from_clubs(self.clubs.values().filter(|c| self.is_entity(&c.name)))
    }

    /// Distinct day-blocks in use, sorted.
    pub fn day_blocks(&self) -> Vec<&str> {
        let blocks: BTreeSet<&str> = self.competitions.iter().map(|c| c.block()).collect();
        blocks.into_iter().collect()
    }

    /// Venue used when `club` plays at home.
    pub fn venue_of(&self, club: &str) -> &str {
        self.clubs
            .get(club)
            .map(Club::venue)
            .unwrap_or(super::UNCONFIRMED_VENUE)
    }

    /// Number of dates in the season (longest competition).
    pub fn date_count(&self) -> u32 {
        self.competitions
            .iter()
            .map(Competition::round_count)
            .max()
            .unwrap_or(0)
    }
}
