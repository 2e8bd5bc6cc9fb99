//! Affiliation rules and simultaneity caps.
//!
//! Rules relate two clubs (possibly in different competitions) and are
//! evaluated per date. Every rule anchors its first club to an explicit
//! competition: clubs that play in several competitions accumulate far more
//! home dates than a single-competition satellite, so coupling their global
//! home/away state is generally unsatisfiable.
//!
//! | Rule | Per-date meaning |
//! |------|------------------|
//! | `co_local(ck, A, B)` | A home in ck ⇒ B not away anywhere; B home anywhere ⇒ A not away in ck |
//! | `cross(ck_A, A, ck_B, B)` | never both home, never both away (B in ck_B, or globally) |
//! | `cross_to_global(ck_A, A, B)` | cross with B taken globally |
//!
//! All rules are suspended on the dates where A and B meet head-to-head.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default simultaneous-home cap for a security group.
pub const DEFAULT_SECURITY_CAP: u32 = 2;

/// Where a club's home/away state is observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Only the club's matches in the named competition.
    Competition(String),
    /// Any of the club's matches.
    Global,
}

impl Scope {
    /// Competition scope.
    pub fn competition(id: impl Into<String>) -> Self {
        Self::Competition(id.into())
    }

    /// Competition identifier, `None` for global scope.
    pub fn competition_id(&self) -> Option<&str> {
        match self {
            Scope::Competition(id) => Some(id.as_str()),
            Scope::Global => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Competition(id) => write!(f, "{id}"),
            Scope::Global => write!(f, "global"),
        }
    }
}

/// A declared relationship between two clubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AffiliationRule {
    /// The two clubs move together: they never stand on opposite footing.
    CoLocal {
        competition: String,
        club: String,
        other: String,
    },

    /// The two clubs always stand on opposite footing.
    /// `other_competition: None` observes `other` globally.
    Cross {
        competition: String,
        club: String,
        #[serde(default)]
        other_competition: Option<String>,
        other: String,
    },

    /// Cross rule where `other` plays in a single competition.
    CrossToGlobal {
        competition: String,
        club: String,
        other: String,
    },
}

impl AffiliationRule {
    /// Creates a co-local rule anchored on `club`'s competition.
    pub fn co_local(
        competition: impl Into<String>,
        club: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        Self::CoLocal {
            competition: competition.into(),
            club: club.into(),
            other: other.into(),
        }
    }

    /// Creates a cross rule between two competition-scoped clubs.
    pub fn cross(
        competition: impl Into<String>,
        club: impl Into<String>,
        other_competition: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        Self::Cross {
            competition: competition.into(),
            club: club.into(),
            other_competition: Some(other_competition.into()),
            other: other.into(),
        }
    }

    /// Creates a cross rule where `other` is observed globally.
    pub fn cross_to_global(
        competition: impl Into<String>,
        club: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        Self::CrossToGlobal {
            competition: competition.into(),
            club: club.into(),
            other: other.into(),
        }
    }

    /// Anchored club and its competition.
    pub fn anchor(&self) -> (&str, &str) {
        match self {
            Self::CoLocal {
                competition, club, ..
            }
            | Self::Cross {
                competition, club, ..
            }
            | Self::CrossToGlobal {
                competition, club, ..
            } => (competition.as_str(), club.as_str()),
        }
    }

    /// The related club.
    pub fn other(&self) -> &str {
        match self {
            Self::CoLocal { other, .. }
            | Self::Cross { other, .. }
            | Self::CrossToGlobal { other, .. } => other.as_str(),
        }
    }

    /// Scope in which the related club is observed.
    pub fn other_scope(&self) -> Scope {
        match self {
            Self::Cross {
                other_competition: Some(ck),
                ..
            } => Scope::Competition(ck.clone()),
            _ => Scope::Global,
        }
    }

    /// Whether this rule lets the pair occupy the venue together.
    #[inline]
    pub fn is_co_local(&self) -> bool {
        matches!(self, Self::CoLocal { .. })
    }

    /// Unordered club pair, smaller name first.
    pub fn pair(&self) -> (&str, &str) {
        let (_, a) = self.anchor();
        let b = self.other();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Short rule kind name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::CoLocal { .. } => "co_local",
            Self::Cross { .. } => "cross",
            Self::CrossToGlobal { .. } => "cross_to_global",
        }
    }
}

impl fmt::Display for AffiliationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (competition, club) = self.anchor();
        write!(
            f,
            "{}({competition}, {club}, {}, {})",
            self.kind_name(),
            self.other_scope(),
            self.other()
        )
    }
}

/// Clubs sharing policing capacity, capped on simultaneous home games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    /// Group name (e.g. the municipality).
    pub name: String,
    /// Member clubs.
    pub clubs: Vec<String>,
    /// Maximum members at home on one date.
    #[serde(default = "default_security_cap")]
    pub max_home: u32,
}

fn default_security_cap() -> u32 {
    DEFAULT_SECURITY_CAP
}

impl SecurityGroup {
    /// Creates a group with the default cap.
    pub fn new(name: impl Into<String>, clubs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            clubs,
            max_home: DEFAULT_SECURITY_CAP,
        }
    }

    /// Sets the cap.
    pub fn with_max_home(mut self, max_home: u32) -> Self {
        self.max_home = max_home;
        self
    }
}

/// Clubs linked by chains of co_local rules.
///
/// Clubs in one group may be at home on the same date even when they share
/// a stadium.
#[derive(Debug, Clone, Default)]
pub struct CoLocalGroups {
    parent: HashMap<String, String>,
}

impl CoLocalGroups {
    /// Groups the clubs of every co_local rule in `rules`.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a AffiliationRule>) -> Self {
        let mut groups = Self::default();
        for rule in rules.into_iter().filter(|r| r.is_co_local()) {
            let (_, a) = rule.anchor();
            groups.union(a, rule.other());
        }
        groups
    }

    /// Whether `a` and `b` belong to the same group.
    pub fn are_grouped(&self, a: &str, b: &str) -> bool {
        a == b || (self.parent.contains_key(a) && self.root(a) == self.root(b))
    }

    /// Whether any two of `clubs` are grouped.
    pub fn any_grouped(&self, clubs: &[String]) -> bool {
        clubs
            .iter()
            .enumerate()
            .any(|(i, a)| clubs[i + 1..].iter().any(|b| self.are_grouped(a, b)))
    }

    fn root<'s>(&'s self, club: &'s str) -> &'s str {
        let mut current = club;
        while let Some(next) = self.parent.get(current) {
            if next == current {
                break;
            }
            current = next.as_str();
        }
        current
    }

    fn union(&mut self, a: &str, b: &str) {
        for club in [a, b] {
            self.parent
                .entry(club.to_string())
                .or_insert_with(|| club.to_string());
        }
        let ra = self.root(a).to_string();
        let rb = self.root(b).to_string();
        if ra != rb {
            self.parent.insert(rb, ra);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co_local_rule() {
        let r = AffiliationRule::co_local("SENIOR_B", "Rovers", "Rovers Youth");
        assert_eq!(r.anchor(), ("SENIOR_B", "Rovers"));
        assert_eq!(r.other(), "Rovers Youth");
        assert_eq!(r.other_scope(), Scope::Global);
        assert!(r.is_co_local());
    }

    #[test]
    fn test_cross_rule_scopes() {
        let r = AffiliationRule::cross("U17_B", "Reds", "SENIOR_A", "Blues");
        assert_eq!(r.other_scope(), Scope::competition("SENIOR_A"));
        assert!(!r.is_co_local());
        assert_eq!(r.pair(), ("Blues", "Reds"));

        let g = AffiliationRule::cross_to_global("SENIOR_A", "Blues", "Blues Women");
        assert_eq!(g.other_scope(), Scope::Global);
    }

    #[test]
    fn test_rule_serde_tagging() {
        let json = r#"[
            {"kind": "co_local", "competition": "A", "club": "X", "other": "Y"},
            {"kind": "cross", "competition": "A", "club": "X", "other_competition": "B", "other": "Z"},
            {"kind": "cross", "competition": "A", "club": "X", "other": "W"},
            {"kind": "cross_to_global", "competition": "A", "club": "X", "other": "V"}
        ]"#;
        let rules: Vec<AffiliationRule> = serde_json::from_str(json).unwrap();
        assert_eq!(rules.len(), 4);
        assert!(rules[0].is_co_local());
        assert_eq!(rules[1].other_scope(), Scope::competition("B"));
        assert_eq!(rules[2].other_scope(), Scope::Global);
        assert_eq!(rules[3].kind_name(), "cross_to_global");
    }

    #[test]
    fn test_rule_display() {
        let r = AffiliationRule::cross("U17_B", "Reds", "SENIOR_A", "Blues");
        assert_eq!(r.to_string(), "cross(U17_B, Reds, SENIOR_A, Blues)");
    }

    #[test]
    fn test_co_local_groups_are_transitive() {
        let rules = vec![
            AffiliationRule::co_local("A", "Reds", "Reds Youth"),
            AffiliationRule::co_local("A", "Reds Women", "Reds Youth"),
            AffiliationRule::cross("A", "Reds", "B", "Blues"),
        ];
        let groups = CoLocalGroups::from_rules(&rules);
        assert!(groups.are_grouped("Reds", "Reds Women"));
        assert!(groups.are_grouped("Reds Youth", "Reds"));
        assert!(!groups.are_grouped("Reds", "Blues"));
        assert!(!groups.are_grouped("Blues", "Greens"));
        assert!(groups.any_grouped(&["Blues".into(), "Reds".into(), "Reds Women".into()]));
        assert!(!groups.any_grouped(&["Blues".into(), "Reds".into()]));
    }

    #[test]
    fn test_security_group_default_cap() {
        let g: SecurityGroup =
            serde_json::from_str(r#"{"name": "Town", "clubs": ["A", "B", "C"]}"#).unwrap();
        assert_eq!(g.max_home, DEFAULT_SECURITY_CAP);
        assert_eq!(SecurityGroup::new("T", vec![]).with_max_home(1).max_home, 1);
    }
}
