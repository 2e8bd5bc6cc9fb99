//! Scoped home/away indicators.
//!
//! An indicator answers "is `club` at home (or away) on date `d` within
//! scope `s`?" as a literal of the model. Scopes are a single competition,
//! every competition of the club (global), or a day-block.
//!
//! The generator guarantees at most one match per club per competition per
//! date, so a competition-scoped indicator is exactly one match literal (or
//! never). Global and day-block indicators OR several competitions together
//! and get an auxiliary variable only when more than one match contributes.
//!
//! Indicators are created on first use and cached, so every rule reuses
//! the same literal instead of re-deriving it.

use std::collections::HashMap;
use std::fmt;

use super::{BoolModel, BoolVar, Literal};
use crate::models::{League, Match, Scope};

/// Home or away footing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

/// A derived indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// The club has no match in scope on that date.
    Never,
    /// True exactly when the literal is true.
    When(Literal),
}

impl Indicator {
    /// The literal, unless the indicator is constant false.
    #[inline]
    pub fn literal(self) -> Option<Literal> {
        match self {
            Indicator::Never => None,
            Indicator::When(l) => Some(l),
        }
    }

    /// Whether the indicator is constant false.
    #[inline]
    pub fn is_never(self) -> bool {
        matches!(self, Indicator::Never)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScopeKey {
    Competition(String),
    Global,
    Block(String),
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKey::Competition(id) => write!(f, "{id}"),
            ScopeKey::Global => write!(f, "global"),
            ScopeKey::Block(b) => write!(f, "block:{b}"),
        }
    }
}

/// Cached (date, scope, club, side) → indicator table.
#[derive(Debug, Clone)]
pub struct ScopedIndicators {
    /// (date, club) → (competition, "club is home" literal) per match.
    contributions: HashMap<(u32, String), Vec<(String, Literal)>>,
    /// competition → day-block.
    blocks: HashMap<String, String>,
    cache: HashMap<(u32, ScopeKey, String, Side), Indicator>,
    aux_vars: usize,
}

impl ScopedIndicators {
    /// Indexes match decision variables by date and club.
    ///
    /// `vars[i]` is the decision of `matches[i]` (true = first-listed hosts).
    pub fn new(league: &League, matches: &[Match], vars: &[BoolVar]) -> Self {
        let mut contributions: HashMap<(u32, String), Vec<(String, Literal)>> = HashMap::new();
        for (m, &x) in matches.iter().zip(vars) {
            contributions
                .entry((m.round, m.first.clone()))
                .or_default()
                .push((m.competition.clone(), x.lit()));
            contributions
                .entry((m.round, m.second.clone()))
                .or_default()
                .push((m.competition.clone(), !x));
        }

        let blocks = league
            .competitions()
            .iter()
            .map(|c| (c.id.clone(), c.block().to_string()))
            .collect();

        Self {
            contributions,
            blocks,
            cache: HashMap::new(),
            aux_vars: 0,
        }
    }

    /// Indicator for `club` on `date` within `scope`.
    pub fn get(
        &mut self,
        model: &mut BoolModel,
        date: u32,
        scope: &Scope,
        club: &str,
        side: Side,
    ) -> Indicator {
        let key = match scope {
            Scope::Competition(id) => ScopeKey::Competition(id.clone()),
            Scope::Global => ScopeKey::Global,
        };
        self.resolve(model, date, key, club, side)
    }

    /// Indicator for `club` being at home on `date` in any competition of `block`.
    pub fn block_home(
        &mut self,
        model: &mut BoolModel,
        date: u32,
        block: &str,
        club: &str,
    ) -> Indicator {
        self.resolve(model, date, ScopeKey::Block(block.to_string()), club, Side::Home)
    }

    /// Number of auxiliary OR variables created so far.
    pub fn aux_count(&self) -> usize {
        self.aux_vars
    }

    fn resolve(
        &mut self,
        model: &mut BoolModel,
        date: u32,
        key: ScopeKey,
        club: &str,
        side: Side,
    ) -> Indicator {
        let cache_key = (date, key, club.to_string(), side);
        if let Some(&ind) = self.cache.get(&cache_key) {
            return ind;
        }
        let key = &cache_key.1;

        let literals: Vec<Literal> = self
            .contributions
            .get(&(date, club.to_string()))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(competition, _)| match key {
                        ScopeKey::Competition(id) => competition == id,
                        ScopeKey::Global => true,
                        ScopeKey::Block(b) => self.blocks.get(competition) == Some(b),
                    })
                    .map(|&(_, home)| match side {
                        Side::Home => home,
                        Side::Away => !home,
                    })
                    .collect()
            })
            .unwrap_or_default();

        debug_assert!(
            !matches!(key, ScopeKey::Competition(_)) || literals.len() <= 1,
            "{club} plays twice in {key} on date {date}"
        );

        let indicator = match literals.as_slice() {
            [] => Indicator::Never,
            [single] => Indicator::When(*single),
            many => {
                self.aux_vars += 1;
                let name = format!("{side}_{key}_{date}_{club}");
                Indicator::When(model.add_or(name, many).lit())
            }
        };

        self.cache.insert(cache_key, indicator);
        indicator
    }
}
