//! Fixture model construction.
//!
//! Translates a [`League`] and its generated matches into a [`BoolModel`]:
//!
//! - one decision variable per match (true = first-listed club hosts)
//! - affiliation rules on every date the pair does not meet head-to-head
//! - stadium exclusivity per date and day-block
//! - security caps on simultaneous home games
//! - hard and soft streak limits over consecutive dates
//!
//! The builder owns every intermediate table (indicator cache, head-to-head
//! lookup), so building is a pure function of its inputs.

use std::collections::HashSet;
use std::fmt;

use super::indicator::{Indicator, ScopedIndicators, Side};
use super::{BoolModel, BoolVar, LinearConstraint, Literal};
use crate::config::SolveSettings;
use crate::models::{AffiliationRule, CoLocalGroups, League, Match, Scope};

/// Why a rule or group entry was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleWarningKind {
    /// The club is not in the club table.
    UnknownClub,
    /// The competition does not exist or was dropped for lack of clubs.
    UnknownCompetition,
    /// The club does not take part in the named competition.
    NotInCompetition,
    /// Both sides of the rule name the same club.
    SameClub,
}

/// A configuration entry ignored while building the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWarning {
    /// The rule or group concerned.
    pub subject: String,
    /// Category.
    pub kind: RuleWarningKind,
    /// Description.
    pub message: String,
}

impl RuleWarning {
    fn new(subject: impl Into<String>, kind: RuleWarningKind, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {}", self.subject, self.message)
    }
}

/// Checks that every reference of `rule` resolves in `league`.
pub fn check_rule(league: &League, rule: &AffiliationRule) -> Result<(), RuleWarning> {
    let subject = rule.to_string();
    let (competition, club) = rule.anchor();
    let other = rule.other();

    if club == other {
        return Err(RuleWarning::new(
            subject,
            RuleWarningKind::SameClub,
            format!("{club} cannot be related to itself"),
        ));
    }
    for name in [club, other] {
        if league.club(name).is_none() {
            return Err(RuleWarning::new(
                subject,
                RuleWarningKind::UnknownClub,
                format!("unknown club {name}"),
            ));
        }
    }

    let other_scope = rule.other_scope();
    let mut scoped = vec![(competition, club)];
    if let Scope::Competition(other_competition) = &other_scope {
        scoped.push((other_competition.as_str(), other));
    }
    check_membership(league, &subject, &scoped)
}

fn check_membership(
    league: &League,
    subject: &str,
    scoped: &[(&str, &str)],
) -> Result<(), RuleWarning> {
    for &(competition, club) in scoped {
        let Some(comp) = league.competition(competition) else {
            return Err(RuleWarning::new(
                subject,
                RuleWarningKind::UnknownCompetition,
                format!("unknown competition {competition}"),
            ));
        };
        if !comp.contains(club) {
            return Err(RuleWarning::new(
                subject,
                RuleWarningKind::NotInCompetition,
                format!("{club} does not play in {competition}"),
            ));
        }
    }
    Ok(())
}

/// Size of the built model, by block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStats {
    /// Total variables.
    pub variables: usize,
    /// Total constraints.
    pub constraints: usize,
    /// Match decision variables.
    pub match_vars: usize,
    /// Auxiliary OR variables.
    pub aux_vars: usize,
    /// Streak penalty variables.
    pub penalty_vars: usize,
    /// Constraints emitted by affiliation rules.
    pub rule_constraints: usize,
    /// Rule-date combinations suspended by a head-to-head meeting.
    pub h2h_skips: usize,
    /// Stadium exclusivity constraints.
    pub stadium_constraints: usize,
    /// Security cap constraints.
    pub security_constraints: usize,
    /// Streak constraints (hard and soft).
    pub streak_constraints: usize,
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vars ({} matches, {} aux, {} penalties), {} constraints \
             (rules {}, stadium {}, security {}, streaks {}), {} head-to-head skips",
            self.variables,
            self.match_vars,
            self.aux_vars,
            self.penalty_vars,
            self.constraints,
            self.rule_constraints,
            self.stadium_constraints,
            self.security_constraints,
            self.streak_constraints,
            self.h2h_skips
        )
    }
}

/// A built model with its variable tables.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    /// The constraint model.
    pub model: BoolModel,
    /// `match_vars[i]` decides `matches[i]`.
    pub match_vars: Vec<BoolVar>,
    /// Streak penalty variables (the objective).
    pub penalties: Vec<BoolVar>,
    /// Entries skipped during the build.
    pub warnings: Vec<RuleWarning>,
    /// Model size.
    pub stats: ModelStats,
}

/// Dates on which two clubs meet directly.
#[derive(Debug, Clone, Default)]
struct HeadToHead {
    meetings: HashSet<(u32, String, String)>,
}

impl HeadToHead {
    fn from_matches(matches: &[Match]) -> Self {
        let meetings = matches
            .iter()
            .map(|m| {
                let (a, b) = ordered(&m.first, &m.second);
                (m.round, a.to_string(), b.to_string())
            })
            .collect();
        Self { meetings }
    }

    fn meet(&self, date: u32, a: &str, b: &str) -> bool {
        let (a, b) = ordered(a, b);
        self.meetings.contains(&(date, a.to_string(), b.to_string()))
    }
}

fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Builds the fixture model from a league and its generated matches.
///
/// # Example
/// ```
/// use league_fixture::cp::FixtureCpBuilder;
/// use league_fixture::models::{Club, Competition, League};
/// use league_fixture::round_robin;
///
/// let league = League::new(vec![Club::new("A"), Club::new("B")])
///     .with_competition(Competition::new("CUP", vec!["A".into(), "B".into()]));
/// let matches = round_robin::generate_all(league.competitions());
/// let built = FixtureCpBuilder::new(&league, &matches).build();
/// assert_eq!(built.match_vars.len(), 2);
/// ```
pub struct FixtureCpBuilder<'a> {
    league: &'a League,
    matches: &'a [Match],
    settings: SolveSettings,
}

impl<'a> FixtureCpBuilder<'a> {
    /// Creates a builder with default settings.
    pub fn new(league: &'a League, matches: &'a [Match]) -> Self {
        Self {
            league,
            matches,
            settings: SolveSettings::default(),
        }
    }

    /// Sets the streak and solve settings.
    pub fn with_settings(mut self, settings: SolveSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the model.
    pub fn build(&self) -> BuiltModel {
        let mut model = BoolModel::new("fixture");
        let match_vars: Vec<BoolVar> = self
            .matches
            .iter()
            .map(|m| {
                model.new_bool_var(format!(
                    "m_{}_{}_{}__{}",
                    m.competition, m.round, m.first, m.second
                ))
            })
            .collect();

        let mut indicators = ScopedIndicators::new(self.league, self.matches, &match_vars);
        let h2h = HeadToHead::from_matches(self.matches);
        let dates: Vec<u32> = (1..=self.matches.iter().map(|m| m.round).max().unwrap_or(0))
            .collect();

        let mut stats = ModelStats {
            match_vars: match_vars.len(),
            ..ModelStats::default()
        };
        let mut warnings = Vec::new();

        let mut valid_rules = Vec::new();
        for rule in self.league.rules() {
            match check_rule(self.league, rule) {
                Ok(()) => valid_rules.push(rule),
                Err(w) => {
                    log::warn!("{w}");
                    warnings.push(w);
                }
            }
        }

        for rule in &valid_rules {
            let before = model.constraint_count();
            stats.h2h_skips += self.add_rule(&mut model, &mut indicators, &h2h, &dates, rule);
            stats.rule_constraints += model.constraint_count() - before;
        }

        let groups = CoLocalGroups::from_rules(valid_rules.iter().copied());
        let before = model.constraint_count();
        self.add_stadium_constraints(&mut model, &mut indicators, &dates, &groups);
        stats.stadium_constraints = model.constraint_count() - before;

        let before = model.constraint_count();
        self.add_security_constraints(&mut model, &mut indicators, &dates, &mut warnings);
        stats.security_constraints = model.constraint_count() - before;

        let mut penalties = Vec::new();
        if self.settings.enforce_streaks {
            let before = model.constraint_count();
            penalties = self.add_streak_constraints(&mut model, &mut indicators, &dates);
            stats.streak_constraints = model.constraint_count() - before;
            model.minimize(penalties.iter().map(|p| p.lit()));
        }

        stats.aux_vars = indicators.aux_count();
        stats.penalty_vars = penalties.len();
        stats.variables = model.var_count();
        stats.constraints = model.constraint_count();
        log::debug!("model built: {stats}");

        BuiltModel {
            model,
            match_vars,
            penalties,
            warnings,
            stats,
        }
    }

    /// Emits one rule over all dates; returns the number of skipped dates.
    fn add_rule(
        &self,
        model: &mut BoolModel,
        indicators: &mut ScopedIndicators,
        h2h: &HeadToHead,
        dates: &[u32],
        rule: &AffiliationRule,
    ) -> usize {
        let (competition, a) = rule.anchor();
        let b = rule.other();
        let scope_a = Scope::competition(competition);
        let scope_b = rule.other_scope();
        let mut skipped = 0;

        for &d in dates {
            if h2h.meet(d, a, b) {
                skipped += 1;
                continue;
            }
            let label = format!("{rule}@{d}");
            if rule.is_co_local() {
                // A home in ck ⇒ B not away; B home ⇒ A not away in ck.
                not_both(
                    model,
                    indicators,
                    d,
                    (&scope_a, a, Side::Home),
                    (&Scope::Global, b, Side::Away),
                    &label,
                );
                not_both(
                    model,
                    indicators,
                    d,
                    (&scope_a, a, Side::Away),
                    (&Scope::Global, b, Side::Home),
                    &label,
                );
            } else {
                for side in [Side::Home, Side::Away] {
                    not_both(
                        model,
                        indicators,
                        d,
                        (&scope_a, a, side),
                        (&scope_b, b, side),
                        &label,
                    );
                }
            }
        }
        skipped
    }

    /// At most one member of a stadium group hosts per date and day-block.
    fn add_stadium_constraints(
        &self,
        model: &mut BoolModel,
        indicators: &mut ScopedIndicators,
        dates: &[u32],
        groups: &CoLocalGroups,
    ) {
        let blocks = self.league.day_blocks();
        for group in self.league.stadium_groups() {
            let has_exemptions = groups.any_grouped(&group.clubs);
            for &d in dates {
                for block in &blocks {
                    let hosts: Vec<(&str, Literal)> = group
                        .clubs
                        .iter()
                        .filter_map(|club| {
                            indicators
                                .block_home(model, d, block, club)
                                .literal()
                                .map(|l| (club.as_str(), l))
                        })
                        .collect();
                    if hosts.len() < 2 {
                        continue;
                    }

                    let label = format!("stadium {}@{d}/{block}", group.stadium);
                    if !has_exemptions {
                        model.add(
                            LinearConstraint::at_most(hosts.iter().map(|&(_, l)| l).collect(), 1)
                                .with_label(label),
                        );
                        continue;
                    }
                    for (i, &(a, la)) in hosts.iter().enumerate() {
                        for &(b, lb) in &hosts[i + 1..] {
                            if !groups.are_grouped(a, b) {
                                model.add_not_both(la, lb, label.clone());
                            }
                        }
                    }
                }
            }
        }
    }

    /// Caps simultaneous home games within each security group.
    fn add_security_constraints(
        &self,
        model: &mut BoolModel,
        indicators: &mut ScopedIndicators,
        dates: &[u32],
        warnings: &mut Vec<RuleWarning>,
    ) {
        for group in self.league.security_groups() {
            let mut members = Vec::with_capacity(group.clubs.len());
            for club in &group.clubs {
                if self.league.club(club).is_some() {
                    members.push(club.as_str());
                } else {
                    let w = RuleWarning::new(
                        format!("security group {}", group.name),
                        RuleWarningKind::UnknownClub,
                        format!("unknown club {club}"),
                    );
                    log::warn!("{w}");
                    warnings.push(w);
                }
            }

            let cap = group.max_home as usize;
            for &d in dates {
                let hosts: Vec<Literal> = members
                    .iter()
                    .filter_map(|club| {
                        indicators
                            .get(model, d, &Scope::Global, club, Side::Home)
                            .literal()
                    })
                    .collect();
                if hosts.len() > cap {
                    model.add(
                        LinearConstraint::at_most(hosts, cap)
                            .with_label(format!("security {}@{d}", group.name)),
                    );
                }
            }
        }
    }

    /// Hard run limit and soft penalties; returns the penalty variables.
    fn add_streak_constraints(
        &self,
        model: &mut BoolModel,
        indicators: &mut ScopedIndicators,
        dates: &[u32],
    ) -> Vec<BoolVar> {
        let max_run = self.settings.effective_max_run();
        let mut penalties = Vec::new();

        for club in self.league.entities() {
            for side in [Side::Home, Side::Away] {
                let series: Vec<Indicator> = dates
                    .iter()
                    .map(|&d| indicators.get(model, d, &Scope::Global, club, side))
                    .collect();

                for window in series.windows(max_run + 1) {
                    let lits: Vec<Literal> = window.iter().filter_map(|i| i.literal()).collect();
                    if lits.len() > max_run {
                        model.add(
                            LinearConstraint::at_most(lits, max_run)
                                .with_label(format!("max run {side} {club}")),
                        );
                    }
                }

                if !self.settings.minimize_streaks {
                    continue;
                }
                for (start, window) in series.windows(max_run).enumerate() {
                    let Some(lits) = window
                        .iter()
                        .map(|i| i.literal())
                        .collect::<Option<Vec<Literal>>>()
                    else {
                        continue;
                    };
                    let p = model.new_bool_var(format!("run_{side}_{club}_{}", dates[start]));
                    model.add(
                        LinearConstraint::at_least(lits.clone(), max_run)
                            .only_enforce_if(vec![p.lit()])
                            .with_label(format!("run {side} {club} on")),
                    );
                    model.add(
                        LinearConstraint::at_most(lits, max_run - 1)
                            .only_enforce_if(vec![!p])
                            .with_label(format!("run {side} {club} off")),
                    );
                    penalties.push(p);
                }
            }
        }
        penalties
    }
}

/// Adds `x + y ≤ 1` unless either indicator is constant false.
fn not_both(
    model: &mut BoolModel,
    indicators: &mut ScopedIndicators,
    date: u32,
    (scope_x, x, side_x): (&Scope, &str, Side),
    (scope_y, y, side_y): (&Scope, &str, Side),
    label: &str,
) {
    let Indicator::When(lx) = indicators.get(model, date, scope_x, x, side_x) else {
        return;
    };
    if let Indicator::When(ly) = indicators.get(model, date, scope_y, y, side_y) {
        model.add_not_both(lx, ly, label);
    }
}
