//! Configuration validation and schedule auditing.
//!
//! [`validate_config`] checks structural integrity of a season document
//! before any model is built. It detects:
//! - An empty club table
//! - Duplicate or blank club names
//! - Duplicate competition IDs
//! - Competitions without categories
//! - Pairs declared both co_local and cross
//!
//! Every issue is collected and returned at once. Dangling references in
//! rules are not errors here: the model builder skips them with a warning.
//!
//! [`audit_schedule`] re-checks a resolved schedule against the league
//! directly, without going through the constraint model.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::{LeagueConfig, SolveSettings};
use crate::cp::check_rule;
use crate::models::{
    AffiliationRule, CoLocalGroups, League, Schedule, Violation, ViolationType,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The club table is empty.
    EmptyRoster,
    /// A club has a blank name.
    EmptyName,
    /// Two clubs share the same name.
    DuplicateClub,
    /// Two competitions share the same ID.
    DuplicateCompetition,
    /// A competition lists no qualifying category.
    NoCategories,
    /// A pair is declared both co_local and cross.
    ContradictoryRules,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a season document.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &LeagueConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.clubs.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "No clubs",
        ));
    }

    let mut names = HashSet::new();
    for club in &config.clubs {
        if club.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                "Club with a blank name",
            ));
        } else if !names.insert(club.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateClub,
                format!("Duplicate club: {}", club.name),
            ));
        }
    }

    let mut ids = HashSet::new();
    for def in &config.competitions {
        if !ids.insert(def.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCompetition,
                format!("Duplicate competition: {}", def.id),
            ));
        }
        if def.categories.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoCategories,
                format!("Competition '{}' has no categories", def.id),
            ));
        }
    }

    errors.extend(detect_contradictions(&config.rules));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Finds pairs that must both share and split their footing.
fn detect_contradictions(rules: &[AffiliationRule]) -> Vec<ValidationError> {
    let mut kinds: HashMap<(&str, &str), (bool, bool)> = HashMap::new();
    for rule in rules {
        let entry = kinds.entry(rule.pair()).or_default();
        if rule.is_co_local() {
            entry.0 = true;
        } else {
            entry.1 = true;
        }
    }

    let contradictory: BTreeSet<(&str, &str)> = kinds
        .into_iter()
        .filter(|&(_, (co_local, cross))| co_local && cross)
        .map(|(pair, _)| pair)
        .collect();

    contradictory
        .into_iter()
        .map(|(a, b)| {
            ValidationError::new(
                ValidationErrorKind::ContradictoryRules,
                format!("{a} and {b} are declared both co_local and cross"),
            )
        })
        .collect()
}

/// Home and away dates of every club, from a resolved schedule.
struct Footing<'s> {
    /// (date, club) → competitions hosted in.
    home: HashMap<(u32, &'s str), Vec<&'s str>>,
    /// (date, club) → competitions visited in.
    away: HashMap<(u32, &'s str), Vec<&'s str>>,
    /// (date, lower, higher) pairs that met.
    meetings: HashSet<(u32, &'s str, &'s str)>,
}

impl<'s> Footing<'s> {
    fn new(schedule: &'s Schedule) -> Self {
        let mut home: HashMap<(u32, &str), Vec<&str>> = HashMap::new();
        let mut away: HashMap<(u32, &str), Vec<&str>> = HashMap::new();
        let mut meetings = HashSet::new();
        for m in &schedule.matches {
            home.entry((m.date, m.home.as_str()))
                .or_default()
                .push(m.competition.as_str());
            away.entry((m.date, m.away.as_str()))
                .or_default()
                .push(m.competition.as_str());
            let (a, b) = if m.home <= m.away {
                (m.home.as_str(), m.away.as_str())
            } else {
                (m.away.as_str(), m.home.as_str())
            };
            meetings.insert((m.date, a, b));
        }
        Self {
            home,
            away,
            meetings,
        }
    }

    fn is_home(&self, date: u32, club: &str, competition: Option<&str>) -> bool {
        Self::lookup(&self.home, date, club, competition)
    }

    fn is_away(&self, date: u32, club: &str, competition: Option<&str>) -> bool {
        Self::lookup(&self.away, date, club, competition)
    }

    fn lookup(
        table: &HashMap<(u32, &str), Vec<&str>>,
        date: u32,
        club: &str,
        competition: Option<&str>,
    ) -> bool {
        table
            .get(&(date, club))
            .is_some_and(|comps| competition.map_or(true, |c| comps.contains(&c)))
    }

    fn hosts_any(&self, date: u32, club: &str, mut competition: impl FnMut(&str) -> bool) -> bool {
        self.home
            .get(&(date, club))
            .is_some_and(|comps| comps.iter().any(|c| competition(c)))
    }

    fn meet(&self, date: u32, a: &str, b: &str) -> bool {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        self.meetings.contains(&(date, a, b))
    }
}

/// Audits a resolved schedule against every league rule.
///
/// Checks:
/// 1. Each competition has N×(N−1) matches, each pair meeting twice
/// 2. No club plays twice in one competition on one date
/// 3. Affiliation rules hold on every date their pair does not meet
/// 4. Stadium groups host at most once per date and day-block
/// 5. Security groups respect their caps
/// 6. No home or away run exceeds `max_run` (when streaks are enforced)
pub fn audit_schedule(schedule: &Schedule, league: &League, settings: &SolveSettings) -> Vec<Violation> {
    let mut violations = Vec::new();
    let footing = Footing::new(schedule);
    let dates: Vec<u32> = (1..=schedule.last_date()).collect();

    audit_round_robin(schedule, league, &mut violations);

    let valid_rules: Vec<&AffiliationRule> = league
        .rules()
        .iter()
        .filter(|r| check_rule(league, r).is_ok())
        .collect();
    for rule in &valid_rules {
        audit_rule(rule, &footing, &dates, &mut violations);
    }

    let groups = CoLocalGroups::from_rules(valid_rules.iter().copied());
    audit_stadiums(league, &footing, &dates, &groups, &mut violations);

    for group in league.security_groups() {
        for &d in &dates {
            let hosting = group
                .clubs
                .iter()
                .filter(|c| footing.is_home(d, c, None))
                .count();
            if hosting > group.max_home as usize {
                violations.push(Violation::new(
                    ViolationType::SecurityCapExceeded,
                    &group.name,
                    d,
                    format!("{hosting} clubs at home, cap {}", group.max_home),
                ));
            }
        }
    }

    if settings.enforce_streaks {
        let max_run = settings.effective_max_run();
        for club in league.entities() {
            for (side, at) in [("home", true), ("away", false)] {
                let mut run = 0;
                for &d in &dates {
                    let on_side = if at {
                        footing.is_home(d, club, None)
                    } else {
                        footing.is_away(d, club, None)
                    };
                    run = if on_side { run + 1 } else { 0 };
                    if run == max_run + 1 {
                        violations.push(Violation::new(
                            ViolationType::StreakTooLong,
                            club,
                            d,
                            format!("{} consecutive {side} dates", run),
                        ));
                    }
                }
            }
        }
    }

    violations
}

fn audit_round_robin(schedule: &Schedule, league: &League, violations: &mut Vec<Violation>) {
    let counts = schedule.count_by_competition();
    for comp in league.competitions() {
        let found = counts.get(&comp.id).copied().unwrap_or(0);
        if found != comp.expected_matches() {
            violations.push(Violation::new(
                ViolationType::IncompleteRoundRobin,
                &comp.id,
                0,
                format!("{found} matches, expected {}", comp.expected_matches()),
            ));
        }

        let mut pairs: HashMap<(&str, &str), usize> = HashMap::new();
        let mut booked: HashSet<(u32, &str)> = HashSet::new();
        for m in schedule.matches_for_competition(&comp.id) {
            let pair = if m.home <= m.away {
                (m.home.as_str(), m.away.as_str())
            } else {
                (m.away.as_str(), m.home.as_str())
            };
            *pairs.entry(pair).or_default() += 1;
            for club in [m.home.as_str(), m.away.as_str()] {
                if !booked.insert((m.date, club)) {
                    violations.push(Violation::new(
                        ViolationType::DoubleBooking,
                        club,
                        m.date,
                        format!("{club} plays twice in {}", comp.id),
                    ));
                }
            }
        }
        for ((a, b), n) in pairs {
            if n != 2 {
                violations.push(Violation::new(
                    ViolationType::IncompleteRoundRobin,
                    &comp.id,
                    0,
                    format!("{a} and {b} meet {n} time(s)"),
                ));
            }
        }
    }
}

fn audit_rule(
    rule: &AffiliationRule,
    footing: &Footing<'_>,
    dates: &[u32],
    violations: &mut Vec<Violation>,
) {
    let (competition, a) = rule.anchor();
    let b = rule.other();
    let scope_b = rule.other_scope();
    let b_competition = scope_b.competition_id();

    for &d in dates {
        if footing.meet(d, a, b) {
            continue;
        }
        let broken = if rule.is_co_local() {
            (footing.is_home(d, a, Some(competition)) && footing.is_away(d, b, None))
                || (footing.is_home(d, b, None) && footing.is_away(d, a, Some(competition)))
        } else {
            (footing.is_home(d, a, Some(competition)) && footing.is_home(d, b, b_competition))
                || (footing.is_away(d, a, Some(competition))
                    && footing.is_away(d, b, b_competition))
        };
        if broken {
            let violation_type = if rule.is_co_local() {
                ViolationType::CoLocalBroken
            } else {
                ViolationType::CrossBroken
            };
            violations.push(Violation::new(violation_type, a, d, rule.to_string()));
        }
    }
}

fn audit_stadiums(
    league: &League,
    footing: &Footing<'_>,
    dates: &[u32],
    groups: &CoLocalGroups,
    violations: &mut Vec<Violation>,
) {
    let blocks: HashMap<&str, &str> = league
        .competitions()
        .iter()
        .map(|c| (c.id.as_str(), c.block()))
        .collect();

    for group in league.stadium_groups() {
        for &d in dates {
            for block in league.day_blocks() {
                let hosts: Vec<&str> = group
                    .clubs
                    .iter()
                    .map(String::as_str)
                    .filter(|club| {
                        footing.hosts_any(d, club, |c| blocks.get(c) == Some(&block))
                    })
                    .collect();
                for (i, a) in hosts.iter().enumerate() {
                    for b in &hosts[i + 1..] {
                        if !groups.are_grouped(a, b) {
                            violations.push(Violation::new(
                                ViolationType::StadiumConflict,
                                &group.stadium,
                                d,
                                format!("{a} and {b} both at home ({block})"),
                            ));
                        }
                    }
                }
            }
        }
    }
}
