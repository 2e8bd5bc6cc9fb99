//! Fixture planning pipeline and KPI evaluation.
//!
//! # Pipeline
//!
//! 1. Generate every competition's double round-robin (dates are fixed).
//! 2. Build the home/away model (rules, stadiums, security, streaks).
//! 3. Solve with any [`BoolSolver`].
//! 4. Map the solve status: no assignment is ever guessed. Infeasible and
//!    timed-out solves become errors.
//! 5. Decode, sort, and audit the schedule against the league.
//!
//! # KPI
//!
//! [`FixtureKpi`] reports completeness per competition, runs at the streak
//! limit, and the longest home/away runs.
//!
//! # References
//!
//! - Rasmussen, Trick (2008), "Round robin scheduling – a survey"
//! - Nemhauser, Trick (1998), "Scheduling a major college basketball conference"

mod assembler;
mod kpi;

pub use assembler::assemble;
pub use kpi::{CompetitionCount, FixtureKpi};

use crate::config::SolveSettings;
use crate::cp::{BoolSolver, FixtureCpBuilder, ModelStats, RuleWarning, SolveStatus};
use crate::error::{FixtureError, Result};
use crate::models::{League, Schedule};
use crate::round_robin;
use crate::validation::audit_schedule;

/// Result of a successful plan.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The resolved fixture, sorted by competition, date, home club.
    pub schedule: Schedule,
    /// Solver status (`Optimal` or `Feasible`).
    pub status: SolveStatus,
    /// Number of penalized streak windows.
    pub objective: Option<usize>,
    /// Configuration entries skipped while building.
    pub warnings: Vec<RuleWarning>,
    /// Model size.
    pub stats: ModelStats,
    /// Quality indicators.
    pub kpi: FixtureKpi,
}

/// Runs the full generate → model → solve → decode pipeline.
///
/// # Example
///
/// ```
/// use league_fixture::cp::SatBoolSolver;
/// use league_fixture::models::{Club, Competition, League};
/// use league_fixture::scheduler::FixturePlanner;
///
/// let league = League::new(vec![Club::new("A"), Club::new("B"), Club::new("C")])
///     .with_competition(Competition::new("CUP", vec!["A".into(), "B".into(), "C".into()]));
/// let outcome = FixturePlanner::new().plan(&league, &SatBoolSolver::new()).unwrap();
/// assert_eq!(outcome.schedule.match_count(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixturePlanner {
    settings: SolveSettings,
}

impl FixturePlanner {
    /// Creates a planner with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets model and solver settings.
    pub fn with_settings(mut self, settings: SolveSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &SolveSettings {
        &self.settings
    }

    /// Plans the season.
    ///
    /// # Errors
    /// - `Config` when no competition has at least two clubs
    /// - `Infeasible` when the solver proves no assignment exists
    /// - `Timeout` when the budget runs out without a solution
    /// - `Audit` when the decoded schedule breaks a league rule
    pub fn plan<S: BoolSolver>(&self, league: &League, solver: &S) -> Result<PlanOutcome> {
        log_competitions(league);

        let matches = round_robin::generate_all(league.competitions());
        if matches.is_empty() {
            return Err(FixtureError::Config(
                "no competition has at least two clubs".into(),
            ));
        }
        log::info!(
            "{} clubs, {} dates, {} matches",
            league.entities().len(),
            league.date_count(),
            matches.len()
        );

        let built = FixtureCpBuilder::new(league, &matches)
            .with_settings(self.settings.clone())
            .build();
        if !built.warnings.is_empty() {
            log::warn!("{} configuration entries skipped", built.warnings.len());
        }
        log::info!("model: {}", built.stats);

        let solution = solver.solve(&built.model, &self.settings.solver_config());
        log::info!(
            "status: {} ({} SAT call(s), {:.2?})",
            solution.status.description(),
            solution.stats.sat_calls,
            solution.stats.elapsed
        );

        match solution.status {
            SolveStatus::Infeasible => return Err(FixtureError::Infeasible),
            SolveStatus::Unknown => {
                return Err(FixtureError::Timeout {
                    seconds: self.settings.time_limit.as_secs(),
                })
            }
            SolveStatus::Optimal | SolveStatus::Feasible => {}
        }

        let schedule = assemble(league, &matches, &built.match_vars, &solution);
        let violations = audit_schedule(&schedule, league, &self.settings);
        if !violations.is_empty() {
            for v in &violations {
                log::error!("{:?} {} on date {}: {}", v.violation_type, v.entity_id, v.date, v.message);
            }
            return Err(FixtureError::Audit(
                violations.into_iter().map(|v| v.message).collect(),
            ));
        }

        let kpi = FixtureKpi::calculate(&schedule, league, self.settings.effective_max_run());
        kpi.log_summary();
        if let Some(penalty) = solution.objective {
            log::info!("streak penalty: {penalty}");
        }

        Ok(PlanOutcome {
            schedule,
            status: solution.status,
            objective: solution.objective,
            warnings: built.warnings,
            stats: built.stats,
            kpi,
        })
    }
}

fn log_competitions(league: &League) {
    for c in league.competitions() {
        log::info!(
            "{}: {} clubs, {} dates, {} matches per club (block {})",
            c.id,
            c.size(),
            c.round_count(),
            2 * (c.size() - 1),
            c.block()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BoolModel, SatBoolSolver, SolveStats, Solution, SolverConfig};
    use crate::models::{AffiliationRule, Club, Competition, SecurityGroup};

    /// Returns a fixed status and sets every variable to `fill`.
    struct FixedSolver {
        status: SolveStatus,
        fill: bool,
    }

    impl BoolSolver for FixedSolver {
        fn solve(&self, model: &BoolModel, _config: &SolverConfig) -> Solution {
            let values = if self.status.is_solution_found() {
                vec![self.fill; model.var_count()]
            } else {
                Vec::new()
            };
            Solution {
                status: self.status,
                values,
                objective: None,
                stats: SolveStats::default(),
            }
        }
    }

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn two_tier_league() -> League {
        let clubs = vec![
            Club::new("Reds").with_stadium("Park"),
            Club::new("Reds Youth").with_stadium("Park"),
            Club::new("Blues").with_stadium("Field"),
            Club::new("Blues Youth").with_stadium("Field"),
            Club::new("Greens").with_stadium("Green Lane"),
            Club::new("Whites").with_stadium("Arena"),
            Club::new("Golds").with_stadium("Gold Park"),
            Club::new("Blacks").with_stadium("Pit"),
        ];
        League::new(clubs)
            .with_competition(Competition::new(
                "SENIOR",
                roster(&["Blues", "Greens", "Reds", "Whites"]),
            ))
            .with_competition(Competition::new(
                "YOUTH",
                roster(&["Blacks", "Blues Youth", "Golds", "Reds Youth"]),
            ))
            .with_rule(AffiliationRule::co_local("SENIOR", "Reds", "Reds Youth"))
            .with_rule(AffiliationRule::cross_to_global("SENIOR", "Greens", "Golds"))
    }

    fn fast_settings() -> SolveSettings {
        SolveSettings::default()
            .with_time_limit(std::time::Duration::from_secs(30))
            .with_streak_penalties(false)
    }

    #[test]
    fn test_plan_end_to_end() {
        let league = two_tier_league();
        let outcome = FixturePlanner::new()
            .with_settings(fast_settings())
            .plan(&league, &SatBoolSolver::new())
            .unwrap();

        assert!(outcome.status.is_solution_found());
        assert_eq!(outcome.schedule.match_count(), 24);
        assert!(outcome.kpi.is_complete());
        assert!(outcome.kpi.longest_run() <= 3);
        assert!(outcome.warnings.is_empty());

        // Sorted by competition, date, home.
        let keys: Vec<(&str, u32, &str)> = outcome
            .schedule
            .matches
            .iter()
            .map(|m| (m.competition.as_str(), m.date, m.home.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        // Blues and Blues Youth share a stadium without a co_local rule.
        for d in 1..=6 {
            let blues = outcome.schedule.home_dates("Blues", None).contains(&d);
            let youth = outcome.schedule.home_dates("Blues Youth", None).contains(&d);
            assert!(!(blues && youth), "date {d}");
        }
        for m in &outcome.schedule.matches {
            assert_eq!(m.venue, league.venue_of(&m.home));
        }
    }

    #[test]
    fn test_plan_with_streak_penalties() {
        let league = League::new(vec![Club::new("A"), Club::new("B"), Club::new("C")])
            .with_competition(Competition::new("CUP", roster(&["A", "B", "C"])));
        let outcome = FixturePlanner::new()
            .plan(&league, &SatBoolSolver::new())
            .unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(outcome.kpi.runs_at_limit));
    }

    #[test]
    fn test_plan_infeasible() {
        let league = League::new(vec![Club::new("A"), Club::new("B")])
            .with_competition(Competition::new("CUP", roster(&["A", "B"])))
            .with_security_group(SecurityGroup::new("Town", roster(&["A", "B"])).with_max_home(0));
        let err = FixturePlanner::new()
            .plan(&league, &SatBoolSolver::new())
            .unwrap_err();
        assert!(matches!(err, FixtureError::Infeasible));
        assert!(err.is_solve_failure());
    }

    #[test]
    fn test_plan_timeout() {
        let league = two_tier_league();
        let solver = FixedSolver {
            status: SolveStatus::Unknown,
            fill: false,
        };
        let settings = SolveSettings::default().with_time_limit(std::time::Duration::from_secs(7));
        let err = FixturePlanner::new()
            .with_settings(settings)
            .plan(&league, &solver)
            .unwrap_err();
        assert!(matches!(err, FixtureError::Timeout { seconds: 7 }));
    }

    #[test]
    fn test_plan_rejects_solution_failing_audit() {
        let league = League::new(vec![Club::new("A"), Club::new("B")])
            .with_competition(Competition::new("CUP", roster(&["A", "B"])))
            .with_security_group(SecurityGroup::new("Town", roster(&["A", "B"])).with_max_home(0));
        let solver = FixedSolver {
            status: SolveStatus::Optimal,
            fill: true,
        };
        match FixturePlanner::new().plan(&league, &solver) {
            Err(FixtureError::Audit(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected audit failure, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_without_competitions() {
        let league = League::new(vec![Club::new("A")]);
        let err = FixturePlanner::new()
            .plan(&league, &SatBoolSolver::new())
            .unwrap_err();
        assert!(matches!(err, FixtureError::Config(_)));
    }
}
