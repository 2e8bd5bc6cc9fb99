//! Boolean model solving.
//!
//! [`BoolSolver`] is the seam between the fixture model and a search
//! backend. [`SatBoolSolver`] translates the model to CNF with `rustsat`
//! and runs MiniSat, tightening an upper bound on the objective until the
//! solver proves no better assignment exists.
//!
//! # Algorithm
//!
//! 1. Normalize every constraint to `guard ∨ Σ lᵢ ≤ k`, where `guard` is the
//!    disjunction of negated enforcement literals
//!    (`Σ lᵢ ≥ k` becomes `Σ ¬lᵢ ≤ n − k`; equality becomes both).
//! 2. Bounds of `0` and `n − 1` become plain clauses. Other bounds become
//!    cardinality constraints, encoded by `rustsat`. An enforced bound is
//!    padded with `n − k` fresh literals implied by the enforcement
//!    conjunction, so it only binds when the conjunction holds.
//! 3. Solve. On SAT, record the incumbent and re-solve with
//!    `Σ objective ≤ cost − 1`. UNSAT after an incumbent proves optimality.
//!
//! Each SAT call runs under the remaining wall-clock budget and is
//! interrupted when it expires. The incumbent is then reported as feasible,
//! or the result is unknown when there is none.
//!
//! # Reference
//! - Eén, Sörensson (2003), "An extensible SAT-solver"
//! - Bailleux, Boufkhad (2003), "Efficient CNF encoding of boolean cardinality constraints"

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustsat::instances::{BasicVarManager, SatInstance};
use rustsat::solvers::{Interrupt, InterruptSolver, Solve, SolverResult};
use rustsat::types::constraints::CardConstraint;
use rustsat::types::{Clause, Lit, TernaryVal};
use rustsat_minisat::core::Minisat;

use super::{BoolModel, BoolVar, Comparison, Literal};

/// Default wall-clock limit.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(300);

/// Default worker hint.
pub const DEFAULT_WORKERS: usize = 8;

/// Solver parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock limit.
    pub time_limit: Duration,
    /// Parallelism hint for backends that support it.
    pub workers: usize,
    /// Seed for the variable order handed to the backend.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            workers: DEFAULT_WORKERS,
            seed: 0,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Sets the worker hint.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome category of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Best possible objective proven.
    Optimal,
    /// A solution exists; optimality not proven.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// Limit reached before any solution or proof.
    Unknown,
}

impl SolveStatus {
    /// Whether an assignment is available.
    pub fn is_solution_found(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    /// Operator-facing description.
    pub fn description(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal solution found",
            SolveStatus::Feasible => "feasible solution found (time limit reached before proving optimality)",
            SolveStatus::Infeasible => "model is infeasible",
            SolveStatus::Unknown => "no solution found within the time limit",
        }
    }
}

/// Search counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// SAT calls made (one per objective bound tried).
    pub sat_calls: u64,
    /// Improving solutions found.
    pub solutions: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Outcome category.
    pub status: SolveStatus,
    /// Variable values (empty unless a solution was found).
    pub values: Vec<bool>,
    /// Objective value of `values`.
    pub objective: Option<usize>,
    /// Search counters.
    pub stats: SolveStats,
}

impl Solution {
    /// Whether an assignment is available.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution_found()
    }

    /// Value of a variable, if a solution was found.
    pub fn value(&self, var: BoolVar) -> Option<bool> {
        self.values.get(var.index()).copied()
    }

    /// Value of a literal, if a solution was found.
    pub fn lit_value(&self, lit: Literal) -> Option<bool> {
        self.value(lit.var()).map(|v| v != lit.is_negated())
    }
}

/// A backend able to solve a [`BoolModel`].
pub trait BoolSolver {
    /// Solves the model within the configured limits.
    fn solve(&self, model: &BoolModel, config: &SolverConfig) -> Solution;
}

/// MiniSat through `rustsat`, with linear SAT-UNSAT search on the objective.
#[derive(Debug, Clone, Default)]
pub struct SatBoolSolver;

impl SatBoolSolver {
    /// Creates a solver.
    pub fn new() -> Self {
        Self
    }
}

/// Result of one SAT call.
enum SatOutcome {
    Sat(Vec<bool>),
    Unsat,
    Interrupted,
}

impl BoolSolver for SatBoolSolver {
    fn solve(&self, model: &BoolModel, config: &SolverConfig) -> Solution {
        let start = Instant::now();
        let deadline = start + config.time_limit;
        log::debug!(
            "solving {}: {} vars, {} constraints, {} objective terms ({} worker(s) requested, MiniSat runs on one)",
            model.name(),
            model.var_count(),
            model.constraint_count(),
            model.objective().len(),
            config.workers
        );

        let order = var_order(model.var_count(), config.seed);
        let mut stats = SolveStats::default();
        let mut best: Option<(usize, Vec<bool>)> = None;

        let status = loop {
            let bound = best.as_ref().map(|(cost, _)| cost - 1);
            let Some((instance, lits)) = encode(model, &order, bound) else {
                break exhausted(&best);
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break timed_out(&best);
            }

            stats.sat_calls += 1;
            match run_sat(instance, &lits, remaining) {
                Ok(SatOutcome::Sat(values)) => {
                    stats.solutions += 1;
                    let cost = model.objective_value(&values);
                    log::debug!("incumbent with cost {cost}");
                    best = Some((cost, values));
                    if cost == 0 {
                        break SolveStatus::Optimal;
                    }
                }
                Ok(SatOutcome::Unsat) => break exhausted(&best),
                Ok(SatOutcome::Interrupted) => break timed_out(&best),
                Err(err) => {
                    log::warn!("SAT backend failed: {err:#}");
                    break timed_out(&best);
                }
            }
        };

        stats.elapsed = start.elapsed();
        log::debug!(
            "search finished: {:?}, {} SAT call(s), {} solution(s), {:.2?}",
            status,
            stats.sat_calls,
            stats.solutions,
            stats.elapsed
        );

        let (objective, values) = match best {
            Some((cost, values)) if status.is_solution_found() => (Some(cost), values),
            _ => (None, Vec::new()),
        };
        Solution {
            status,
            values,
            objective,
            stats,
        }
    }
}

/// Status once the search space is closed.
fn exhausted(best: &Option<(usize, Vec<bool>)>) -> SolveStatus {
    if best.is_some() {
        SolveStatus::Optimal
    } else {
        SolveStatus::Infeasible
    }
}

/// Status when the budget ran out.
fn timed_out(best: &Option<(usize, Vec<bool>)>) -> SolveStatus {
    if best.is_some() {
        SolveStatus::Feasible
    } else {
        SolveStatus::Unknown
    }
}

/// Seeded permutation of model variables: `order[i]` is created i-th.
fn var_order(n: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    order
}

/// Builds the CNF instance, optionally capping the objective at `bound`.
///
/// Returns `None` when a constraint can never hold. The second element maps
/// model variable indices to SAT literals.
fn encode(
    model: &BoolModel,
    order: &[usize],
    objective_bound: Option<usize>,
) -> Option<(SatInstance<BasicVarManager>, Vec<Lit>)> {
    let mut instance: SatInstance<BasicVarManager> = SatInstance::new();
    let mut created: Vec<(usize, Lit)> = order.iter().map(|&i| (i, instance.new_lit())).collect();
    created.sort_unstable_by_key(|&(i, _)| i);
    let lits: Vec<Lit> = created.into_iter().map(|(_, lit)| lit).collect();
    let to_lit = |l: Literal| {
        let lit = lits[l.var().index()];
        if l.is_negated() {
            !lit
        } else {
            lit
        }
    };

    for c in model.constraints() {
        let terms: Vec<Lit> = c.terms.iter().map(|&l| to_lit(l)).collect();
        let negated: Vec<Lit> = terms.iter().map(|&l| !l).collect();
        let guard: Vec<Lit> = c.enforcement.iter().map(|&l| !to_lit(l)).collect();
        let n = terms.len() as i64;
        let k = c.bound as i64;
        match c.comparison {
            Comparison::AtMost => add_at_most(&mut instance, &terms, k, &guard)?,
            Comparison::AtLeast => add_at_most(&mut instance, &negated, n - k, &guard)?,
            Comparison::Equal => {
                add_at_most(&mut instance, &terms, k, &guard)?;
                add_at_most(&mut instance, &negated, n - k, &guard)?;
            }
        }
    }

    if let Some(bound) = objective_bound {
        let objective: Vec<Lit> = model.objective().iter().map(|&l| to_lit(l)).collect();
        add_at_most(&mut instance, &objective, bound as i64, &[])?;
    }

    Some((instance, lits))
}

/// Adds `guard ∨ Σ terms ≤ bound`. Returns `None` when it can never hold.
fn add_at_most(
    instance: &mut SatInstance<BasicVarManager>,
    terms: &[Lit],
    bound: i64,
    guard: &[Lit],
) -> Option<()> {
    let n = terms.len() as i64;
    if bound >= n {
        return Some(());
    }
    if bound < 0 {
        if guard.is_empty() {
            return None;
        }
        let clause: Clause = guard.iter().copied().collect();
        instance.add_clause(clause);
        return Some(());
    }

    if bound == 0 {
        for &t in terms {
            let clause: Clause = guard.iter().copied().chain([!t]).collect();
            instance.add_clause(clause);
        }
    } else if bound == n - 1 {
        let clause: Clause = guard.iter().copied().chain(terms.iter().map(|&t| !t)).collect();
        instance.add_clause(clause);
    } else if guard.is_empty() {
        instance.add_card_constr(CardConstraint::new_ub(terms.iter().copied(), bound as usize));
    } else {
        let mut padded = terms.to_vec();
        for _ in 0..(n - bound) {
            let pad = instance.new_lit();
            let clause: Clause = guard.iter().copied().chain([pad]).collect();
            instance.add_clause(clause);
            padded.push(pad);
        }
        instance.add_card_constr(CardConstraint::new_ub(padded, n as usize));
    }
    Some(())
}

/// One MiniSat call, interrupted once `budget` elapses.
fn run_sat(
    instance: SatInstance<BasicVarManager>,
    lits: &[Lit],
    budget: Duration,
) -> anyhow::Result<SatOutcome> {
    let mut solver = Minisat::default();
    solver.add_cnf(instance.into_cnf().0)?;

    let mut interrupter = solver.interrupter();
    let (done, finished) = mpsc::channel::<()>();
    // The timer is joined before `solver` is dropped.
    let result = thread::scope(|scope| {
        scope.spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = finished.recv_timeout(budget) {
                interrupter.interrupt();
            }
        });
        let result = solver.solve();
        drop(done);
        result
    })?;

    Ok(match result {
        SolverResult::Sat => SatOutcome::Sat(
            lits.iter()
                .map(|&lit| matches!(solver.lit_val(lit), Ok(TernaryVal::True)))
                .collect(),
        ),
        SolverResult::Unsat => SatOutcome::Unsat,
        SolverResult::Interrupted => SatOutcome::Interrupted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::LinearConstraint;

    fn solve(model: &BoolModel) -> Solution {
        SatBoolSolver::new().solve(model, &SolverConfig::default())
    }

    fn pigeonhole(pigeons: usize, holes: usize) -> BoolModel {
        let mut model = BoolModel::new("pigeonhole");
        let vars: Vec<Vec<BoolVar>> = (0..pigeons)
            .map(|p| {
                (0..holes)
                    .map(|h| model.new_bool_var(format!("p{p}h{h}")))
                    .collect()
            })
            .collect();
        for row in &vars {
            model.add(LinearConstraint::at_least(
                row.iter().map(|v| v.lit()).collect(),
                1,
            ));
        }
        for h in 0..holes {
            model.add(LinearConstraint::at_most(
                vars.iter().map(|row| row[h].lit()).collect(),
                1,
            ));
        }
        model
    }

    #[test]
    fn test_satisfiable_model() {
        let model = pigeonhole(3, 3);
        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.values.len(), model.var_count());
        assert!(model.violated(&sol.values).is_empty());
        assert_eq!(sol.objective, Some(0));
        assert_eq!(sol.stats.sat_calls, 1);
    }

    #[test]
    fn test_infeasible_model() {
        let model = pigeonhole(4, 3);
        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert!(!sol.is_solution_found());
        assert!(sol.values.is_empty());
    }

    #[test]
    fn test_unsatisfiable_bound() {
        let mut model = BoolModel::new("t");
        let a = model.new_bool_var("a");
        model.add(LinearConstraint::at_least(vec![a.lit()], 2));
        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert_eq!(sol.stats.sat_calls, 0);
    }

    #[test]
    fn test_minimizes_objective() {
        // Exactly 3 of 4 true; objective penalizes x0 and x1.
        let mut model = BoolModel::new("t");
        let vars: Vec<BoolVar> = (0..4).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add(LinearConstraint::equal(vars.iter().map(|v| v.lit()).collect(), 3));
        model.minimize([vars[0].lit(), vars[1].lit()]);

        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(1));
        assert_eq!(model.objective_value(&sol.values), 1);
        assert!(model.violated(&sol.values).is_empty());
    }

    #[test]
    fn test_enforcement_literal() {
        // p ⇒ a + b ≥ 2, and a + b ≤ 1 always: p must be false.
        let mut model = BoolModel::new("t");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let p = model.new_bool_var("p");
        model.add(LinearConstraint::at_most(vec![a.lit(), b.lit()], 1));
        model.add(LinearConstraint::at_least(vec![a.lit(), b.lit()], 2).only_enforce_if(vec![p.lit()]));
        model.add(LinearConstraint::at_least(vec![a.lit()], 1));

        let sol = solve(&model);
        assert!(sol.is_solution_found());
        assert_eq!(sol.value(p), Some(false));
        assert_eq!(sol.lit_value(!p), Some(true));
    }

    #[test]
    fn test_enforced_cardinality_is_padded() {
        // q ∧ r ⇒ at most 2 of 5; objective pushes q and r true and the
        // five terms are forced to at least 2.
        let mut model = BoolModel::new("t");
        let xs: Vec<BoolVar> = (0..5).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        let q = model.new_bool_var("q");
        let r = model.new_bool_var("r");
        let terms: Vec<Literal> = xs.iter().map(|v| v.lit()).collect();
        model.add(LinearConstraint::at_most(terms.clone(), 2).only_enforce_if(vec![q.lit(), r.lit()]));
        model.add(LinearConstraint::at_least(terms.clone(), 2));
        model.minimize([!q, !r]);

        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(0));
        assert!(model.violated(&sol.values).is_empty());
        assert_eq!(terms.iter().filter(|l| l.eval(&sol.values)).count(), 2);

        // Forcing three terms on makes the conjunction impossible.
        model.add(LinearConstraint::at_least(terms, 3));
        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(1));
        assert!(model.violated(&sol.values).is_empty());
    }

    #[test]
    fn test_unused_variable_gets_a_value() {
        let mut model = BoolModel::new("t");
        let a = model.new_bool_var("a");
        let free = model.new_bool_var("free");
        model.add(LinearConstraint::at_least(vec![a.lit()], 1));
        let sol = solve(&model);
        assert_eq!(sol.value(a), Some(true));
        assert!(sol.value(free).is_some());
    }

    #[test]
    fn test_zero_time_limit_is_unknown() {
        let model = pigeonhole(9, 8);
        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        let sol = SatBoolSolver::new().solve(&model, &config);
        assert_eq!(sol.status, SolveStatus::Unknown);
        assert!(sol.values.is_empty());
    }

    #[test]
    fn test_seed_is_deterministic() {
        let model = pigeonhole(5, 5);
        let config = SolverConfig::default().with_seed(42);
        let a = SatBoolSolver::new().solve(&model, &config);
        let b = SatBoolSolver::new().solve(&model, &config);
        assert_eq!(a.values, b.values);
        assert_eq!(var_order(10, 42), var_order(10, 42));
    }

    #[test]
    fn test_status_text() {
        assert!(SolveStatus::Optimal.is_solution_found());
        assert!(SolveStatus::Feasible.is_solution_found());
        assert!(!SolveStatus::Unknown.is_solution_found());
        assert_eq!(SolveStatus::Infeasible.description(), "model is infeasible");
    }
}
