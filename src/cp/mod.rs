//! Home/away constraint formulation.
//!
//! Dates are fixed by the round-robin generator, so the only decision left
//! is which listed club hosts each match: one boolean per match. Everything
//! else (affiliation rules, stadium sharing, security caps, streaks) is a
//! cardinality constraint over derived home/away indicators.
//!
//! - [`model`]: literals, cardinality constraints, and the model container
//! - [`indicator`]: cached per-(date, scope, club) home/away literals
//! - [`builder`]: league → model translation
//! - [`solver`]: the solver seam and the MiniSat backend
//!
//! # Reference
//! - Rasmussen, Trick (2008), "Round robin scheduling – a survey"
//! - Trick (2001), "A schedule-then-break approach to sports timetabling"

pub mod builder;
pub mod indicator;
pub mod model;
pub mod solver;

pub use builder::{check_rule, BuiltModel, FixtureCpBuilder, ModelStats, RuleWarning, RuleWarningKind};
pub use indicator::{Indicator, ScopedIndicators, Side};
pub use model::{BoolModel, BoolVar, Comparison, LinearConstraint, Literal};
pub use solver::{
    BoolSolver, SatBoolSolver, SolveStats, SolveStatus, Solution, SolverConfig,
    DEFAULT_TIME_LIMIT, DEFAULT_WORKERS,
};
