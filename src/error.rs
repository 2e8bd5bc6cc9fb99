//! Error taxonomy for fixture planning.
//!
//! Configuration problems abort before any model is built. Solver outcomes
//! without a usable assignment (`Infeasible`, `Timeout`) are reported
//! distinctly so callers can react differently. Rule reference problems are
//! not errors: see [`crate::cp::RuleWarning`].

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors produced while loading, planning, or exporting a fixture.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(
        "model is infeasible: no home/away assignment satisfies every hard constraint. \
         Retry with streak constraints disabled (--no-streaks) to isolate the streak block, \
         then bisect the rule table"
    )]
    Infeasible,

    #[error(
        "no solution found within {seconds}s. The model was not proven infeasible; \
         increase the time budget (--time-limit)"
    )]
    Timeout { seconds: u64 },

    #[error("solution failed audit with {} violation(s): {}", .0.len(), .0.join("; "))]
    Audit(Vec<String>),
}

impl FixtureError {
    /// Whether the error was raised before a model was built.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FixtureError::Config(_) | FixtureError::Validation(_) | FixtureError::Json(_)
        )
    }

    /// Whether the error comes from the solve outcome.
    pub fn is_solve_failure(&self) -> bool {
        matches!(self, FixtureError::Infeasible | FixtureError::Timeout { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, FixtureError>;
