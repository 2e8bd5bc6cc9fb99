//! League configuration and solve settings.
//!
//! A season is described by one JSON document:
//!
//! ```json
//! {
//!   "clubs": [{"name": "Reds", "stadium": "Park", "categories": {"senior": true}}],
//!   "competitions": [{"id": "SENIOR", "categories": ["senior"], "day_block": "sunday"}],
//!   "rules": [{"kind": "co_local", "competition": "SENIOR", "club": "Reds", "other": "Reds Youth"}],
//!   "security_groups": [{"name": "Town", "clubs": ["Reds", "Blues"], "max_home": 2}]
//! }
//! ```
//!
//! Rules are applied in declaration order. Everything is validated before
//! a [`League`] is built.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cp::{SolverConfig, DEFAULT_TIME_LIMIT, DEFAULT_WORKERS};
use crate::error::{FixtureError, Result};
use crate::models::{AffiliationRule, Club, CompetitionDef, League, SecurityGroup};
use crate::validation::validate_config;

/// Longest allowed home or away run by default.
pub const DEFAULT_MAX_RUN: usize = 3;

/// Season configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Club table.
    pub clubs: Vec<Club>,
    /// Competition definitions, in output order.
    pub competitions: Vec<CompetitionDef>,
    /// Affiliation rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<AffiliationRule>,
    /// Simultaneous-home caps.
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
}

impl LeagueConfig {
    /// Reads a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            FixtureError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a configuration document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| FixtureError::Config(format!("malformed configuration: {e}")))
    }

    /// Validates the document and resolves it into a [`League`].
    pub fn build_league(&self) -> Result<League> {
        validate_config(self).map_err(FixtureError::Validation)?;

        let league = League::from_definitions(self.clubs.clone(), &self.competitions)
            .with_rules(self.rules.iter().cloned());
        Ok(self
            .security_groups
            .iter()
            .cloned()
            .fold(league, League::with_security_group))
    }
}

/// Knobs for model construction and the solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveSettings {
    /// Wall-clock budget for the solver.
    pub time_limit: Duration,
    /// Parallelism hint.
    pub workers: usize,
    /// Seed for the solver's variable order.
    pub seed: u64,
    /// Longest allowed home or away run.
    pub max_run: usize,
    /// Emit the streak block (hard windows and penalties).
    pub enforce_streaks: bool,
    /// Penalize runs of exactly `max_run`.
    pub minimize_streaks: bool,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            workers: DEFAULT_WORKERS,
            seed: 0,
            max_run: DEFAULT_MAX_RUN,
            enforce_streaks: true,
            minimize_streaks: true,
        }
    }
}

impl SolveSettings {
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

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the longest allowed run (at least 1).
    pub fn with_max_run(mut self, max_run: usize) -> Self {
        self.max_run = max_run.max(1);
        self
    }

    /// Longest allowed run as enforced: `max_run`, never below 1.
    ///
    /// The field is public, so a literal can hold 0; the builder, the audit,
    /// and the KPI all read the limit through here.
    pub fn effective_max_run(&self) -> usize {
        self.max_run.max(1)
    }

    /// Enables or disables the streak block.
    pub fn with_streaks(mut self, enforce: bool) -> Self {
        self.enforce_streaks = enforce;
        self
    }

    /// Enables or disables streak penalties.
    pub fn with_streak_penalties(mut self, minimize: bool) -> Self {
        self.minimize_streaks = minimize;
        self
    }

    /// Solver parameters derived from these settings.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
            .with_time_limit(self.time_limit)
            .with_workers(self.workers)
            .with_seed(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "clubs": [
            {"name": "Reds", "stadium": "Park", "categories": {"senior": true, "u17": true}},
            {"name": "Reds Youth", "stadium": "Park", "categories": {"u17": true}},
            {"name": "Blues", "stadium": "Field", "categories": {"senior": true}},
            {"name": "Greens", "categories": {"senior": true, "u17": false}}
        ],
        "competitions": [
            {"id": "SENIOR", "categories": ["senior"]},
            {"id": "U17", "categories": ["u17"], "day_block": "saturday"}
        ],
        "rules": [
            {"kind": "co_local", "competition": "SENIOR", "club": "Reds", "other": "Reds Youth"}
        ],
        "security_groups": [{"name": "Town", "clubs": ["Reds", "Blues"]}]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let config = LeagueConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.clubs.len(), 4);
        assert_eq!(config.rules.len(), 1);

        let league = config.build_league().unwrap();
        assert_eq!(league.competitions().len(), 2);
        assert_eq!(
            league.competition("SENIOR").unwrap().clubs,
            vec!["Blues", "Greens", "Reds"]
        );
        assert_eq!(league.competition("U17").unwrap().block(), "saturday");
        assert_eq!(league.security_groups()[0].max_home, 2);
        assert_eq!(league.rules().len(), 1);
    }

    #[test]
    fn test_optional_tables_default_to_empty() {
        let config = LeagueConfig::from_json_str(
            r#"{"clubs": [{"name": "A", "categories": {"x": true}}], "competitions": []}"#,
        )
        .unwrap();
        assert!(config.rules.is_empty());
        assert!(config.security_groups.is_empty());
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        let err = LeagueConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, FixtureError::Config(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LeagueConfig::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Config(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = LeagueConfig::from_path(file.path()).unwrap();
        assert_eq!(config.competitions.len(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = LeagueConfig::from_json_str(SAMPLE).unwrap();
        config.clubs.push(Club::new("Reds"));
        let err = config.build_league().unwrap_err();
        assert!(matches!(err, FixtureError::Validation(_)));
    }

    #[test]
    fn test_settings_defaults_and_builders() {
        let settings = SolveSettings::default();
        assert_eq!(settings.time_limit, Duration::from_secs(300));
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.max_run, 3);
        assert!(settings.enforce_streaks);
        assert!(settings.minimize_streaks);

        let custom = settings
            .with_time_limit(Duration::from_secs(5))
            .with_seed(7)
            .with_max_run(0)
            .with_streaks(false);
        assert_eq!(custom.max_run, 1);
        assert!(!custom.enforce_streaks);
        let solver = custom.solver_config();
        assert_eq!(solver.time_limit, Duration::from_secs(5));
        assert_eq!(solver.seed, 7);
    }

    #[test]
    fn test_effective_max_run_clamps_literal_settings() {
        let raw = SolveSettings {
            max_run: 0,
            ..SolveSettings::default()
        };
        assert_eq!(raw.effective_max_run(), 1);
        assert_eq!(SolveSettings::default().effective_max_run(), DEFAULT_MAX_RUN);
    }
}
