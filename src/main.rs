//! League fixture planner CLI.
//!
//! Loads a league description, plans every competition's double round-robin
//! with home/away decided by the constraint model, and writes the fixture.
//!
//! Exit status: 0 on success, 1 for configuration or export errors, 2 when
//! the model is infeasible, 3 when the time budget ran out. No output file is
//! written unless planning succeeds.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;

use league_fixture::config::{LeagueConfig, SolveSettings, DEFAULT_MAX_RUN};
use league_fixture::cp::{SatBoolSolver, DEFAULT_WORKERS};
use league_fixture::error::FixtureError;
use league_fixture::export::{write_fixture, ExportFormat};
use league_fixture::scheduler::FixturePlanner;

#[derive(Parser)]
#[command(name = "league-fixture")]
#[command(about = "Plans league fixtures: round-robin dates with home/away assignment")]
struct Cli {
    /// League configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Output file
    #[arg(long)]
    out: PathBuf,

    /// Output format (defaults to the output file's extension)
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Wall-clock budget for the solver, in seconds
    #[arg(long, default_value_t = 300)]
    time_limit: u64,

    /// Parallelism hint for the solver
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Random seed for tie-breaking
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Drop the streak block (hard limit and penalties)
    #[arg(long)]
    no_streaks: bool,

    /// Longest allowed home or away run
    #[arg(long, default_value_t = DEFAULT_MAX_RUN)]
    max_run: usize,
}

impl Cli {
    fn settings(&self) -> SolveSettings {
        SolveSettings::default()
            .with_time_limit(Duration::from_secs(self.time_limit))
            .with_workers(self.workers)
            .with_seed(self.seed)
            .with_max_run(self.max_run)
            .with_streaks(!self.no_streaks)
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = LeagueConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let league = config.build_league()?;

    let planner = FixturePlanner::new().with_settings(cli.settings());
    let outcome = planner.plan(&league, &SatBoolSolver::new())?;

    let format = cli
        .format
        .unwrap_or_else(|| ExportFormat::from_path(&cli.out));
    write_fixture(&cli.out, &outcome.schedule.matches, format)
        .with_context(|| format!("writing {}", cli.out.display()))?;

    log::info!(
        "{} ({} matches) -> {}",
        outcome.status.description(),
        outcome.schedule.match_count(),
        cli.out.display()
    );
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<FixtureError>() {
        Some(FixtureError::Infeasible) => 2,
        Some(FixtureError::Timeout { .. }) => 3,
        _ => 1,
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const TWO_CLUBS: &str = r#"{
        "clubs": [
            {"name": "Reds", "stadium": "Park", "categories": {"senior": true}},
            {"name": "Blues", "stadium": "Field", "categories": {"senior": true}}
        ],
        "competitions": [{"id": "SENIOR", "categories": ["senior"]}]
    }"#;

    const NO_HOSTS_ALLOWED: &str = r#"{
        "clubs": [
            {"name": "Reds", "stadium": "Park", "categories": {"senior": true}},
            {"name": "Blues", "stadium": "Field", "categories": {"senior": true}}
        ],
        "competitions": [{"id": "SENIOR", "categories": ["senior"]}],
        "security_groups": [{"name": "Town", "clubs": ["Reds", "Blues"], "max_home": 0}]
    }"#;

    fn cli_for(config: &Path, out: &Path) -> Cli {
        Cli::parse_from([
            "league-fixture",
            "--config",
            config.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--time-limit",
            "30",
        ])
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["league-fixture", "--config", "l.json", "--out", "f.json"]);
        let settings = cli.settings();
        assert_eq!(settings.time_limit, Duration::from_secs(300));
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.max_run, 3);
        assert!(settings.enforce_streaks);
        assert!(cli.format.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "league-fixture",
            "--config",
            "l.json",
            "--out",
            "f.txt",
            "--format",
            "csv",
            "--no-streaks",
            "--time-limit",
            "10",
        ]);
        assert_eq!(cli.format, Some(ExportFormat::Csv));
        assert!(!cli.settings().enforce_streaks);
        assert_eq!(cli.settings().time_limit, Duration::from_secs(10));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&FixtureError::Infeasible.into()), 2);
        assert_eq!(exit_code(&FixtureError::Timeout { seconds: 1 }.into()), 3);
        assert_eq!(exit_code(&FixtureError::Config("x".into()).into()), 1);
        let wrapped = anyhow::Error::from(FixtureError::Infeasible).context("planning");
        assert_eq!(exit_code(&wrapped), 2);
    }

    #[test]
    fn test_run_writes_fixture() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("league.json");
        let out = dir.path().join("fixture.csv");
        fs::write(&config, TWO_CLUBS).unwrap();

        run(&cli_for(&config, &out)).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("competition,date,home,away,venue"));
    }

    #[test]
    fn test_infeasible_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("league.json");
        let out = dir.path().join("fixture.json");
        fs::write(&config, NO_HOSTS_ALLOWED).unwrap();

        let err = run(&cli_for(&config, &out)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FixtureError>(),
            Some(FixtureError::Infeasible)
        ));
        assert_eq!(exit_code(&err), 2);
        assert!(!out.exists());
        // Only the configuration is left in the directory.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
