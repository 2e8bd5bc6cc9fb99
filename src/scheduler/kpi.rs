//! Fixture quality metrics (KPIs).
//!
//! Computes season-level indicators from a resolved schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Matches per competition | Found vs. expected N×(N−1) |
//! | Runs at limit | Windows of `max_run` consecutive home (or away) dates |
//! | Longest home run | Most consecutive dates at home, per club |
//! | Longest away run | Most consecutive dates away, per club |
//! | Home count | Home matches per club, all competitions |
//!
//! # Reference
//! Miyashiro, Matsui (2005), "A polynomial-time algorithm to find an
//! equitable home–away assignment"

use std::collections::BTreeMap;

use crate::models::{League, Schedule};

/// Match count of one competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompetitionCount {
    /// Matches in the schedule.
    pub found: usize,
    /// N×(N−1).
    pub expected: usize,
}

/// Fixture performance indicators.
#[derive(Debug, Clone)]
pub struct FixtureKpi {
    /// Total matches.
    pub total_matches: usize,
    /// Found vs. expected matches, per competition.
    pub matches_by_competition: BTreeMap<String, CompetitionCount>,
    /// Windows of `max_run` dates spent entirely home or entirely away.
    pub runs_at_limit: usize,
    /// Longest home run per club.
    pub longest_home_run: BTreeMap<String, usize>,
    /// Longest away run per club.
    pub longest_away_run: BTreeMap<String, usize>,
    /// Home matches per club.
    pub home_count: BTreeMap<String, usize>,
}

impl FixtureKpi {
    /// Computes KPIs for a schedule of `league`.
    ///
    /// # Arguments
    /// * `schedule` - The resolved fixture.
    /// * `league` - The league it was planned for.
    /// * `max_run` - Window length counted by `runs_at_limit`.
    pub fn calculate(schedule: &Schedule, league: &League, max_run: usize) -> Self {
        let counts = schedule.count_by_competition();
        let matches_by_competition = league
            .competitions()
            .iter()
            .map(|c| {
                let count = CompetitionCount {
                    found: counts.get(&c.id).copied().unwrap_or(0),
                    expected: c.expected_matches(),
                };
                (c.id.clone(), count)
            })
            .collect();

        let last = schedule.last_date();
        let mut runs_at_limit = 0;
        let mut longest_home_run = BTreeMap::new();
        let mut longest_away_run = BTreeMap::new();
        let mut home_count = BTreeMap::new();

        for club in league.entities() {
            let home = presence(&schedule.home_dates(club, None), last);
            let away = presence(&schedule.away_dates(club, None), last);

            runs_at_limit += full_windows(&home, max_run) + full_windows(&away, max_run);
            longest_home_run.insert(club.to_string(), longest_run(&home));
            longest_away_run.insert(club.to_string(), longest_run(&away));
            home_count.insert(
                club.to_string(),
                schedule.matches.iter().filter(|m| m.home == club).count(),
            );
        }

        Self {
            total_matches: schedule.match_count(),
            matches_by_competition,
            runs_at_limit,
            longest_home_run,
            longest_away_run,
            home_count,
        }
    }

    /// Whether every competition has all its matches.
    pub fn is_complete(&self) -> bool {
        self.matches_by_competition
            .values()
            .all(|c| c.found == c.expected)
    }

    /// Longest run of either kind, over all clubs.
    pub fn longest_run(&self) -> usize {
        self.longest_home_run
            .values()
            .chain(self.longest_away_run.values())
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Logs the per-competition summary.
    pub fn log_summary(&self) {
        for (id, count) in &self.matches_by_competition {
            let mark = if count.found == count.expected { "ok" } else { "MISMATCH" };
            log::info!(
                "  {mark:8} {id:12}: {:4} matches (expected {:4})",
                count.found,
                count.expected
            );
        }
        log::info!(
            "{} matches, {} run(s) at the limit, longest run {}",
            self.total_matches,
            self.runs_at_limit,
            self.longest_run()
        );
    }
}

/// `flags[d - 1]` is true when `d` is in `dates`.
fn presence(dates: &[u32], last: u32) -> Vec<bool> {
    let mut flags = vec![false; last as usize];
    for &d in dates {
        if let Some(slot) = flags.get_mut((d as usize).wrapping_sub(1)) {
            *slot = true;
        }
    }
    flags
}

fn full_windows(flags: &[bool], len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    flags
        .windows(len)
        .filter(|w| w.iter().all(|&f| f))
        .count()
}

fn longest_run(flags: &[bool]) -> usize {
    let mut best = 0;
    let mut current = 0;
    for &f in flags {
        current = if f { current + 1 } else { 0 };
        best = best.max(current);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Club, Competition, ResolvedMatch};

    fn league() -> League {
        League::new(vec![Club::new("A"), Club::new("B"), Club::new("C")])
            .with_competition(Competition::new("X", vec!["A".into(), "B".into()]))
            .with_competition(Competition::new("Y", vec!["A".into(), "B".into(), "C".into()]))
    }

    #[test]
    fn test_kpi_counts_and_runs() {
        let mut schedule = Schedule::new();
        schedule.add_match(ResolvedMatch::new("X", 1, "A", "B", "A"));
        schedule.add_match(ResolvedMatch::new("X", 2, "A", "B", "A"));
        schedule.add_match(ResolvedMatch::new("Y", 3, "A", "C", "A"));

        let kpi = FixtureKpi::calculate(&schedule, &league(), 3);
        assert_eq!(kpi.total_matches, 3);
        assert_eq!(
            kpi.matches_by_competition["X"],
            CompetitionCount { found: 2, expected: 2 }
        );
        assert_eq!(kpi.matches_by_competition["Y"].expected, 6);
        assert!(!kpi.is_complete());

        // A at home on dates 1, 2, 3.
        assert_eq!(kpi.longest_home_run["A"], 3);
        assert_eq!(kpi.longest_away_run["B"], 2);
        assert_eq!(kpi.runs_at_limit, 1);
        assert_eq!(kpi.home_count["A"], 3);
        assert_eq!(kpi.home_count["C"], 0);
        assert_eq!(kpi.longest_run(), 3);
    }

    #[test]
    fn test_kpi_empty_schedule() {
        let kpi = FixtureKpi::calculate(&Schedule::new(), &league(), 3);
        assert_eq!(kpi.total_matches, 0);
        assert_eq!(kpi.runs_at_limit, 0);
        assert_eq!(kpi.longest_run(), 0);
    }

    #[test]
    fn test_run_helpers() {
        let flags = presence(&[1, 2, 4, 5, 6], 6);
        assert_eq!(flags, vec![true, true, false, true, true, true]);
        assert_eq!(longest_run(&flags), 3);
        assert_eq!(full_windows(&flags, 2), 3);
        assert_eq!(full_windows(&flags, 0), 0);
    }
}
