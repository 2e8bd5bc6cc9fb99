//! Solution decoding.
//!
//! Turns solver values back into resolved matches: the first-listed club
//! hosts when its match variable is true, and the venue is the host's
//! stadium.

use crate::cp::{BoolVar, Solution};
use crate::models::{League, Match, ResolvedMatch, Schedule};

/// Builds the sorted schedule for a solved model.
///
/// `match_vars[i]` must be the decision variable of `matches[i]`. Returns an
/// empty schedule when the solution carries no values.
pub fn assemble(
    league: &League,
    matches: &[Match],
    match_vars: &[BoolVar],
    solution: &Solution,
) -> Schedule {
    let mut schedule = Schedule::new();
    if !solution.is_solution_found() {
        return schedule;
    }

    for (m, &var) in matches.iter().zip(match_vars) {
        let Some(first_is_home) = solution.value(var) else {
            continue;
        };
        let (home, away) = m.resolve(first_is_home);
        schedule.add_match(ResolvedMatch::new(
            &m.competition,
            m.round,
            home,
            away,
            league.venue_of(home),
        ));
    }

    schedule.sort();
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BoolModel, SolveStats, SolveStatus};
    use crate::models::{Club, Competition, Leg};

    fn solution(status: SolveStatus, values: Vec<bool>) -> Solution {
        Solution {
            status,
            values,
            objective: Some(0),
            stats: SolveStats::default(),
        }
    }

    #[test]
    fn test_assemble_sorted_with_venues() {
        let league = League::new(vec![Club::new("A").with_stadium("Park"), Club::new("B")])
            .with_competition(Competition::new("X", vec!["A".into(), "B".into()]));
        let matches = vec![
            Match::new("X", 2, "B", "A", Leg::Second),
            Match::new("X", 1, "A", "B", Leg::First),
        ];
        let mut model = BoolModel::new("t");
        let vars: Vec<BoolVar> = (0..2).map(|i| model.new_bool_var(format!("m{i}"))).collect();

        let schedule = assemble(
            &league,
            &matches,
            &vars,
            &solution(SolveStatus::Optimal, vec![false, true]),
        );
        assert_eq!(
            schedule.matches,
            vec![
                ResolvedMatch::new("X", 1, "A", "B", "Park"),
                ResolvedMatch::new("X", 2, "A", "B", "Park"),
            ]
        );

        let flipped = assemble(
            &league,
            &matches,
            &vars,
            &solution(SolveStatus::Feasible, vec![true, false]),
        );
        assert_eq!(flipped.matches[0].home, "B");
        assert_eq!(flipped.matches[0].venue, "To be confirmed");
    }

    #[test]
    fn test_no_solution_gives_empty_schedule() {
        let league = League::default();
        let sol = solution(SolveStatus::Infeasible, vec![]);
        assert_eq!(assemble(&league, &[], &[], &sol).match_count(), 0);
    }
}
