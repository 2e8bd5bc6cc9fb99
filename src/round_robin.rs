//! Round-robin date generation (circle method).
//!
//! Dates are fixed before any home/away decision is made: the calendar is a
//! pure function of the roster, and the constraint model only chooses which
//! listed club hosts each match.
//!
//! # Algorithm
//!
//! 1. Keep position 0 fixed; pad odd rosters with a bye placeholder.
//! 2. In each round, pair position `i` with position `size − 1 − i`.
//! 3. Rotate every position except the fixed one by one step.
//! 4. Drop pairs containing the bye.
//! 5. Repeat the first leg with listing order swapped, offset by the
//!    number of first-leg rounds.
//!
//! Every club plays at most once per round, every pair meets exactly once
//! per leg, and a roster of N clubs yields N×(N−1) matches.
//!
//! # Reference
//! Kirkman (1847); de Werra (1981), "Scheduling in sports"

use crate::models::{Competition, Leg, Match};

/// First-leg pairings as roster indices, one vector per round.
///
/// Returns no rounds for rosters smaller than two.
pub fn first_leg_pairings(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }

    let size = if n % 2 == 0 { n } else { n + 1 };
    let mut ring: Vec<Option<usize>> = (0..n).map(Some).collect();
    if size > n {
        ring.push(None); // bye
    }

    let mut rounds = Vec::with_capacity(size - 1);
    for _ in 0..size - 1 {
        let mut pairs = Vec::with_capacity(size / 2);
        for i in 0..size / 2 {
            if let (Some(a), Some(b)) = (ring[i], ring[size - 1 - i]) {
                pairs.push((a, b));
            }
        }
        rounds.push(pairs);
        ring[1..].rotate_right(1);
    }

    rounds
}

/// Generates both legs for one competition.
///
/// Rounds are numbered from 1. Second-leg rounds follow the first leg.
pub fn generate(competition: &Competition) -> Vec<Match> {
    let rounds = first_leg_pairings(competition.size());
    let offset = rounds.len() as u32;
    let clubs = &competition.clubs;

    let mut matches = Vec::with_capacity(competition.expected_matches());
    for (r, pairs) in rounds.iter().enumerate() {
        let round = r as u32 + 1;
        for &(a, b) in pairs {
            matches.push(Match::new(
                &competition.id,
                round,
                &clubs[a],
                &clubs[b],
                Leg::First,
            ));
        }
    }
    for (r, pairs) in rounds.iter().enumerate() {
        let round = offset + r as u32 + 1;
        for &(a, b) in pairs {
            matches.push(Match::new(
                &competition.id,
                round,
                &clubs[b],
                &clubs[a],
                Leg::Second,
            ));
        }
    }

    matches
}

/// Generates matches for every playable competition, in competition order.
pub fn generate_all(competitions: &[Competition]) -> Vec<Match> {
    competitions
        .iter()
        .filter(|c| c.is_playable())
        .flat_map(generate)
        .collect()
}
