//! League scheduling domain models.
//!
//! Provides the data types describing a season: who plays (clubs and their
//! venues), what is played (competitions and generated matches), which
//! relationships constrain home/away decisions (affiliation rules and
//! security groups), and the resolved outcome (schedule).
//!
//! # Domain Mappings
//!
//! | Type | Meaning |
//! |------|---------|
//! | Club | One schedulable entity (senior, youth, or women's side) |
//! | Competition | One double round-robin among a fixed roster |
//! | Match | A pairing on a fixed date, home side undecided |
//! | AffiliationRule | Per-date coupling between two clubs |
//! | Schedule | Resolved matches with home, away, and venue |

mod club;
mod competition;
mod fixture;
mod league;
mod rule;
mod schedule;

pub use club::{Club, StadiumGroup, UNCONFIRMED_VENUE};
pub use competition::{Competition, CompetitionDef, DEFAULT_DAY_BLOCK};
pub use fixture::{Leg, Match};
pub use league::League;
pub use rule::{AffiliationRule, CoLocalGroups, Scope, SecurityGroup, DEFAULT_SECURITY_CAP};
pub use schedule::{ResolvedMatch, Schedule, Violation, ViolationType};
