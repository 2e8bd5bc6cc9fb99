//! League fixture planning.
//!
//! Plans a season of double round-robin competitions: match dates come from
//! the circle method, and the home side of every match is decided by a
//! boolean constraint model that enforces affiliation rules between clubs,
//! stadium sharing, security caps, and home/away streak limits.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Club`, `Competition`, `Match`,
//!   `AffiliationRule`, `SecurityGroup`, `League`, `Schedule`
//! - **`round_robin`**: Circle-method pairing generator
//! - **`cp`**: Boolean model, scoped indicators, model builder, solver
//! - **`scheduler`**: End-to-end planner, solution decoding, KPIs
//! - **`validation`**: Configuration checks and post-solve audit
//! - **`config`**: JSON league configuration and solve settings
//! - **`export`**: JSON and CSV fixture writers
//!
//! # References
//!
//! - de Werra (1981), "Scheduling in sports"
//! - Rasmussen, Trick (2008), "Round robin scheduling – a survey"

pub mod config;
pub mod cp;
pub mod error;
pub mod export;
pub mod models;
pub mod round_robin;
pub mod scheduler;
pub mod validation;

pub use error::{FixtureError, Result};
