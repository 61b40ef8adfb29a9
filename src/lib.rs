//! Round-robin fixture generation for multi-division leagues.
//!
//! Builds single round-robin fixture grids (optionally mirrored into a
//! home-and-away season) by backtracking constraint search, with
//! shared-venue conflicts between clubs' teams propagated across divisions.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Division`, `Fixture`, `MatchGrid`,
//!   `CandidatePool`, `ClubConflictTable`, venue and fixture requirements
//! - **`validation`**: Input integrity checks (duplicate teams, unknown
//!   teams, contradictory requirements)
//! - **`constraints`**: Placement rules, `RuleSet`, and the shared-venue
//!   `ConflictResolver`
//! - **`search`**: `SearchProblem`, the backtracking `SearchEngine`,
//!   progress monitoring, restarts and the `solve` retry driver
//! - **`audit`**: Post-hoc violation report for any grid
//! - **`error`**: `ConfigurationError`
//!
//! # Example
//!
//! ```
//! use u_fixture::models::{Division, League, VenueRequirement};
//! use u_fixture::search::{solve, SearchConfig};
//!
//! let league = League::new(vec![
//!     Division::from_codes("Premier", &["BRE1", "WAN1", "CHE1", "HAD1"]),
//!     Division::from_codes("Division 1", &["BRE2", "WAN2", "CHE2", "HAD2"]),
//! ])
//! .with_venue_requirement(VenueRequirement::away("CHE1", 2));
//!
//! let config = SearchConfig::default().with_seed(7).with_reverse_fixtures(true);
//! let report = solve(&league, &config).unwrap();
//! if report.is_complete() {
//!     assert_eq!(report.fixtures(true).len(), 24);
//! }
//! ```
//!
//! # Logging
//!
//! Progress is reported through the `log` facade; install any logger to
//! see it.
//!
//! # References
//!
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - de Werra (1981), "Scheduling in Sports"
//! - Rasmussen & Trick (2008), "Round robin scheduling: a survey"

pub mod audit;
pub mod constraints;
pub mod error;
pub mod models;
pub mod search;
pub mod validation;

pub use error::ConfigurationError;
