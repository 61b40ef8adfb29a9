//! Fixture search.
//!
//! # Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchConfig`] | tunable parameters |
//! | [`SearchProblem`] | validated inputs and the seeded starting state |
//! | [`SearchEngine`] | backtracking over slots for one random stream |
//! | [`ProgressMonitor`] | best snapshot, low-start and stagnation checks |
//! | [`SearchProblem::run`] | one seeded run with direction-reversal restarts |
//! | [`solve`] | retries seeded runs until one completes |
//!
//! # Example
//!
//! ```
//! use u_fixture::models::{Division, League};
//! use u_fixture::search::{SearchConfig, SearchProblem, SearchStatus};
//!
//! let league = League::new(vec![Division::from_codes("Prem", &["A1", "B1", "C1", "D1"])]);
//! let problem = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap();
//! let report = problem.run(7);
//! assert_eq!(report.status(), SearchStatus::Complete);
//! assert_eq!(report.fixtures(false).len(), 6);
//! ```

mod config;
mod engine;
mod monitor;
mod problem;
mod retry;
mod runner;

pub use config::SearchConfig;
pub use engine::{Commit, Placement, SearchEngine, SearchOutcome, SearchStatus};
pub use monitor::{MonitorSignal, ProgressMonitor, SearchState, Snapshot};
pub use problem::SearchProblem;
pub use retry::solve;
pub use runner::{SearchReport, SearchSummary};
