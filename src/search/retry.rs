//! Retry driver: seeded runs until one completes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigurationError;
use crate::models::League;

use super::{SearchConfig, SearchProblem, SearchReport, SearchStatus};

/// Generates fixtures for a league.
///
/// Prepares the problem once, then runs up to `config.max_attempts` seeded
/// searches. The first attempt uses the base seed (`config.seed`, or one
/// drawn from the OS); later seeds come from a generator seeded with it, so
/// the whole sequence is reproducible from the base seed.
///
/// # Returns
/// The first complete report, or the report with the highest completion.
///
/// # Errors
/// Any [`ConfigurationError`] from [`SearchProblem::prepare`]. Search
/// failures are never errors.
///
/// # Example
///
/// ```
/// use u_fixture::models::{Division, League};
/// use u_fixture::search::{solve, SearchConfig};
///
/// let league = League::new(vec![
///     Division::from_codes("Premier", &["BRE1", "WAN1", "CHE1", "HAD1"]),
///     Division::from_codes("Division 1", &["BRE2", "WAN2", "CHE2", "HAD2"]),
/// ]);
/// let report = solve(&league, &SearchConfig::default().with_seed(42)).unwrap();
/// assert!(report.is_complete());
/// assert_eq!(report.grid.filled_count(), 12);
/// ```
pub fn solve(league: &League, config: &SearchConfig) -> Result<SearchReport, ConfigurationError> {
    let problem = SearchProblem::prepare(league, config)?;
    Ok(problem.solve())
}

impl SearchProblem {
    /// Seeded runs until one completes or the attempt budget is spent.
    pub fn solve(&self) -> SearchReport {
        let base_seed = self.config().seed.unwrap_or_else(|| rand::rng().random());
        let max_attempts = self.config().max_attempts.max(1);
        let mut seeds = SmallRng::seed_from_u64(base_seed);

        let mut best = self.attempt(1, max_attempts, base_seed);
        let mut attempts = 1;
        while !best.is_complete() && attempts < max_attempts {
            attempts += 1;
            let report = self.attempt(attempts, max_attempts, seeds.random());
            if report.is_complete() || report.completion().exceeds(&best.completion()) {
                best = report;
            }
        }

        if best.is_complete() {
            log::info!(
                "fixtures complete after {attempts} attempt(s), seed {}",
                best.summary.seed
            );
        } else {
            log::warn!(
                "no complete fixture set after {attempts} attempts; best {} with {} pairings unscheduled",
                best.completion(),
                best.unscheduled_count()
            );
        }
        best
    }

    fn attempt(&self, attempt: u32, max_attempts: u32, seed: u64) -> SearchReport {
        let report = self.run(seed);
        let reason = match report.status() {
            SearchStatus::LowStart => "low start point",
            SearchStatus::Stagnant => "no progress",
            SearchStatus::Exhausted => "search space exhausted",
            SearchStatus::Complete | SearchStatus::InProgress => return report,
        };
        log::warn!(
            "attempt {attempt}/{max_attempts} (seed {seed}): {reason} at {}",
            report.completion()
        );
        report
    }
}
