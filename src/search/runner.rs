//! One seeded run: engine, direction-reversal restarts, and the report.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::models::{season_fixtures, Completion, Direction, MatchGrid, Pairing, ScheduledFixture};

use super::{SearchEngine, SearchOutcome, SearchProblem, SearchStatus};

/// Counters describing how a run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Seed that reproduces the run.
    pub seed: u64,
    pub status: SearchStatus,
    /// Successful placements across all restarts.
    pub iterations: u64,
    /// Completion of the reported grid.
    pub completion: Completion,
    /// Direction reversals performed.
    pub restarts: u32,
    /// Scan direction when the run ended.
    pub direction: Direction,
}

/// Final grid of a run, or the best partial grid, with what is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub grid: MatchGrid,
    /// Pairings not placed, per division. Empty lists when complete.
    pub unscheduled: Vec<Vec<Pairing>>,
    pub summary: SearchSummary,
}

impl SearchReport {
    #[inline]
    pub fn status(&self) -> SearchStatus {
        self.summary.status
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.summary.status == SearchStatus::Complete
    }

    #[inline]
    pub fn completion(&self) -> Completion {
        self.summary.completion
    }

    /// Number of pairings left unplaced.
    pub fn unscheduled_count(&self) -> usize {
        self.unscheduled.iter().map(Vec::len).sum()
    }

    /// The whole season, including the mirrored half when enabled.
    pub fn fixtures(&self, reverse_fixtures: bool) -> Vec<ScheduledFixture> {
        season_fixtures(&self.grid, reverse_fixtures)
    }
}

impl SearchProblem {
    /// Runs one seeded search.
    ///
    /// Stagnation and exhaustion trigger up to `max_restarts` restarts from
    /// the best state with the scan direction reversed. A low start ends the
    /// run immediately.
    pub fn run(&self, seed: u64) -> SearchReport {
        let mut engine = SearchEngine::new(self, SmallRng::seed_from_u64(seed));
        log::info!("run started with seed {seed}");

        loop {
            let outcome = engine.run();
            let status = outcome.status();
            match outcome {
                SearchOutcome::Complete(grid) => {
                    let unscheduled = engine.pool().unscheduled();
                    return self.report(seed, status, grid, unscheduled, &engine);
                }
                SearchOutcome::Stagnant | SearchOutcome::Exhausted
                    if engine.state().restarts < self.config().max_restarts =>
                {
                    let direction = engine.direction().flip();
                    log::debug!(
                        "{status:?} after {} placements, restarting from best {} scanning {direction:?}",
                        engine.state().iterations,
                        engine.best().completion()
                    );
                    engine.restart(direction);
                }
                _ => {
                    let best = engine.best();
                    let grid = best.grid.clone();
                    let unscheduled = best.pool.unscheduled();
                    return self.report(seed, status, grid, unscheduled, &engine);
                }
            }
        }
    }

    fn report<R: rand::Rng>(
        &self,
        seed: u64,
        status: SearchStatus,
        grid: MatchGrid,
        unscheduled: Vec<Vec<Pairing>>,
        engine: &SearchEngine<'_, R>,
    ) -> SearchReport {
        let state = engine.state();
        SearchReport {
            summary: SearchSummary {
                seed,
                status,
                iterations: state.iterations,
                completion: grid.completion(),
                restarts: state.restarts,
                direction: engine.direction(),
            },
            grid,
            unscheduled,
        }
    }
}
