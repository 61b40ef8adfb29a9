//! Progress monitoring: iteration counting, best-state snapshots, and the
//! low-start and stagnation checks.
//!
//! | Check | When | Fires if |
//! |-------|------|----------|
//! | Low start | every `check_interval` placements | best completion < `low_start_floor` |
//! | Stagnation | `stagnation_window` placements after the previous check or restart | best completion did not rise over the window |

use crate::models::{CandidatePool, Completion, Direction, MatchGrid};

use super::SearchConfig;

/// Deep copy of the search state at its best completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: MatchGrid,
    pub pool: CandidatePool,
}

impl Snapshot {
    #[inline]
    pub fn completion(&self) -> Completion {
        self.grid.completion()
    }
}

/// Recoverable reasons to stop a run early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorSignal {
    /// Best completion still under the floor at a progress check.
    LowStart,
    /// No improvement over a whole stagnation window.
    Stagnant,
}

/// Counters of one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    /// Successful placements so far, across restarts.
    pub iterations: u64,
    /// Completion after the last placement.
    pub completion: Completion,
    /// Best completion seen.
    pub max_completion: Completion,
    /// Best completion at the last stagnation check.
    pub last_checked: Completion,
    /// Current scan direction.
    pub direction: Direction,
    /// Direction reversals performed.
    pub restarts: u32,
}

/// Watches placements and decides when a run should stop.
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    check_interval: u64,
    stagnation_window: u64,
    low_start_floor: f64,
    /// Iteration count at which the current stagnation window opened.
    window_start: u64,
    state: SearchState,
    best: Snapshot,
}

impl ProgressMonitor {
    /// Starts monitoring from the given state, which becomes the first best.
    pub fn new(
        config: &SearchConfig,
        grid: &MatchGrid,
        pool: &CandidatePool,
        direction: Direction,
    ) -> Self {
        let completion = grid.completion();
        Self {
            check_interval: config.check_interval.max(1),
            stagnation_window: config.stagnation_window.max(1),
            low_start_floor: config.low_start_floor,
            window_start: 0,
            state: SearchState {
                iterations: 0,
                completion,
                max_completion: completion,
                last_checked: completion,
                direction,
                restarts: 0,
            },
            best: Snapshot {
                grid: grid.clone(),
                pool: pool.clone(),
            },
        }
    }

    /// Records one successful placement.
    pub fn record(&mut self, grid: &MatchGrid, pool: &CandidatePool) -> Option<MonitorSignal> {
        let state = &mut self.state;
        state.iterations += 1;
        state.completion = grid.completion();
        if state.completion.exceeds(&state.max_completion) {
            state.max_completion = state.completion;
            self.best = Snapshot {
                grid: grid.clone(),
                pool: pool.clone(),
            };
        }

        if state.iterations % self.check_interval == 0 {
            log::info!(
                "{} placements, completion {}, best {}",
                state.iterations,
                state.completion,
                state.max_completion
            );
            if state.max_completion.below(self.low_start_floor) {
                return Some(MonitorSignal::LowStart);
            }
        }

        if state.iterations - self.window_start >= self.stagnation_window {
            self.window_start = state.iterations;
            let improved = state.max_completion.exceeds(&state.last_checked);
            state.last_checked = state.max_completion;
            if !improved {
                return Some(MonitorSignal::Stagnant);
            }
        }
        None
    }

    /// Resets the stagnation baseline for a restart in `direction`.
    pub fn restart(&mut self, direction: Direction) {
        self.state.direction = direction;
        self.state.restarts += 1;
        self.state.last_checked = self.state.max_completion;
        self.state.completion = self.best.completion();
        self.window_start = self.state.iterations;
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// State at the best completion so far.
    pub fn best(&self) -> &Snapshot {
        &self.best
    }
}
