//! Backtracking search over grid slots.
//!
//! # Algorithm
//!
//! 1. Take the next slot that is not fully filled, in scan order.
//! 2. List the division's unused pairings in random order, each in a random
//!    orientation followed by the other one. A half-reserved slot only
//!    lists pairings of its reserved team.
//! 3. Try candidates in order: the rule set must accept, then the conflict
//!    resolver may require dependent placements for venue partners. Each of
//!    its alternatives is tried in turn; the primary and its dependents are
//!    committed together, or not at all.
//! 4. When a slot runs out of candidates, undo the previous slot's commit
//!    and resume its candidate list.
//!
//! The stack is explicit, so depth is bounded by the slot count rather
//! than the call stack, and a run can be paused with a placement budget.
//!
//! # Reference
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3: Backtracking Search for CSPs

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constraints::{Alternative, ConflictResolver, DependentPlacement, Resolution};
use crate::models::{CandidatePool, Direction, Fixture, MatchGrid, SlotRef};

use super::monitor::{MonitorSignal, ProgressMonitor, SearchState, Snapshot};
use super::SearchProblem;

/// Result of driving the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every slot filled.
    Complete(MatchGrid),
    /// Best completion below the floor at a progress check.
    LowStart,
    /// No improvement over a stagnation window.
    Stagnant,
    /// Every candidate of the first open slot was tried.
    Exhausted,
    /// The placement budget ran out; call `resume` again to continue.
    InProgress,
}

impl SearchOutcome {
    pub fn status(&self) -> SearchStatus {
        match self {
            SearchOutcome::Complete(_) => SearchStatus::Complete,
            SearchOutcome::LowStart => SearchStatus::LowStart,
            SearchOutcome::Stagnant => SearchStatus::Stagnant,
            SearchOutcome::Exhausted => SearchStatus::Exhausted,
            SearchOutcome::InProgress => SearchStatus::InProgress,
        }
    }
}

impl From<MonitorSignal> for SearchOutcome {
    fn from(signal: MonitorSignal) -> Self {
        match signal {
            MonitorSignal::LowStart => SearchOutcome::LowStart,
            MonitorSignal::Stagnant => SearchOutcome::Stagnant,
        }
    }
}

/// [`SearchOutcome`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Complete,
    LowStart,
    Stagnant,
    Exhausted,
    InProgress,
}

/// One reversible write to the grid and pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub at: SlotRef,
    /// Slot content before the write.
    pub previous: Fixture,
    /// Pairing marked used by the write.
    pub pairing: Option<usize>,
}

impl Placement {
    /// Writes `fixture` at `at` and marks `pairing` used.
    pub fn apply(
        grid: &mut MatchGrid,
        pool: &mut CandidatePool,
        at: SlotRef,
        fixture: Fixture,
        pairing: Option<usize>,
    ) -> Self {
        let previous = grid.place(at, fixture);
        if let Some(index) = pairing {
            pool.mark_used(at.division, index);
        }
        Self {
            at,
            previous,
            pairing,
        }
    }

    /// Restores the slot and the pairing flag.
    pub fn revert(self, grid: &mut MatchGrid, pool: &mut CandidatePool) {
        grid.place(self.at, self.previous);
        if let Some(index) = self.pairing {
            pool.unmark(self.at.division, index);
        }
    }
}

/// A primary placement and the placements it forced, undone as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub primary: Placement,
    pub dependents: Vec<Placement>,
}

impl Commit {
    /// Undoes the dependent placements in reverse order, then the primary.
    pub fn revert(self, grid: &mut MatchGrid, pool: &mut CandidatePool) {
        for dependent in self.dependents.into_iter().rev() {
            dependent.revert(grid, pool);
        }
        self.primary.revert(grid, pool);
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    pairing: usize,
    flipped: bool,
}

/// A candidate that passed the rules and needs dependent placements.
#[derive(Debug)]
struct Pending {
    fixture: Fixture,
    pairing: usize,
    alternatives: Vec<Alternative>,
    next: usize,
}

#[derive(Debug)]
struct Frame {
    at: SlotRef,
    candidates: Vec<Candidate>,
    next: usize,
    pending: Option<Pending>,
    commit: Option<Commit>,
}

/// Backtracking engine for one seeded run.
pub struct SearchEngine<'p, R: Rng> {
    problem: &'p SearchProblem,
    grid: MatchGrid,
    pool: CandidatePool,
    rng: R,
    direction: Direction,
    stack: Vec<Frame>,
    monitor: ProgressMonitor,
    started: bool,
}

impl<'p, R: Rng> SearchEngine<'p, R> {
    /// Engine over the problem's starting state, scanning forward.
    pub fn new(problem: &'p SearchProblem, rng: R) -> Self {
        let grid = problem.initial_grid().clone();
        let pool = problem.initial_pool().clone();
        let direction = Direction::Forward;
        let monitor = ProgressMonitor::new(problem.config(), &grid, &pool, direction);
        Self {
            problem,
            grid,
            pool,
            rng,
            direction,
            stack: Vec::new(),
            monitor,
            started: false,
        }
    }

    /// Runs until complete, exhausted, or stopped by the monitor.
    pub fn run(&mut self) -> SearchOutcome {
        self.resume(None)
    }

    /// Runs for at most `budget` placements.
    ///
    /// Calling again after `Complete` undoes the last placement and looks
    /// for another completion.
    pub fn resume(&mut self, budget: Option<u64>) -> SearchOutcome {
        if !self.started {
            self.started = true;
            log::info!(
                "search started: {} of {} slots filled, scanning {:?}",
                self.grid.filled_count(),
                self.grid.total_slots(),
                self.direction
            );
            match self.grid.next_open_slot(self.direction) {
                None => return SearchOutcome::Complete(self.grid.clone()),
                Some(at) => {
                    let frame = self.open_frame(at);
                    self.stack.push(frame);
                }
            }
        }

        let mut placements = 0u64;
        while let Some(mut frame) = self.stack.pop() {
            if let Some(commit) = frame.commit.take() {
                commit.revert(&mut self.grid, &mut self.pool);
            }
            let Some(commit) = self.advance(&mut frame) else {
                continue;
            };
            frame.commit = Some(commit);
            self.stack.push(frame);
            placements += 1;

            let signal = self.monitor.record(&self.grid, &self.pool);
            match self.grid.next_open_slot(self.direction) {
                None => {
                    log::info!(
                        "search complete after {} placements",
                        self.monitor.state().iterations
                    );
                    return SearchOutcome::Complete(self.grid.clone());
                }
                Some(at) => {
                    let next = self.open_frame(at);
                    self.stack.push(next);
                }
            }

            if let Some(signal) = signal {
                return signal.into();
            }
            if budget.is_some_and(|b| placements >= b) {
                return SearchOutcome::InProgress;
            }
        }

        log::info!(
            "search exhausted after {} placements, best {}",
            self.monitor.state().iterations,
            self.monitor.state().max_completion
        );
        SearchOutcome::Exhausted
    }

    /// Continues from the best snapshot, scanning in `direction`.
    ///
    /// Placements in the snapshot become fixed for the rest of the run.
    pub fn restart(&mut self, direction: Direction) {
        let Snapshot { grid, pool } = self.monitor.best().clone();
        self.grid = grid;
        self.pool = pool;
        self.direction = direction;
        self.stack.clear();
        self.started = false;
        self.monitor.restart(direction);
    }

    /// Candidate list for a slot.
    fn open_frame(&mut self, at: SlotRef) -> Frame {
        let reserved = self.grid.fixture(at).teams().next().map(str::to_owned);
        let mut pairings: Vec<usize> = self
            .pool
            .unused_indices(at.division)
            .into_iter()
            .filter(|&i| {
                reserved
                    .as_deref()
                    .map_or(true, |team| self.pool.pairing(at.division, i).involves(team))
            })
            .collect();
        pairings.shuffle(&mut self.rng);

        let mut candidates = Vec::with_capacity(pairings.len() * 2);
        for pairing in pairings {
            let flipped = self.rng.random_bool(0.5);
            candidates.push(Candidate { pairing, flipped });
            candidates.push(Candidate {
                pairing,
                flipped: !flipped,
            });
        }

        Frame {
            at,
            candidates,
            next: 0,
            pending: None,
            commit: None,
        }
    }

    /// Tries the frame's remaining alternatives and candidates until one
    /// commits.
    fn advance(&mut self, frame: &mut Frame) -> Option<Commit> {
        let problem = self.problem;
        let rules = problem.rules();
        let at = frame.at;

        loop {
            if let Some(pending) = frame.pending.as_mut() {
                while let Some(alternative) = pending.alternatives.get(pending.next) {
                    pending.next += 1;
                    let commit =
                        self.commit_alternative(at, &pending.fixture, pending.pairing, alternative);
                    if commit.is_some() {
                        return commit;
                    }
                }
                frame.pending = None;
            }

            let &candidate = frame.candidates.get(frame.next)?;
            frame.next += 1;
            if self.pool.is_used(at.division, candidate.pairing) {
                continue;
            }

            let fixture = self.fixture_for(at.division, candidate);
            if !rules.check(&problem.context(&self.grid), at, &fixture) {
                continue;
            }

            let primary = Placement::apply(
                &mut self.grid,
                &mut self.pool,
                at,
                fixture.clone(),
                Some(candidate.pairing),
            );
            let resolution = ConflictResolver::new(rules).resolve(
                &problem.context(&self.grid),
                &self.pool,
                at,
                &fixture,
            );
            match resolution {
                Resolution::Independent => {
                    return Some(Commit {
                        primary,
                        dependents: Vec::new(),
                    })
                }
                Resolution::Dependent(alternatives) => {
                    primary.revert(&mut self.grid, &mut self.pool);
                    frame.pending = Some(Pending {
                        fixture,
                        pairing: candidate.pairing,
                        alternatives,
                        next: 0,
                    });
                }
                Resolution::Rejected => primary.revert(&mut self.grid, &mut self.pool),
            }
        }
    }

    /// Places the primary and every dependent of `alternative`, re-checking
    /// each dependent against the grid as it grows.
    fn commit_alternative(
        &mut self,
        at: SlotRef,
        fixture: &Fixture,
        pairing: usize,
        alternative: &[DependentPlacement],
    ) -> Option<Commit> {
        let problem = self.problem;
        let primary = Placement::apply(
            &mut self.grid,
            &mut self.pool,
            at,
            fixture.clone(),
            Some(pairing),
        );
        let mut commit = Commit {
            primary,
            dependents: Vec::with_capacity(alternative.len()),
        };
        for dep in alternative {
            if !problem
                .rules()
                .check(&problem.context(&self.grid), dep.at, &dep.fixture)
            {
                commit.revert(&mut self.grid, &mut self.pool);
                return None;
            }
            commit.dependents.push(Placement::apply(
                &mut self.grid,
                &mut self.pool,
                dep.at,
                dep.fixture.clone(),
                dep.pairing,
            ));
        }
        Some(commit)
    }

    fn fixture_for(&self, division: usize, candidate: Candidate) -> Fixture {
        let pairing = self.pool.pairing(division, candidate.pairing);
        if candidate.flipped {
            Fixture::new(pairing.second.clone(), pairing.first.clone())
        } else {
            pairing.as_fixture()
        }
    }

    /// Current grid.
    pub fn grid(&self) -> &MatchGrid {
        &self.grid
    }

    /// Current pool.
    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Run counters.
    pub fn state(&self) -> &SearchState {
        self.monitor.state()
    }

    /// State at the best completion so far.
    pub fn best(&self) -> &Snapshot {
        self.monitor.best()
    }

    /// Open slots currently on the stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
