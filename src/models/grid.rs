//! The match grid: divisions → weeks → slots → fixture.
//!
//! The grid is the only mutable state of a search run. Every write goes
//! through [`MatchGrid::place`], which keeps the filled-slot counter exact so
//! completion can be read in O(1) after each placement.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Division, Fixture, Side, SlotRef};
use crate::error::ConfigurationError;
use crate::models::team::round_robin_weeks;

/// Raw nested slot layout.
pub type GridSlots = Vec<Vec<Vec<Fixture>>>;

/// Scan order over divisions, weeks and slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// First division, first week, first slot onwards.
    #[default]
    Forward,
    /// Last division, last week, last slot backwards.
    Reverse,
}

impl Direction {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Filled slots over total slots, kept as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Completion {
    pub filled: usize,
    pub total: usize,
}

impl Completion {
    pub fn new(filled: usize, total: usize) -> Self {
        Self { filled, total }
    }

    /// Completion as a fraction in `0.0..=1.0`. An empty grid is complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.filled as f64 / self.total as f64
        }
    }

    /// Every slot filled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }

    /// Exact comparison of the two ratios.
    pub fn compare(&self, other: &Completion) -> Ordering {
        let lhs = self.filled as u128 * other.total.max(1) as u128;
        let rhs = other.filled as u128 * self.total.max(1) as u128;
        lhs.cmp(&rhs)
    }

    /// Strictly more complete than `other`.
    pub fn exceeds(&self, other: &Completion) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Whether the fraction is below `floor`.
    pub fn below(&self, floor: f64) -> bool {
        self.fraction() < floor
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%)",
            self.filled,
            self.total,
            self.fraction() * 100.0
        )
    }
}

/// The fixture grid for every division.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "GridSlots", into = "GridSlots")]
pub struct MatchGrid {
    slots: GridSlots,
    filled: usize,
    total: usize,
}

impl MatchGrid {
    /// Builds an empty grid from per-division team and week counts.
    ///
    /// Each week gets `teams / 2` slots, all initialized to `(None, None)`.
    ///
    /// # Errors
    /// * [`ConfigurationError::MismatchedLengths`] if the two lists differ in length.
    /// * [`ConfigurationError::DivisionTooSmall`] for divisions of fewer than two teams.
    /// * [`ConfigurationError::WeekCountMismatch`] if the week count is not the
    ///   single round-robin length for that team count.
    pub fn build(team_counts: &[usize], week_counts: &[usize]) -> Result<Self, ConfigurationError> {
        if team_counts.len() != week_counts.len() {
            return Err(ConfigurationError::MismatchedLengths {
                divisions: team_counts.len(),
                weeks: week_counts.len(),
            });
        }

        let mut slots = Vec::with_capacity(team_counts.len());
        for (division, (&teams, &weeks)) in team_counts.iter().zip(week_counts).enumerate() {
            if teams < 2 {
                return Err(ConfigurationError::DivisionTooSmall { division, teams });
            }
            let per_week = teams / 2;
            if weeks != round_robin_weeks(teams) {
                return Err(ConfigurationError::WeekCountMismatch {
                    division,
                    teams,
                    weeks,
                    slots: per_week,
                });
            }
            slots.push(vec![vec![Fixture::empty(); per_week]; weeks]);
        }

        Ok(Self::from(slots))
    }

    /// Builds an empty grid sized for the given divisions.
    pub fn for_divisions(divisions: &[Division]) -> Result<Self, ConfigurationError> {
        let teams: Vec<usize> = divisions.iter().map(Division::team_count).collect();
        let weeks: Vec<usize> = divisions.iter().map(Division::round_robin_weeks).collect();
        Self::build(&teams, &weeks)
    }

    /// Number of divisions.
    #[inline]
    pub fn division_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of weeks in a division.
    #[inline]
    pub fn week_count(&self, division: usize) -> usize {
        self.slots[division].len()
    }

    /// All weeks of a division.
    #[inline]
    pub fn division(&self, division: usize) -> &[Vec<Fixture>] {
        &self.slots[division]
    }

    /// All slots of a division's week.
    #[inline]
    pub fn week(&self, division: usize, week: usize) -> &[Fixture] {
        &self.slots[division][week]
    }

    /// The fixture at `at`.
    #[inline]
    pub fn fixture(&self, at: SlotRef) -> &Fixture {
        &self.slots[at.division][at.week][at.slot]
    }

    /// Raw nested slots.
    pub fn slots(&self) -> &GridSlots {
        &self.slots
    }

    /// Writes `fixture` into the slot and returns what was there before.
    pub fn place(&mut self, at: SlotRef, fixture: Fixture) -> Fixture {
        let cell = &mut self.slots[at.division][at.week][at.slot];
        let previous = std::mem::replace(cell, fixture);
        match (previous.is_filled(), cell.is_filled()) {
            (false, true) => self.filled += 1,
            (true, false) => self.filled -= 1,
            _ => {}
        }
        previous
    }

    /// Number of fully filled slots.
    #[inline]
    pub fn filled_count(&self) -> usize {
        self.filled
    }

    /// Total number of slots.
    #[inline]
    pub fn total_slots(&self) -> usize {
        self.total
    }

    /// Filled slots in one division.
    pub fn filled_in_division(&self, division: usize) -> usize {
        self.slots[division]
            .iter()
            .flatten()
            .filter(|f| f.is_filled())
            .count()
    }

    /// Current completion. Partially filled slots count as incomplete.
    #[inline]
    pub fn completion(&self) -> Completion {
        Completion::new(self.filled, self.total)
    }

    /// The side `team` plays on in a division's week, if scheduled.
    pub fn side_in_week(&self, division: usize, week: usize, team: &str) -> Option<Side> {
        self.slots[division][week]
            .iter()
            .find_map(|f| f.side_of(team))
    }

    /// First slot in scan order that is not fully filled.
    pub fn next_open_slot(&self, direction: Direction) -> Option<SlotRef> {
        match direction {
            Direction::Forward => self.open_slots().next(),
            Direction::Reverse => self.open_slots_rev().next(),
        }
    }

    fn open_slots(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.slots.iter().enumerate().flat_map(|(d, weeks)| {
            weeks.iter().enumerate().flat_map(move |(w, week)| {
                week.iter()
                    .enumerate()
                    .filter(|(_, f)| !f.is_filled())
                    .map(move |(s, _)| SlotRef::new(d, w, s))
            })
        })
    }

    fn open_slots_rev(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.slots.iter().enumerate().rev().flat_map(|(d, weeks)| {
            weeks.iter().enumerate().rev().flat_map(move |(w, week)| {
                week.iter()
                    .enumerate()
                    .rev()
                    .filter(|(_, f)| !f.is_filled())
                    .map(move |(s, _)| SlotRef::new(d, w, s))
            })
        })
    }

    /// First completely empty slot of a division's week, by index.
    pub fn first_empty_slot(&self, division: usize, week: usize) -> Option<usize> {
        self.slots[division][week].iter().position(Fixture::is_empty)
    }

    /// Whether two grids have identical layout.
    pub fn same_shape(&self, other: &MatchGrid) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|(a, b)| a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.len() == y.len()))
    }
}

impl From<GridSlots> for MatchGrid {
    fn from(slots: GridSlots) -> Self {
        let total = slots.iter().flatten().map(Vec::len).sum();
        let filled = slots
            .iter()
            .flatten()
            .flatten()
            .filter(|f| f.is_filled())
            .count();
        Self {
            slots,
            filled,
            total,
        }
    }
}

impl From<MatchGrid> for GridSlots {
    fn from(grid: MatchGrid) -> Self {
        grid.slots
    }
}
