//! Candidate pool: the pairings each division still has to play.

use serde::{Deserialize, Serialize};

use super::{Division, Fixture, TeamId};

/// An unordered pairing of two teams that must meet once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub first: TeamId,
    pub second: TeamId,
    /// Whether some slot of the division currently holds this pairing.
    pub used: bool,
}

impl Pairing {
    pub fn new(first: impl Into<TeamId>, second: impl Into<TeamId>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            used: false,
        }
    }

    /// Whether the pairing is `{a, b}` in either order.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }

    /// Whether `team` is one of the two sides.
    pub fn involves(&self, team: &str) -> bool {
        self.first == team || self.second == team
    }

    /// The pairing as a fixture with `first` at home.
    pub fn as_fixture(&self) -> Fixture {
        Fixture::new(self.first.clone(), self.second.clone())
    }
}

/// Per-division pairing lists with `used` flags.
///
/// Invariant: in each division, the number of used pairings equals the
/// number of filled slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidatePool {
    divisions: Vec<Vec<Pairing>>,
}

impl CandidatePool {
    /// All unordered pairs within each division's team list, in list order.
    pub fn for_divisions(divisions: &[Division]) -> Self {
        Self {
            divisions: divisions.iter().map(|d| round_robin(&d.teams)).collect(),
        }
    }

    /// Pool from explicit pairing lists.
    pub fn from_pairings(divisions: Vec<Vec<Pairing>>) -> Self {
        Self { divisions }
    }

    /// Number of divisions.
    #[inline]
    pub fn division_count(&self) -> usize {
        self.divisions.len()
    }

    /// All pairings of a division.
    #[inline]
    pub fn pairings(&self, division: usize) -> &[Pairing] {
        &self.divisions[division]
    }

    /// One pairing.
    #[inline]
    pub fn pairing(&self, division: usize, index: usize) -> &Pairing {
        &self.divisions[division][index]
    }

    /// Index of the pairing `{a, b}` in a division.
    pub fn find(&self, division: usize, a: &str, b: &str) -> Option<usize> {
        self.divisions[division].iter().position(|p| p.matches(a, b))
    }

    /// Whether pairing `index` is used.
    #[inline]
    pub fn is_used(&self, division: usize, index: usize) -> bool {
        self.divisions[division][index].used
    }

    /// Marks pairing `index` used.
    pub fn mark_used(&mut self, division: usize, index: usize) {
        let pairing = &mut self.divisions[division][index];
        debug_assert!(!pairing.used, "pairing {}-{} already used", pairing.first, pairing.second);
        pairing.used = true;
    }

    /// Marks pairing `index` unused again.
    pub fn unmark(&mut self, division: usize, index: usize) {
        let pairing = &mut self.divisions[division][index];
        debug_assert!(pairing.used, "pairing {}-{} not used", pairing.first, pairing.second);
        pairing.used = false;
    }

    /// Indices of unused pairings in a division.
    pub fn unused_indices(&self, division: usize) -> Vec<usize> {
        self.divisions[division]
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.used)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of used pairings in a division.
    pub fn used_count(&self, division: usize) -> usize {
        self.divisions[division].iter().filter(|p| p.used).count()
    }

    /// Unused pairings per division (what is left to schedule).
    pub fn unscheduled(&self) -> Vec<Vec<Pairing>> {
        self.divisions
            .iter()
            .map(|d| d.iter().filter(|p| !p.used).cloned().collect())
            .collect()
    }
}

/// Every unordered pair of `teams`, in list order.
pub fn round_robin(teams: &[TeamId]) -> Vec<Pairing> {
    let mut pairings = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for (i, first) in teams.iter().enumerate() {
        for second in &teams[i + 1..] {
            pairings.push(Pairing::new(first.clone(), second.clone()));
        }
    }
    pairings
}
