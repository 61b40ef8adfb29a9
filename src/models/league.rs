//! League input: divisions, venue conflicts and requirements.
//!
//! This is what the (external) configuration loader hands to the search.

use serde::{Deserialize, Serialize};

use super::{ConflictSource, Division, FixtureRequirement, TeamId, VenueRequirement};

/// Everything needed to generate a league's fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct League {
    /// Divisions in priority order.
    pub divisions: Vec<Division>,
    /// How shared-venue pairs are obtained.
    pub conflicts: ConflictSource,
    /// Forced home/away designations.
    pub venue_requirements: Vec<VenueRequirement>,
    /// Forced pairings.
    pub fixture_requirements: Vec<FixtureRequirement>,
}

impl League {
    /// Creates a league with derived venue conflicts and no requirements.
    pub fn new(divisions: Vec<Division>) -> Self {
        Self {
            divisions,
            ..Default::default()
        }
    }

    /// Adds a division.
    pub fn with_division(mut self, division: Division) -> Self {
        self.divisions.push(division);
        self
    }

    /// Uses an explicit list of shared-venue pairs.
    pub fn with_conflicts(mut self, pairs: Vec<(TeamId, TeamId)>) -> Self {
        self.conflicts = ConflictSource::Explicit(pairs);
        self
    }

    /// Disables venue conflicts.
    pub fn without_conflicts(mut self) -> Self {
        self.conflicts = ConflictSource::None;
        self
    }

    /// Adds a venue requirement.
    pub fn with_venue_requirement(mut self, requirement: VenueRequirement) -> Self {
        self.venue_requirements.push(requirement);
        self
    }

    /// Adds a fixture requirement.
    pub fn with_fixture_requirement(mut self, requirement: FixtureRequirement) -> Self {
        self.fixture_requirements.push(requirement);
        self
    }

    /// Division index of a team.
    pub fn division_of(&self, team: &str) -> Option<usize> {
        self.divisions.iter().position(|d| d.contains(team))
    }

    /// All teams across divisions.
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.divisions
            .iter()
            .flat_map(|d| d.teams.iter().map(String::as_str))
    }

    /// Division names in order.
    pub fn division_names(&self) -> Vec<&str> {
        self.divisions.iter().map(|d| d.name.as_str()).collect()
    }
}
