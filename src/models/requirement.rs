//! Externally imposed requirements.
//!
//! - [`FixtureRequirement`]: a pairing forced into a given week. Consumed once
//!   when the problem is prepared.
//! - [`VenueRequirement`]: a team must be home (or away) in a given week.
//!   Consulted at every placement.
//!
//! Weeks are 1-based. With reverse fixtures enabled, weeks `W+1..=2W` name
//! the mirrored second half; they are normalized to the first-half week with
//! venues swapped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Division, Side, TeamId};
use crate::error::ConfigurationError;

/// A pairing forced into a specific week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRequirement {
    /// 1-based week.
    pub week: usize,
    /// Home team (in the named week).
    pub team1: TeamId,
    /// Away team (in the named week).
    pub team2: TeamId,
}

impl FixtureRequirement {
    pub fn new(week: usize, team1: impl Into<TeamId>, team2: impl Into<TeamId>) -> Self {
        Self {
            week,
            team1: team1.into(),
            team2: team2.into(),
        }
    }
}

/// A forced home/away designation for a team in a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRequirement {
    pub team: TeamId,
    pub side: Side,
    /// 1-based week.
    pub week: usize,
}

impl VenueRequirement {
    pub fn new(team: impl Into<TeamId>, side: Side, week: usize) -> Self {
        Self {
            team: team.into(),
            side,
            week,
        }
    }

    pub fn home(team: impl Into<TeamId>, week: usize) -> Self {
        Self::new(team, Side::Home, week)
    }

    pub fn away(team: impl Into<TeamId>, week: usize) -> Self {
        Self::new(team, Side::Away, week)
    }
}

/// A 1-based week resolved onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWeek {
    /// 0-based grid week.
    pub index: usize,
    /// Whether the requested week lies in the mirrored second half.
    pub mirrored: bool,
}

impl GridWeek {
    /// Side in the grid for a side requested in the named week.
    #[inline]
    pub fn grid_side(&self, side: Side) -> Side {
        if self.mirrored {
            side.flip()
        } else {
            side
        }
    }
}

/// Maps a 1-based week onto a grid of `weeks` weeks.
///
/// Returns `None` when the week is outside the season.
pub fn resolve_week(week: usize, weeks: usize, reverse_fixtures: bool) -> Option<GridWeek> {
    if week == 0 {
        return None;
    }
    let index = week - 1;
    if index < weeks {
        Some(GridWeek {
            index,
            mirrored: false,
        })
    } else if reverse_fixtures && index < 2 * weeks {
        Some(GridWeek {
            index: index - weeks,
            mirrored: true,
        })
    } else {
        None
    }
}

/// Venue requirements keyed by (team, grid week).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueRequirements {
    required: HashMap<TeamId, HashMap<usize, Side>>,
}

impl VenueRequirements {
    /// No requirements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves requirements against the league layout.
    ///
    /// # Errors
    /// * [`ConfigurationError::UnknownTeam`] for teams in no division.
    /// * [`ConfigurationError::InvalidParameter`] for weeks outside the season
    ///   or two requirements demanding different sides in the same grid week.
    pub fn build(
        requirements: &[VenueRequirement],
        divisions: &[Division],
        reverse_fixtures: bool,
    ) -> Result<Self, ConfigurationError> {
        let mut required: HashMap<TeamId, HashMap<usize, Side>> = HashMap::new();
        for req in requirements {
            let division = divisions
                .iter()
                .find(|d| d.contains(&req.team))
                .ok_or_else(|| ConfigurationError::UnknownTeam {
                    team: req.team.clone(),
                    context: format!("venue requirement for week {}", req.week),
                })?;
            let grid_week = resolve_week(req.week, division.round_robin_weeks(), reverse_fixtures)
                .ok_or_else(|| ConfigurationError::InvalidParameter {
                    name: "venue_requirement.week",
                    reason: format!("week {} is outside the season for {}", req.week, req.team),
                })?;
            let side = grid_week.grid_side(req.side);

            let weeks = required.entry(req.team.clone()).or_default();
            if let Some(&existing) = weeks.get(&grid_week.index) {
                if existing != side {
                    return Err(ConfigurationError::InvalidParameter {
                        name: "venue_requirement.side",
                        reason: format!(
                            "{} is required both home and away in grid week {}",
                            req.team,
                            grid_week.index + 1
                        ),
                    });
                }
            }
            weeks.insert(grid_week.index, side);
        }
        Ok(Self { required })
    }

    /// Side `team` must take in grid week `week` (0-based), if constrained.
    pub fn required_side(&self, team: &str, week: usize) -> Option<Side> {
        self.required
            .get(team)
            .and_then(|weeks| weeks.get(&week))
            .copied()
    }

    /// Number of resolved requirements.
    pub fn len(&self) -> usize {
        self.required.values().map(HashMap::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// All resolved requirements as (team, grid week, side).
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, Side)> {
        self.required.iter().flat_map(|(team, weeks)| {
            weeks
                .iter()
                .map(move |(week, side)| (team.as_str(), *week, *side))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn divisions() -> Vec<Division> {
        vec![Division::from_codes("Prem", &["A1", "B1", "C1", "D1"])]
    }

    #[test]
    fn test_resolve_week() {
        assert_eq!(resolve_week(0, 3, true), None);
        assert_eq!(
            resolve_week(3, 3, false),
            Some(GridWeek { index: 2, mirrored: false })
        );
        assert_eq!(resolve_week(4, 3, false), None);
        assert_eq!(
            resolve_week(4, 3, true),
            Some(GridWeek { index: 0, mirrored: true })
        );
        assert_eq!(resolve_week(7, 3, true), None);
    }

    #[test]
    fn test_build_normalizes_second_half() {
        let reqs = vec![VenueRequirement::home("A1", 5)];
        let table = VenueRequirements::build(&reqs, &divisions(), true).unwrap();
        // Week 5 mirrors week 2 → away in the grid.
        assert_eq!(table.required_side("A1", 1), Some(Side::Away));
        assert_eq!(table.required_side("A1", 0), None);
    }

    #[test]
    fn test_build_rejects_unknown_team() {
        let reqs = vec![VenueRequirement::home("Z1", 1)];
        assert!(matches!(
            VenueRequirements::build(&reqs, &divisions(), false),
            Err(ConfigurationError::UnknownTeam { .. })
        ));
    }

    #[test]
    fn test_build_rejects_out_of_season_week() {
        let reqs = vec![VenueRequirement::away("A1", 4)];
        assert!(VenueRequirements::build(&reqs, &divisions(), false).is_err());
    }

    #[test]
    fn test_build_rejects_contradiction_across_halves() {
        // Home in week 1 and home in week 4 (the mirror of week 1) contradict.
        let reqs = vec![VenueRequirement::home("A1", 1), VenueRequirement::home("A1", 4)];
        assert!(VenueRequirements::build(&reqs, &divisions(), true).is_err());

        let consistent = vec![VenueRequirement::home("A1", 1), VenueRequirement::away("A1", 4)];
        let table = VenueRequirements::build(&consistent, &divisions(), true).unwrap();
        assert_eq!(table.len(), 1);
    }
}
