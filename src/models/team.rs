//! Team and division models.
//!
//! Team identifiers follow the league's club coding convention: an
//! uppercase club prefix followed by a squad number (`WAN1` is the first
//! XI of club `WAN`, `WAN2` its second XI). Squads of the same club share
//! a home ground, which is where venue conflicts come from.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Team identifier as it appears in the league configuration.
pub type TeamId = String;

/// A parsed team code (club prefix + squad number).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamCode {
    /// Club prefix (e.g. "WAN").
    pub club: String,
    /// Squad number within the club (1 = first XI).
    pub squad: u32,
}

impl TeamCode {
    /// Parses a code such as `BRE2` into club `BRE`, squad `2`.
    pub fn parse(code: &str) -> Result<Self, ConfigurationError> {
        let split = code
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| ConfigurationError::InvalidTeamCode(code.to_string()))?;
        let (club, digits) = code.split_at(split);

        if club.is_empty() || !club.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigurationError::InvalidTeamCode(code.to_string()));
        }
        let squad = digits
            .parse::<u32>()
            .map_err(|_| ConfigurationError::InvalidTeamCode(code.to_string()))?;

        Ok(Self {
            club: club.to_string(),
            squad,
        })
    }

    /// Renders the code back to its identifier form.
    pub fn to_id(&self) -> TeamId {
        format!("{}{}", self.club, self.squad)
    }
}

/// A division: an ordered list of teams that play a single round-robin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Display name (e.g. "1st XI Premier").
    pub name: String,
    /// Teams in configuration order.
    pub teams: Vec<TeamId>,
}

impl Division {
    /// Creates a division.
    pub fn new(name: impl Into<String>, teams: Vec<TeamId>) -> Self {
        Self {
            name: name.into(),
            teams,
        }
    }

    /// Creates a division from string slices.
    pub fn from_codes(name: impl Into<String>, teams: &[&str]) -> Self {
        Self::new(name, teams.iter().map(|t| t.to_string()).collect())
    }

    /// Number of teams.
    #[inline]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Weeks needed for a single round-robin.
    ///
    /// Even team counts need `n - 1` weeks; odd counts need `n` weeks with
    /// one team resting each week.
    pub fn round_robin_weeks(&self) -> usize {
        round_robin_weeks(self.teams.len())
    }

    /// Matches per week (`n / 2`, rounded down).
    #[inline]
    pub fn slots_per_week(&self) -> usize {
        self.teams.len() / 2
    }

    /// Whether the division contains the team.
    pub fn contains(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }

    /// Whether some team rests each week.
    #[inline]
    pub fn has_byes(&self) -> bool {
        self.teams.len() % 2 == 1
    }
}

/// Weeks needed for a single round-robin of `team_count` teams.
pub fn round_robin_weeks(team_count: usize) -> usize {
    if team_count < 2 {
        0
    } else if team_count % 2 == 0 {
        team_count - 1
    } else {
        team_count
    }
}
