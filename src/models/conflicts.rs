//! Shared-venue conflict table.
//!
//! Two squads that share a home ground cannot both host in the same week.
//! The table maps each such team to its counterpart and is symmetric by
//! construction: inserting `A ↔ B` fails if either side is already paired
//! with someone else.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Division, TeamCode, TeamId};
use crate::error::ConfigurationError;

/// Where venue conflicts come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictSource {
    /// Pair squads of the same club by squad number (1↔2, 3↔4, ...).
    #[default]
    Derived,
    /// An explicit list of shared-venue pairs.
    Explicit(Vec<(TeamId, TeamId)>),
    /// No shared venues.
    None,
}

/// Symmetric team → shared-venue counterpart lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClubConflictTable {
    partners: HashMap<TeamId, TeamId>,
}

impl ClubConflictTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from unordered pairs, inserting both directions.
    ///
    /// Repeating a pair (in either order) is allowed.
    ///
    /// # Errors
    /// * [`ConfigurationError::SelfConflict`] for `(A, A)`.
    /// * [`ConfigurationError::InconsistentConflict`] if a team would get two
    ///   different counterparts.
    pub fn from_pairs<I, A, B>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<TeamId>,
        B: Into<TeamId>,
    {
        let mut table = Self::new();
        for (a, b) in pairs {
            table.insert(a.into(), b.into())?;
        }
        Ok(table)
    }

    /// Derives conflicts from team codes across all divisions.
    ///
    /// Within each club, odd squad `n` shares a ground with squad `n + 1`
    /// when both exist. A club with a single squad gets no pairing.
    pub fn derive(divisions: &[Division]) -> Result<Self, ConfigurationError> {
        let mut clubs: BTreeMap<String, BTreeMap<u32, &str>> = BTreeMap::new();
        for team in divisions.iter().flat_map(|d| &d.teams) {
            let code = TeamCode::parse(team)?;
            clubs
                .entry(code.club)
                .or_default()
                .insert(code.squad, team.as_str());
        }

        let mut table = Self::new();
        for squads in clubs.values() {
            for (&squad, &team) in squads {
                if squad % 2 == 1 {
                    if let Some(&partner) = squads.get(&(squad + 1)) {
                        table.insert(team.to_string(), partner.to_string())?;
                    }
                }
            }
        }
        Ok(table)
    }

    /// Builds the table described by `source`.
    pub fn from_source(
        source: &ConflictSource,
        divisions: &[Division],
    ) -> Result<Self, ConfigurationError> {
        match source {
            ConflictSource::Derived => Self::derive(divisions),
            ConflictSource::Explicit(pairs) => Self::from_pairs(pairs.iter().cloned()),
            ConflictSource::None => Ok(Self::new()),
        }
    }

    fn insert(&mut self, a: TeamId, b: TeamId) -> Result<(), ConfigurationError> {
        if a == b {
            return Err(ConfigurationError::SelfConflict(a));
        }
        for (team, partner) in [(&a, &b), (&b, &a)] {
            if let Some(existing) = self.partners.get(team) {
                if existing != partner {
                    return Err(ConfigurationError::InconsistentConflict {
                        team: team.clone(),
                        first: existing.clone(),
                        second: partner.clone(),
                    });
                }
            }
        }
        self.partners.insert(a.clone(), b.clone());
        self.partners.insert(b, a);
        Ok(())
    }

    /// The team sharing `team`'s home venue.
    #[inline]
    pub fn counterpart(&self, team: &str) -> Option<&str> {
        self.partners.get(team).map(String::as_str)
    }

    /// Whether both teams share a venue.
    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.counterpart(a) == Some(b)
    }

    /// Every mapping has its mirror.
    pub fn is_symmetric(&self) -> bool {
        self.partners
            .iter()
            .all(|(team, partner)| self.partners.get(partner) == Some(team))
    }

    /// Teams that have a counterpart.
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.partners.keys().map(String::as_str)
    }

    /// Each conflict once, ordered, smaller id first.
    pub fn pairs(&self) -> Vec<(TeamId, TeamId)> {
        let mut pairs: Vec<(TeamId, TeamId)> = self
            .partners
            .iter()
            .filter(|(a, b)| a < b)
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Number of teams with a counterpart.
    #[inline]
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}
