//! A prepared search problem.
//!
//! Preparation turns a [`League`] into everything a search run reads:
//! conflict table, resolved venue requirements, team → division lookup,
//! and the starting grid and pool with the fixed fixtures already placed.
//! All configuration errors surface here, before any search starts.

use std::collections::HashMap;

use crate::constraints::{PlacementContext, RuleSet};
use crate::error::ConfigurationError;
use crate::models::{
    resolve_week, CandidatePool, ClubConflictTable, Division, Fixture, FixtureRequirement, League,
    MatchGrid, SlotRef, TeamId, VenueRequirements,
};
use crate::validation::{validate_league, validate_mirrored_partners};

use super::SearchConfig;

/// Immutable inputs of a fixture search, plus its starting state.
#[derive(Debug, Clone)]
pub struct SearchProblem {
    divisions: Vec<Division>,
    config: SearchConfig,
    conflicts: ClubConflictTable,
    venue_requirements: VenueRequirements,
    team_divisions: HashMap<TeamId, usize>,
    rules: RuleSet,
    grid: MatchGrid,
    pool: CandidatePool,
}

impl SearchProblem {
    /// Validates the league and builds the starting state.
    ///
    /// # Errors
    /// * [`ConfigurationError::InvalidParameter`] for a bad `config`.
    /// * [`ConfigurationError::Invalid`] listing every structural problem
    ///   of the league.
    /// * [`ConfigurationError::InvalidTeamCode`] when conflicts are derived
    ///   and a team name is not a club code.
    /// * [`ConfigurationError::UnknownTeam`] for conflict pairs naming
    ///   teams outside the league.
    /// * [`ConfigurationError::Invalid`] when reverse fixtures are on and
    ///   venue partners play seasons of different lengths.
    /// * [`ConfigurationError::InfeasibleFixture`] for a fixed fixture that
    ///   cannot be placed.
    pub fn prepare(league: &League, config: &SearchConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        validate_league(league, config.reverse_fixtures)?;

        let team_divisions: HashMap<TeamId, usize> = league
            .divisions
            .iter()
            .enumerate()
            .flat_map(|(idx, d)| d.teams.iter().map(move |t| (t.clone(), idx)))
            .collect();

        let conflicts = ClubConflictTable::from_source(&league.conflicts, &league.divisions)?;
        if let Some(team) = conflicts.teams().find(|t| !team_divisions.contains_key(*t)) {
            return Err(ConfigurationError::UnknownTeam {
                team: team.to_string(),
                context: "venue conflicts".into(),
            });
        }
        if config.reverse_fixtures {
            validate_mirrored_partners(&league.divisions, &conflicts)?;
        }

        let venue_requirements = VenueRequirements::build(
            &league.venue_requirements,
            &league.divisions,
            config.reverse_fixtures,
        )?;

        let mut problem = Self {
            divisions: league.divisions.clone(),
            config: config.clone(),
            conflicts,
            venue_requirements,
            team_divisions,
            rules: RuleSet::standard(),
            grid: MatchGrid::for_divisions(&league.divisions)?,
            pool: CandidatePool::for_divisions(&league.divisions),
        };
        problem.seed_fixed_fixtures(&league.fixture_requirements)?;

        log::debug!(
            "prepared {} divisions, {} slots ({} fixed), {} venue conflicts",
            problem.divisions.len(),
            problem.grid.total_slots(),
            problem.grid.filled_count(),
            problem.conflicts.len() / 2
        );
        Ok(problem)
    }

    /// Places each fixed fixture in the first empty slot of its week.
    fn seed_fixed_fixtures(
        &mut self,
        requirements: &[FixtureRequirement],
    ) -> Result<(), ConfigurationError> {
        for req in requirements {
            let infeasible = || ConfigurationError::InfeasibleFixture {
                week: req.week,
                home: req.team1.clone(),
                away: req.team2.clone(),
            };

            let division = self
                .division_of(&req.team1)
                .ok_or_else(|| ConfigurationError::UnknownTeam {
                    team: req.team1.clone(),
                    context: format!("fixed fixture in week {}", req.week),
                })?;
            let grid_week = resolve_week(
                req.week,
                self.grid.week_count(division),
                self.config.reverse_fixtures,
            )
            .ok_or_else(infeasible)?;
            let (home, away) = if grid_week.mirrored {
                (&req.team2, &req.team1)
            } else {
                (&req.team1, &req.team2)
            };

            let slot = self
                .grid
                .first_empty_slot(division, grid_week.index)
                .ok_or_else(infeasible)?;
            let at = SlotRef::new(division, grid_week.index, slot);
            let pairing = self
                .pool
                .find(division, home, away)
                .filter(|&p| !self.pool.is_used(division, p))
                .ok_or_else(infeasible)?;

            let fixture = Fixture::new(home.clone(), away.clone());
            let rejected_by = {
                let ctx = self.context(&self.grid);
                self.rules.first_failure(&ctx, at, &fixture)
            };
            if let Some(rule) = rejected_by {
                log::debug!("fixed fixture {home} v {away} rejected by {rule}");
                return Err(infeasible());
            }

            self.grid.place(at, fixture);
            self.pool.mark_used(division, pairing);
            log::debug!(
                "fixed {home} v {away} in division {division}, grid week {}",
                grid_week.index + 1
            );
        }
        Ok(())
    }

    /// Rule context over `grid`.
    pub fn context<'a>(&'a self, grid: &'a MatchGrid) -> PlacementContext<'a> {
        PlacementContext {
            grid,
            conflicts: &self.conflicts,
            venue_requirements: &self.venue_requirements,
            team_divisions: &self.team_divisions,
            consecutive_venue_limit: self.config.consecutive_venue_limit,
            reverse_fixtures: self.config.reverse_fixtures,
            venue_wraparound: self.config.venue_wraparound,
        }
    }

    /// Divisions in priority order.
    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn conflicts(&self) -> &ClubConflictTable {
        &self.conflicts
    }

    pub fn venue_requirements(&self) -> &VenueRequirements {
        &self.venue_requirements
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Division index of a team.
    pub fn division_of(&self, team: &str) -> Option<usize> {
        self.team_divisions.get(team).copied()
    }

    /// Starting grid (fixed fixtures placed).
    pub fn initial_grid(&self) -> &MatchGrid {
        &self.grid
    }

    /// Starting pool (fixed pairings used).
    pub fn initial_pool(&self) -> &CandidatePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, VenueRequirement};
    use crate::validation::ValidationErrorKind;

    fn league() -> League {
        League::new(vec![
            Division::from_codes("Prem", &["BRE1", "WAN1", "CHE1", "HAD1"]),
            Division::from_codes("2nd XI", &["BRE2", "WAN2", "CHE2", "HAD2"]),
        ])
    }

    #[test]
    fn test_prepare_builds_empty_state() {
        let problem = SearchProblem::prepare(&league(), &SearchConfig::default()).unwrap();
        assert_eq!(problem.initial_grid().total_slots(), 12);
        assert_eq!(problem.initial_grid().filled_count(), 0);
        assert_eq!(problem.initial_pool().pairings(0).len(), 6);
        assert_eq!(problem.conflicts().counterpart("WAN2"), Some("WAN1"));
        assert_eq!(problem.division_of("CHE2"), Some(1));
    }

    #[test]
    fn test_fixed_fixture_is_seeded() {
        let league = league().with_fixture_requirement(FixtureRequirement::new(2, "CHE1", "HAD1"));
        let problem = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap();
        let grid = problem.initial_grid();
        assert_eq!(grid.fixture(SlotRef::new(0, 1, 0)), &Fixture::new("CHE1", "HAD1"));
        assert_eq!(grid.filled_count(), 1);
        let idx = problem.initial_pool().find(0, "HAD1", "CHE1").unwrap();
        assert!(problem.initial_pool().is_used(0, idx));
    }

    #[test]
    fn test_fixed_fixture_in_mirrored_half_is_flipped() {
        let league = league().with_fixture_requirement(FixtureRequirement::new(5, "CHE1", "HAD1"));
        let config = SearchConfig::default().with_reverse_fixtures(true);
        let problem = SearchProblem::prepare(&league, &config).unwrap();
        assert_eq!(
            problem.initial_grid().fixture(SlotRef::new(0, 1, 0)),
            &Fixture::new("HAD1", "CHE1")
        );
    }

    #[test]
    fn test_fixed_fixture_against_venue_requirement_is_infeasible() {
        let league = league()
            .with_venue_requirement(VenueRequirement::new("CHE1", Side::Away, 1))
            .with_fixture_requirement(FixtureRequirement::new(1, "CHE1", "HAD1"));
        let err = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InfeasibleFixture { week: 1, .. }));
    }

    #[test]
    fn test_fixed_fixture_venue_clash_is_infeasible() {
        let league = league()
            .with_fixture_requirement(FixtureRequirement::new(1, "BRE1", "WAN1"))
            .with_fixture_requirement(FixtureRequirement::new(1, "BRE2", "WAN2"));
        let err = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InfeasibleFixture { .. }));
    }

    #[test]
    fn test_pairing_fixed_twice_is_infeasible() {
        let league = league()
            .with_fixture_requirement(FixtureRequirement::new(1, "CHE1", "HAD1"))
            .with_fixture_requirement(FixtureRequirement::new(2, "HAD1", "CHE1"));
        let err = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InfeasibleFixture { week: 2, .. }));
    }

    #[test]
    fn test_invalid_league_collects_errors() {
        let league = League::new(vec![Division::new("Empty", vec![])]);
        let err = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(ref errors) if !errors.is_empty()));
    }

    #[test]
    fn test_explicit_conflict_with_unknown_team() {
        let league = league().with_conflicts(vec![("BRE1".into(), "ZZZ9".into())]);
        let err = SearchProblem::prepare(&league, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownTeam { ref team, .. } if team == "ZZZ9"));
    }

    #[test]
    fn test_reverse_fixtures_need_equal_partner_seasons() {
        let league = League::new(vec![
            Division::from_codes("Prem", &["BRE1", "WAN1", "CHE1", "HAD1"]),
            Division::from_codes("2nd XI", &["BRE2", "WAN2", "CHE2", "HAD2", "SOS2", "ABC2"]),
        ]);
        assert!(SearchProblem::prepare(&league, &SearchConfig::default()).is_ok());

        let config = SearchConfig::default().with_reverse_fixtures(true);
        let err = SearchProblem::prepare(&league, &config).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Invalid(ref errors)
                if errors.iter().all(|e| e.kind == ValidationErrorKind::MismatchedSeasons)
        ));
    }

    #[test]
    fn test_bad_config_rejected_first() {
        let config = SearchConfig::default().with_consecutive_venue_limit(0);
        assert!(matches!(
            SearchProblem::prepare(&league(), &config),
            Err(ConfigurationError::InvalidParameter { .. })
        ));
    }
}
