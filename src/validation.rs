//! Input validation for league configurations.
//!
//! Checks structural integrity of divisions and requirements before any
//! grid is built. Detects:
//! - Empty or single-team divisions
//! - Teams listed twice
//! - Requirements naming unknown teams or weeks outside the season
//! - Fixed fixtures that pair a team with itself or across divisions
//! - Contradictory requirements (home and away, or two matches, in one week)
//! - Venue partners whose mirrored halves would not line up
//!
//! All problems are collected, so a loader can report them in one pass.

use std::collections::{HashMap, HashSet};

use crate::models::{resolve_week, ClubConflictTable, Division, League, Side};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A division has no teams.
    EmptyDivision,
    /// A division has a single team and cannot play.
    DivisionTooSmall,
    /// A team appears more than once across divisions.
    DuplicateTeam,
    /// A requirement references a team that is in no division.
    UnknownTeam,
    /// A requirement names a week outside the season.
    InvalidWeek,
    /// A fixed fixture pairs a team with itself.
    SameTeam,
    /// A fixed fixture pairs teams from different divisions.
    CrossDivision,
    /// Two requirements cannot both hold.
    ConflictingRequirement,
    /// Venue partners play seasons of different lengths with reverse
    /// fixtures.
    MismatchedSeasons,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a league configuration.
///
/// Checks:
/// 1. Every division has at least two teams
/// 2. No team appears twice
/// 3. Requirement teams exist
/// 4. Requirement weeks fall inside the season (`1..=W`, or `1..=2W` with
///    reverse fixtures)
/// 5. Fixed fixtures pair two distinct teams of one division
/// 6. No team is fixed into two matches of the same grid week
/// 7. No team is required both home and away in the same grid week
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_league(league: &League, reverse_fixtures: bool) -> ValidationResult {
    let mut errors = Vec::new();

    // Divisions and team uniqueness
    let mut team_division: HashMap<&str, usize> = HashMap::new();
    for (idx, division) in league.divisions.iter().enumerate() {
        match division.teams.len() {
            0 => errors.push(ValidationError::new(
                ValidationErrorKind::EmptyDivision,
                format!("Division '{}' has no teams", division.name),
            )),
            1 => errors.push(ValidationError::new(
                ValidationErrorKind::DivisionTooSmall,
                format!("Division '{}' has a single team", division.name),
            )),
            _ => {}
        }

        for team in &division.teams {
            if team_division.insert(team.as_str(), idx).is_some() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateTeam,
                    format!("Duplicate team: {team}"),
                ));
            }
        }
    }

    let weeks_for = |division: usize| league.divisions[division].round_robin_weeks();

    // Venue requirements
    let mut venue_sides: HashMap<(&str, usize), Side> = HashMap::new();
    for req in &league.venue_requirements {
        let Some(&division) = team_division.get(req.team.as_str()) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTeam,
                format!("Venue requirement references unknown team '{}'", req.team),
            ));
            continue;
        };
        let Some(grid_week) = resolve_week(req.week, weeks_for(division), reverse_fixtures) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeek,
                format!("Venue requirement for '{}' names week {}", req.team, req.week),
            ));
            continue;
        };
        let side = grid_week.grid_side(req.side);
        if let Some(&existing) = venue_sides.get(&(req.team.as_str(), grid_week.index)) {
            if existing != side {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ConflictingRequirement,
                    format!(
                        "'{}' is required both home and away in week {}",
                        req.team, req.week
                    ),
                ));
            }
        }
        venue_sides.insert((req.team.as_str(), grid_week.index), side);
    }

    // Fixture requirements
    let mut fixed_weeks: HashSet<(&str, usize)> = HashSet::new();
    for req in &league.fixture_requirements {
        if req.team1 == req.team2 {
            errors.push(ValidationError::new(
                ValidationErrorKind::SameTeam,
                format!("Fixed fixture pairs '{}' with itself", req.team1),
            ));
            continue;
        }

        let mut known = true;
        for team in [&req.team1, &req.team2] {
            if !team_division.contains_key(team.as_str()) {
                known = false;
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeam,
                    format!("Fixed fixture references unknown team '{team}'"),
                ));
            }
        }
        if !known {
            continue;
        }

        let division = team_division[req.team1.as_str()];
        if team_division[req.team2.as_str()] != division {
            errors.push(ValidationError::new(
                ValidationErrorKind::CrossDivision,
                format!(
                    "Fixed fixture {} v {} spans two divisions",
                    req.team1, req.team2
                ),
            ));
            continue;
        }

        let Some(grid_week) = resolve_week(req.week, weeks_for(division), reverse_fixtures) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeek,
                format!(
                    "Fixed fixture {} v {} names week {}",
                    req.team1, req.team2, req.week
                ),
            ));
            continue;
        };

        for team in [&req.team1, &req.team2] {
            if !fixed_weeks.insert((team.as_str(), grid_week.index)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ConflictingRequirement,
                    format!("'{team}' is fixed into two matches in week {}", req.week),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that venue partners play seasons of the same length.
///
/// With reverse fixtures, grid week `w` of a division returns as week
/// `W + w`. Partners in divisions with different `W` would meet their
/// mirrored weeks at different times, so their venues cannot be kept apart
/// week by week.
pub fn validate_mirrored_partners(
    divisions: &[Division],
    conflicts: &ClubConflictTable,
) -> ValidationResult {
    let weeks: HashMap<&str, usize> = divisions
        .iter()
        .flat_map(|d| {
            let weeks = d.round_robin_weeks();
            d.teams.iter().map(move |t| (t.as_str(), weeks))
        })
        .collect();

    let errors: Vec<ValidationError> = conflicts
        .pairs()
        .into_iter()
        .filter_map(|(a, b)| {
            let (&wa, &wb) = (weeks.get(a.as_str())?, weeks.get(b.as_str())?);
            (wa != wb).then(|| {
                ValidationError::new(
                    ValidationErrorKind::MismatchedSeasons,
                    format!(
                        "'{a}' plays {wa} weeks but its venue partner '{b}' plays {wb}; \
                         reverse fixtures need equal seasons"
                    ),
                )
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
