//! Post-hoc audit of a fixture grid.
//!
//! Re-checks every hard constraint over a whole grid, independently of the
//! placement rules, and reports what is broken. Partially filled grids are
//! audited too: reservations count as appearances, and missing pairings are
//! reported as [`ViolationType::UnscheduledPairing`].
//!
//! | Violation | Severity |
//! |-----------|----------|
//! | Double booking | 100 |
//! | Repeated pairing | 90 |
//! | Venue clash | 80 |
//! | Venue requirement | 70 |
//! | Unscheduled pairing | 60 |
//! | Consecutive venue run | 50 |

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{MatchGrid, Side};
use crate::search::SearchProblem;

/// A constraint broken by a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Team (or pairing) concerned.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of fixture violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A team appears twice in one week.
    DoubleBooking,
    /// A pairing appears more than once in a division.
    RepeatedPairing,
    /// Two teams sharing a ground are both at home.
    VenueClash,
    /// A team plays too many weeks running on one side.
    ConsecutiveVenueRun,
    /// A venue requirement is not met.
    VenueRequirement,
    /// A pairing has no slot.
    UnscheduledPairing,
    /// The grid does not match the league layout.
    Layout,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Audits `grid` against the constraints of `problem`.
///
/// Returns an empty list for a complete, valid fixture set.
pub fn audit_schedule(problem: &SearchProblem, grid: &MatchGrid) -> Vec<Violation> {
    if !grid.same_shape(problem.initial_grid()) {
        return vec![Violation::new(
            ViolationType::Layout,
            "grid",
            "grid layout does not match the league's divisions",
            100,
        )];
    }

    let mut violations = Vec::new();
    check_weeks(grid, &mut violations);
    check_pairings(problem, grid, &mut violations);
    check_venue_clashes(problem, grid, &mut violations);
    check_requirements(problem, grid, &mut violations);
    check_runs(problem, grid, &mut violations);
    violations
}

fn check_weeks(grid: &MatchGrid, out: &mut Vec<Violation>) {
    for division in 0..grid.division_count() {
        for (week, slots) in grid.division(division).iter().enumerate() {
            let mut seen = HashSet::new();
            for team in slots.iter().flat_map(|f| f.teams()) {
                if !seen.insert(team) {
                    out.push(Violation::new(
                        ViolationType::DoubleBooking,
                        team,
                        format!("{team} plays twice in week {}", week + 1),
                        100,
                    ));
                }
            }
        }
    }
}

fn check_pairings(problem: &SearchProblem, grid: &MatchGrid, out: &mut Vec<Violation>) {
    for (division, info) in problem.divisions().iter().enumerate() {
        let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for fixture in grid.division(division).iter().flatten() {
            if let (Some(h), Some(a)) = (fixture.home.as_deref(), fixture.away.as_deref()) {
                let key = if h < a { (h, a) } else { (a, h) };
                *counts.entry(key).or_default() += 1;
            }
        }

        for (&(a, b), &n) in &counts {
            if n > 1 {
                out.push(Violation::new(
                    ViolationType::RepeatedPairing,
                    format!("{a}-{b}"),
                    format!("{a} and {b} meet {n} times in {}", info.name),
                    90,
                ));
            }
        }

        for (i, a) in info.teams.iter().enumerate() {
            for b in &info.teams[i + 1..] {
                let key = if a < b { (a.as_str(), b.as_str()) } else { (b.as_str(), a.as_str()) };
                if !counts.contains_key(&key) {
                    out.push(Violation::new(
                        ViolationType::UnscheduledPairing,
                        format!("{a}-{b}"),
                        format!("{a} v {b} has no slot in {}", info.name),
                        60,
                    ));
                }
            }
        }
    }
}

/// Partners both at home in a week. With reverse fixtures, partners both
/// away in a grid week are both at home in its mirrored week.
fn check_venue_clashes(problem: &SearchProblem, grid: &MatchGrid, out: &mut Vec<Violation>) {
    let reverse = problem.config().reverse_fixtures;
    for (a, b) in problem.conflicts().pairs() {
        let (Some(da), Some(db)) = (problem.division_of(&a), problem.division_of(&b)) else {
            continue;
        };
        let weeks = grid.week_count(da).min(grid.week_count(db));
        for week in 0..weeks {
            let season_week = match (
                grid.side_in_week(da, week, &a),
                grid.side_in_week(db, week, &b),
            ) {
                (Some(Side::Home), Some(Side::Home)) => week + 1,
                (Some(Side::Away), Some(Side::Away)) if reverse => grid.week_count(da) + week + 1,
                _ => continue,
            };
            out.push(Violation::new(
                ViolationType::VenueClash,
                a.as_str(),
                format!("{a} and {b} are both at home in week {season_week}"),
                80,
            ));
        }
    }
}

fn check_requirements(problem: &SearchProblem, grid: &MatchGrid, out: &mut Vec<Violation>) {
    for (team, week, required) in problem.venue_requirements().iter() {
        let Some(division) = problem.division_of(team) else {
            continue;
        };
        let Some(actual) = grid.side_in_week(division, week, team) else {
            continue;
        };
        if actual != required {
            out.push(Violation::new(
                ViolationType::VenueRequirement,
                team,
                format!(
                    "{team} must be {} in grid week {} but is {}",
                    side_name(required),
                    week + 1,
                    side_name(actual)
                ),
                70,
            ));
        }
    }
}

fn check_runs(problem: &SearchProblem, grid: &MatchGrid, out: &mut Vec<Violation>) {
    let limit = problem.config().consecutive_venue_limit;
    let extended = problem.config().reverse_fixtures && problem.config().venue_wraparound;
    for (division, info) in problem.divisions().iter().enumerate() {
        let weeks = grid.week_count(division);
        for team in &info.teams {
            let mut sides: Vec<Option<Side>> = (0..weeks)
                .map(|w| grid.side_in_week(division, w, team))
                .collect();
            if extended {
                let mirrored: Vec<Option<Side>> =
                    sides.iter().map(|s| s.map(Side::flip)).collect();
                sides.extend(mirrored);
            }

            let mut run = 0;
            let mut previous = None;
            for side in sides {
                run = if side.is_some() && side == previous { run + 1 } else { 1 };
                previous = side;
                if let Some(side) = side.filter(|_| run == limit + 1) {
                    out.push(Violation::new(
                        ViolationType::ConsecutiveVenueRun,
                        team.as_str(),
                        format!(
                            "{team} plays more than {limit} consecutive weeks {}",
                            side_name(side)
                        ),
                        50,
                    ));
                }
            }
        }
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Home => "home",
        Side::Away => "away",
    }
}
