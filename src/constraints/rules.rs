//! The standard placement rules.
//!
//! | Rule | Rejects when |
//! |------|--------------|
//! | [`TeamsNotAlreadyPlaying`] | a candidate team already plays elsewhere that week |
//! | [`FixtureNotAlreadyScheduled`] | the pairing already sits in the division, either way round |
//! | [`NoVenueClash`] | a venue partner is at home that week (with reverse fixtures, also both away) |
//! | [`ConsecutiveVenueLimit`] | a team would play more than N weeks running on one side |
//! | [`VenueRequirementMatch`] | a team is placed on the side opposite to its requirement |
//! | [`PartialSlotConsistency`] | the candidate disagrees with a side already reserved in the slot |
//!
//! Every rule handles one-sided candidates (reservations) by checking only
//! the side that is present.

use super::{PlacementContext, PlacementRule};
use crate::models::{Fixture, Side, SlotRef};

/// Neither team plays in another slot of the same division-week.
#[derive(Debug, Clone, Copy)]
pub struct TeamsNotAlreadyPlaying;

impl PlacementRule for TeamsNotAlreadyPlaying {
    fn name(&self) -> &'static str {
        "teams-not-playing"
    }

    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        if let (Some(home), Some(away)) = (&candidate.home, &candidate.away) {
            if home == away {
                return false;
            }
        }
        ctx.grid
            .week(at.division, at.week)
            .iter()
            .enumerate()
            .filter(|(slot, _)| *slot != at.slot)
            .all(|(_, fixture)| candidate.teams().all(|team| !fixture.involves(team)))
    }

    fn description(&self) -> &'static str {
        "A team plays at most once per week"
    }
}

/// The unordered pairing is not already placed in the division.
#[derive(Debug, Clone, Copy)]
pub struct FixtureNotAlreadyScheduled;

impl PlacementRule for FixtureNotAlreadyScheduled {
    fn name(&self) -> &'static str {
        "fixture-not-scheduled"
    }

    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        let (Some(home), Some(away)) = (&candidate.home, &candidate.away) else {
            return true;
        };
        ctx.grid
            .division(at.division)
            .iter()
            .enumerate()
            .all(|(week, slots)| {
                slots.iter().enumerate().all(|(slot, fixture)| {
                    SlotRef::new(at.division, week, slot) == at || !fixture.is_pairing(home, away)
                })
            })
    }

    fn description(&self) -> &'static str {
        "Each pairing is played once"
    }
}

/// Teams sharing a ground are never both at home in the same week.
///
/// The home team's partner must not be at home in this week. With reverse
/// fixtures the away team's partner must not be away either, since both
/// would be at home in the mirrored week. Looks at every division that has
/// a week with this index.
#[derive(Debug, Clone, Copy)]
pub struct NoVenueClash;

impl PlacementRule for NoVenueClash {
    fn name(&self) -> &'static str {
        "no-venue-clash"
    }

    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        let sides: &[Side] = if ctx.reverse_fixtures {
            &[Side::Home, Side::Away]
        } else {
            &[Side::Home]
        };
        sides.iter().all(|&side| {
            let Some(partner) = candidate
                .team(side)
                .and_then(|team| ctx.conflicts.counterpart(team))
            else {
                return true;
            };
            (0..ctx.grid.division_count())
                .filter(|&division| at.week < ctx.grid.week_count(division))
                .all(|division| ctx.grid.side_in_week(division, at.week, partner) != Some(side))
        })
    }

    fn description(&self) -> &'static str {
        "Teams sharing a ground are never both at home"
    }
}

/// No team plays more than `consecutive_venue_limit` weeks running on the
/// same side.
///
/// The run through the candidate week is measured in both directions, so
/// the rule holds whichever order the grid is filled in. With reverse
/// fixtures and `venue_wraparound` the season is the grid followed by its
/// mirror, and runs may cross the half-way point. Without wraparound only
/// the grid itself is checked; the mirrored half repeats the same runs.
#[derive(Debug, Clone, Copy)]
pub struct ConsecutiveVenueLimit;

impl ConsecutiveVenueLimit {
    fn run_exceeds(ctx: &PlacementContext<'_>, at: SlotRef, team: &str, side: Side) -> bool {
        let weeks = ctx.grid.week_count(at.division);
        let extended = ctx.reverse_fixtures && ctx.venue_wraparound;
        let season = if extended { 2 * weeks } else { weeks };
        let side_at = |position: usize| -> Option<Side> {
            let (week, mirrored) = if position < weeks {
                (position, false)
            } else {
                (position - weeks, true)
            };
            let side = if week == at.week {
                Some(side)
            } else {
                ctx.grid.side_in_week(at.division, week, team)
            };
            if mirrored {
                side.map(Side::flip)
            } else {
                side
            }
        };

        let mut occurrences = vec![(at.week, side)];
        if extended {
            occurrences.push((weeks + at.week, side.flip()));
        }

        occurrences.into_iter().any(|(position, side)| {
            let before = (0..position)
                .rev()
                .take_while(|&p| side_at(p) == Some(side))
                .count();
            let after = (position + 1..season)
                .take_while(|&p| side_at(p) == Some(side))
                .count();
            before + 1 + after > ctx.consecutive_venue_limit
        })
    }
}

impl PlacementRule for ConsecutiveVenueLimit {
    fn name(&self) -> &'static str {
        "consecutive-venue"
    }

    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        [Side::Home, Side::Away].into_iter().all(|side| match candidate.team(side) {
            Some(team) => !Self::run_exceeds(ctx, at, team, side),
            None => true,
        })
    }

    fn description(&self) -> &'static str {
        "Limits runs of home or away weeks"
    }
}

/// Teams with a venue requirement for this week are on the required side.
#[derive(Debug, Clone, Copy)]
pub struct VenueRequirementMatch;

impl PlacementRule for VenueRequirementMatch {
    fn name(&self) -> &'static str {
        "venue-requirement"
    }

    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        [Side::Home, Side::Away].into_iter().all(|side| {
            candidate.team(side).map_or(true, |team| {
                ctx.venue_requirements
                    .required_side(team, at.week)
                    .map_or(true, |required| required == side)
            })
        })
    }

    fn description(&self) -> &'static str {
        "Honors forced home and away weeks"
    }
}

/// A candidate for a half-reserved slot keeps the reserved team on its side.
/// Filled slots accept nothing.
#[derive(Debug, Clone, Copy)]
pub struct PartialSlotConsistency;

impl PlacementRule for PartialSlotConsistency {
    fn name(&self) -> &'static str {
        "partial-slot"
    }

    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        let existing = ctx.grid.fixture(at);
        if existing.is_filled() {
            return false;
        }
        [Side::Home, Side::Away].into_iter().all(|side| {
            existing
                .team(side)
                .map_or(true, |reserved| candidate.team(side) == Some(reserved))
        })
    }

    fn description(&self) -> &'static str {
        "Respects reserved sides in a slot"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{
        ClubConflictTable, Division, MatchGrid, TeamId, VenueRequirement, VenueRequirements,
    };

    struct Setup {
        grid: MatchGrid,
        conflicts: ClubConflictTable,
        venue: VenueRequirements,
        divisions: HashMap<TeamId, usize>,
        limit: usize,
        reverse: bool,
        wraparound: bool,
    }

    impl Setup {
        fn new(grid_json: &str) -> Self {
            let grid: MatchGrid = serde_json::from_str(grid_json).unwrap();
            Self {
                grid,
                conflicts: ClubConflictTable::new(),
                venue: VenueRequirements::new(),
                divisions: HashMap::new(),
                limit: 2,
                reverse: false,
                wraparound: true,
            }
        }

        fn with_conflicts(mut self, pairs: &[(&str, &str)]) -> Self {
            self.conflicts = ClubConflictTable::from_pairs(pairs.iter().copied()).unwrap();
            self
        }

        fn ctx(&self) -> PlacementContext<'_> {
            PlacementContext {
                grid: &self.grid,
                conflicts: &self.conflicts,
                venue_requirements: &self.venue,
                team_divisions: &self.divisions,
                consecutive_venue_limit: self.limit,
                reverse_fixtures: self.reverse,
                venue_wraparound: self.wraparound,
            }
        }

        fn check<R: PlacementRule>(&self, rule: R, at: SlotRef, candidate: &Fixture) -> bool {
            rule.check(&self.ctx(), at, candidate)
        }
    }

    #[test]
    fn test_team_already_playing_that_week() {
        let s = Setup::new(r#"[[[["A1","B1"],[null,null]],[[null,null],[null,null]]]]"#);
        let at = SlotRef::new(0, 0, 1);
        assert!(!s.check(TeamsNotAlreadyPlaying, at, &Fixture::new("C1", "A1")));
        assert!(s.check(TeamsNotAlreadyPlaying, at, &Fixture::new("C1", "D1")));
        assert!(!s.check(TeamsNotAlreadyPlaying, at, &Fixture::new("C1", "C1")));
        // other weeks are free
        assert!(s.check(TeamsNotAlreadyPlaying, SlotRef::new(0, 1, 0), &Fixture::new("A1", "B1")));
    }

    #[test]
    fn test_team_in_target_slot_is_not_a_clash() {
        let s = Setup::new(r#"[[[[null,"C1"],[null,null]]]]"#);
        let at = SlotRef::new(0, 0, 0);
        assert!(s.check(TeamsNotAlreadyPlaying, at, &Fixture::new("D1", "C1")));
        assert!(!s.check(TeamsNotAlreadyPlaying, SlotRef::new(0, 0, 1), &Fixture::new("D1", "C1")));
    }

    #[test]
    fn test_fixture_already_scheduled_either_way_round() {
        let s = Setup::new(
            r#"[[[["WAN1","CHI1"],[null,null]],[["ABC1","CHI1"],[null,null]],[[null,null],[null,null]]]]"#,
        );
        let at = SlotRef::new(0, 2, 0);
        assert!(!s.check(FixtureNotAlreadyScheduled, at, &Fixture::new("WAN1", "CHI1")));
        assert!(!s.check(FixtureNotAlreadyScheduled, at, &Fixture::new("CHI1", "WAN1")));
        assert!(s.check(FixtureNotAlreadyScheduled, at, &Fixture::new("CHI1", "SOS1")));
        assert!(s.check(
            FixtureNotAlreadyScheduled,
            at,
            &Fixture::reserved("CHI1", Side::Away)
        ));
    }

    #[test]
    fn test_venue_clash_across_divisions() {
        let s = Setup::new(
            r#"[
                [[[null,null],[null,null]],[[null,null],[null,null]]],
                [[["BRE2","WAN2"],[null,null]],[[null,null],[null,null]]]
            ]"#,
        )
        .with_conflicts(&[("BRE1", "BRE2")]);
        let at = SlotRef::new(0, 0, 0);
        assert!(!s.check(NoVenueClash, at, &Fixture::new("BRE1", "CHE1")));
        assert!(s.check(NoVenueClash, at, &Fixture::new("CHE1", "BRE1")));
        assert!(s.check(NoVenueClash, SlotRef::new(0, 1, 0), &Fixture::new("BRE1", "CHE1")));
    }

    #[test]
    fn test_venue_clash_in_mirrored_half() {
        // Both away in grid week 1 means both at home in its mirrored week.
        let mut s = Setup::new(r#"[[[["CHE1","WAN1"]]],[[[null,null]]]]"#)
            .with_conflicts(&[("WAN1", "WAN2")]);
        let at = SlotRef::new(1, 0, 0);
        assert!(s.check(NoVenueClash, at, &Fixture::new("HAD2", "WAN2")));
        s.reverse = true;
        assert!(!s.check(NoVenueClash, at, &Fixture::new("HAD2", "WAN2")));
        assert!(s.check(NoVenueClash, at, &Fixture::new("WAN2", "HAD2")));
    }

    #[test]
    fn test_venue_clash_ignores_shorter_divisions() {
        let s = Setup::new(
            r#"[
                [[[null,null],[null,null]],[[null,null],[null,null]],[[null,null],[null,null]]],
                [[["B2","C2"]]]
            ]"#,
        )
        .with_conflicts(&[("B1", "B2")]);
        assert!(s.check(NoVenueClash, SlotRef::new(0, 2, 0), &Fixture::new("B1", "A1")));
    }

    #[test]
    fn test_consecutive_venue_limit() {
        let s = Setup::new(
            r#"[[
                [["WAN1","A1"],[null,null]],
                [["WAN1","B1"],[null,null]],
                [[null,null],[null,null]]
            ]]"#,
        );
        let at = SlotRef::new(0, 2, 0);
        assert!(!s.check(ConsecutiveVenueLimit, at, &Fixture::new("WAN1", "C1")));
        assert!(s.check(ConsecutiveVenueLimit, at, &Fixture::new("C1", "WAN1")));
    }

    #[test]
    fn test_consecutive_venue_limit_looks_forward() {
        let s = Setup::new(
            r#"[[
                [[null,null],[null,null]],
                [["WAN1","B1"],[null,null]],
                [["WAN1","C1"],[null,null]]
            ]]"#,
        );
        let at = SlotRef::new(0, 0, 0);
        assert!(!s.check(ConsecutiveVenueLimit, at, &Fixture::new("WAN1", "A1")));
        assert!(s.check(ConsecutiveVenueLimit, at, &Fixture::new("A1", "WAN1")));
    }

    #[test]
    fn test_consecutive_venue_limit_across_mirror() {
        // Home in grid week 1 is away in the first mirrored week.
        let mut s = Setup::new(
            r#"[[
                [["A1","C1"]],
                [["B1","A1"]],
                [[null,null]]
            ]]"#,
        );
        s.reverse = true;
        let at = SlotRef::new(0, 2, 0);
        assert!(!s.check(ConsecutiveVenueLimit, at, &Fixture::new("C1", "A1")));
        assert!(s.check(ConsecutiveVenueLimit, at, &Fixture::new("A1", "C1")));
        s.limit = 3;
        assert!(s.check(ConsecutiveVenueLimit, at, &Fixture::new("C1", "A1")));
        s.limit = 2;
        s.wraparound = false;
        assert!(s.check(ConsecutiveVenueLimit, at, &Fixture::new("C1", "A1")));
        s.reverse = false;
        assert!(s.check(ConsecutiveVenueLimit, at, &Fixture::new("C1", "A1")));
    }

    #[test]
    fn test_venue_requirement_match() {
        let divisions = vec![Division::from_codes("Prem", &["A1", "B1", "C1", "D1"])];
        let mut s = Setup::new(r#"[[[[null,null],[null,null]],[[null,null],[null,null]],[[null,null],[null,null]]]]"#);
        s.venue = VenueRequirements::build(&[VenueRequirement::home("A1", 2)], &divisions, false)
            .unwrap();
        let at = SlotRef::new(0, 1, 0);
        assert!(s.check(VenueRequirementMatch, at, &Fixture::new("A1", "B1")));
        assert!(!s.check(VenueRequirementMatch, at, &Fixture::new("B1", "A1")));
        assert!(!s.check(VenueRequirementMatch, at, &Fixture::reserved("A1", Side::Away)));
        assert!(s.check(VenueRequirementMatch, SlotRef::new(0, 0, 0), &Fixture::new("B1", "A1")));
    }

    #[test]
    fn test_partial_slot_consistency() {
        let s = Setup::new(r#"[[[[null,"C1"],["A1","B1"]]]]"#);
        let at = SlotRef::new(0, 0, 0);
        assert!(s.check(PartialSlotConsistency, at, &Fixture::new("D1", "C1")));
        assert!(!s.check(PartialSlotConsistency, at, &Fixture::new("C1", "D1")));
        assert!(!s.check(PartialSlotConsistency, at, &Fixture::new("D1", "E1")));
        assert!(!s.check(PartialSlotConsistency, SlotRef::new(0, 0, 1), &Fixture::new("D1", "E1")));
    }

    #[test]
    fn test_rules_do_not_mutate_and_are_repeatable() {
        let s = Setup::new(
            r#"[[[["WAN1","A1"],[null,null]],[["WAN1","B1"],[null,null]],[[null,null],[null,null]]]]"#,
        );
        let before = s.grid.clone();
        let at = SlotRef::new(0, 2, 0);
        let candidate = Fixture::new("WAN1", "C1");
        let set = super::super::RuleSet::standard();
        let first = set.check(&s.ctx(), at, &candidate);
        let second = set.check(&s.ctx(), at, &candidate);
        assert_eq!(first, second);
        assert_eq!(s.grid, before);
    }
}
