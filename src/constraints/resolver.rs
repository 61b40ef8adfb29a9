//! Shared-venue conflict propagation.
//!
//! When team H is placed at home in week w, its venue partner H' must be
//! away that week. With reverse fixtures the away team A is at home in the
//! mirrored week, so its partner A' must be at home in week w as well. The
//! resolver turns these obligations into concrete placements in the
//! partners' divisions so the search commits to them immediately instead of
//! discovering the clash many levels deeper.
//!
//! # Policy
//!
//! For each partner with an obligation:
//!
//! 1. No week w in the partner's division, or a division with byes (the
//!    partner may rest): nothing to place.
//! 2. Partner already on the required side: met. On the other side: the
//!    primary placement is rejected.
//! 3. Otherwise the partner is placed, either as a one-sided reservation in
//!    the first empty slot or by completing a half-reserved slot whose open
//!    side matches with an unused pairing.
//!
//! Every way of meeting all open obligations is one [`Alternative`]. When
//! both partners play in the same division and are free, the mirrored full
//! fixture `(A', H')` comes first. The engine tries the alternatives in
//! order, so dropping one never loses a solution. Dependent placements are
//! checked against the rule set and never propagate further.

use super::{PlacementContext, RuleSet};
use crate::models::{CandidatePool, Fixture, Side, SlotRef, TeamId};

/// A placement forced by a primary placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentPlacement {
    /// Where the dependent fixture goes.
    pub at: SlotRef,
    /// Full fixture or one-sided reservation.
    pub fixture: Fixture,
    /// Pool index of the pairing, for full fixtures.
    pub pairing: Option<usize>,
}

/// Dependent placements committed together with the primary.
pub type Alternative = Vec<DependentPlacement>;

/// Result of resolving a primary placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No dependent placement needed.
    Independent,
    /// One of these must be committed with the primary, tried in order.
    Dependent(Vec<Alternative>),
    /// The primary placement cannot stand.
    Rejected,
}

/// A partner that must appear on `side` in the primary's week.
#[derive(Debug, Clone)]
struct Obligation {
    team: TeamId,
    side: Side,
    division: usize,
}

enum PartnerState {
    Met,
    Open(Obligation),
    Violated,
}

/// Computes dependent placements for shared venues.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver<'a> {
    rules: &'a RuleSet,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Resolves the venue consequences of `placed`, already committed at `at`.
    ///
    /// `ctx.grid` must include the primary placement.
    pub fn resolve(
        &self,
        ctx: &PlacementContext<'_>,
        pool: &CandidatePool,
        at: SlotRef,
        placed: &Fixture,
    ) -> Resolution {
        let mut open = Vec::with_capacity(2);
        for side in [Side::Home, Side::Away] {
            if side == Side::Away && !ctx.reverse_fixtures {
                continue;
            }
            let Some(partner) = placed.team(side).and_then(|t| ctx.conflicts.counterpart(t))
            else {
                continue;
            };
            match Self::partner_state(ctx, at.week, partner, side.flip()) {
                PartnerState::Met => {}
                PartnerState::Open(obligation) => open.push(obligation),
                PartnerState::Violated => return Resolution::Rejected,
            }
        }
        if open.is_empty() {
            return Resolution::Independent;
        }

        let mut alternatives = Vec::new();
        if open.iter().any(|o| o.side == Side::Away) {
            if let Some(mirrored) = self.mirrored_fixture(ctx, pool, at.week, placed) {
                log::trace!("mirroring {:?} as {:?}", placed, mirrored.fixture);
                alternatives.push(vec![mirrored]);
            }
        }
        match open.as_slice() {
            [only] => alternatives.extend(
                self.placements(ctx, pool, at.week, only, None)
                    .into_iter()
                    .map(|p| vec![p]),
            ),
            [first, second] => {
                for p in self.placements(ctx, pool, at.week, first, None) {
                    let taken = (p.at.division == second.division).then_some(p.at.slot);
                    for q in self.placements(ctx, pool, at.week, second, taken) {
                        alternatives.push(vec![p.clone(), q]);
                    }
                }
            }
            _ => {}
        }

        if alternatives.is_empty() {
            Resolution::Rejected
        } else {
            Resolution::Dependent(alternatives)
        }
    }

    fn partner_state(
        ctx: &PlacementContext<'_>,
        week: usize,
        partner: &str,
        side: Side,
    ) -> PartnerState {
        let Some(division) = ctx.division_of(partner) else {
            return PartnerState::Met;
        };
        if week >= ctx.grid.week_count(division) {
            return PartnerState::Met;
        }
        match ctx.grid.side_in_week(division, week, partner) {
            Some(current) if current == side => return PartnerState::Met,
            Some(_) => return PartnerState::Violated,
            None => {}
        }

        let slots = ctx.grid.week(division, week).len();
        let teams_in_division = ctx
            .team_divisions
            .values()
            .filter(|&&d| d == division)
            .count();
        if teams_in_division > 2 * slots {
            return PartnerState::Met;
        }
        PartnerState::Open(Obligation {
            team: partner.to_owned(),
            side,
            division,
        })
    }

    /// Ways to put one partner on its side, reservation first. `taken`
    /// excludes a slot already claimed by another dependent placement.
    fn placements(
        &self,
        ctx: &PlacementContext<'_>,
        pool: &CandidatePool,
        week: usize,
        obligation: &Obligation,
        taken: Option<usize>,
    ) -> Vec<DependentPlacement> {
        let division = obligation.division;
        let mut reservation = None;
        let mut joins = Vec::new();
        for (slot, fixture) in ctx.grid.week(division, week).iter().enumerate() {
            if Some(slot) == taken {
                continue;
            }
            let at = SlotRef::new(division, week, slot);
            if fixture.is_empty() {
                if reservation.is_none() {
                    reservation = Some(DependentPlacement {
                        at,
                        fixture: Fixture::reserved(obligation.team.clone(), obligation.side),
                        pairing: None,
                    });
                }
                continue;
            }
            if !fixture.is_partial() || fixture.team(obligation.side).is_some() {
                continue;
            }
            let Some(opponent) = fixture.team(obligation.side.flip()) else {
                continue;
            };
            let Some(pairing) = pool
                .find(division, &obligation.team, opponent)
                .filter(|&p| !pool.is_used(division, p))
            else {
                continue;
            };
            let fixture = match obligation.side {
                Side::Home => Fixture::new(obligation.team.clone(), opponent),
                Side::Away => Fixture::new(opponent, obligation.team.clone()),
            };
            joins.push(DependentPlacement {
                at,
                fixture,
                pairing: Some(pairing),
            });
        }

        reservation
            .into_iter()
            .chain(joins)
            .filter(|p| self.rules.check(ctx, p.at, &p.fixture))
            .collect()
    }

    /// `(A', H')` when both partners play in the same division, are free
    /// that week and have not met yet.
    fn mirrored_fixture(
        &self,
        ctx: &PlacementContext<'_>,
        pool: &CandidatePool,
        week: usize,
        placed: &Fixture,
    ) -> Option<DependentPlacement> {
        let home_partner = ctx.conflicts.counterpart(placed.home.as_deref()?)?;
        let away_partner = ctx.conflicts.counterpart(placed.away.as_deref()?)?;
        let division = ctx.division_of(home_partner)?;
        if ctx.division_of(away_partner) != Some(division) {
            return None;
        }
        if ctx.grid.side_in_week(division, week, away_partner).is_some()
            || ctx.grid.side_in_week(division, week, home_partner).is_some()
        {
            return None;
        }
        let pairing = pool
            .find(division, away_partner, home_partner)
            .filter(|&p| !pool.is_used(division, p))?;
        let slot = ctx.grid.first_empty_slot(division, week)?;
        let at = SlotRef::new(division, week, slot);
        let fixture = Fixture::new(away_partner, home_partner);
        self.rules
            .check(ctx, at, &fixture)
            .then_some(DependentPlacement {
                at,
                fixture,
                pairing: Some(pairing),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{ClubConflictTable, Division, MatchGrid, VenueRequirements};

    fn divisions() -> Vec<Division> {
        vec![
            Division::from_codes("Prem", &["BRE1", "WAN1", "CHE1", "HAD1"]),
            Division::from_codes("2nd XI", &["BRE2", "WAN2", "CHE2", "HAD2"]),
        ]
    }

    struct Setup {
        grid: MatchGrid,
        pool: CandidatePool,
        conflicts: ClubConflictTable,
        venue: VenueRequirements,
        team_divisions: HashMap<TeamId, usize>,
        rules: RuleSet,
        reverse: bool,
    }

    impl Setup {
        fn new(divisions: &[Division]) -> Self {
            let team_divisions = divisions
                .iter()
                .enumerate()
                .flat_map(|(i, d)| d.teams.iter().map(move |t| (t.clone(), i)))
                .collect();
            Self {
                grid: MatchGrid::for_divisions(divisions).unwrap(),
                pool: CandidatePool::for_divisions(divisions),
                conflicts: ClubConflictTable::derive(divisions).unwrap(),
                venue: VenueRequirements::new(),
                team_divisions,
                rules: RuleSet::standard(),
                reverse: false,
            }
        }

        fn place(&mut self, at: SlotRef, fixture: Fixture) {
            if let (Some(h), Some(a)) = (&fixture.home, &fixture.away) {
                let idx = self.pool.find(at.division, h, a).unwrap();
                self.pool.mark_used(at.division, idx);
            }
            self.grid.place(at, fixture);
        }

        fn resolve(&self, at: SlotRef) -> Resolution {
            let ctx = PlacementContext {
                grid: &self.grid,
                conflicts: &self.conflicts,
                venue_requirements: &self.venue,
                team_divisions: &self.team_divisions,
                consecutive_venue_limit: 2,
                reverse_fixtures: self.reverse,
                venue_wraparound: true,
            };
            let placed = self.grid.fixture(at).clone();
            ConflictResolver::new(&self.rules).resolve(&ctx, &self.pool, at, &placed)
        }

        fn full(&self, at: SlotRef, home: &str, away: &str) -> DependentPlacement {
            DependentPlacement {
                at,
                fixture: Fixture::new(home, away),
                pairing: self.pool.find(at.division, home, away),
            }
        }
    }

    fn reservation(at: SlotRef, team: &str, side: Side) -> DependentPlacement {
        DependentPlacement {
            at,
            fixture: Fixture::reserved(team, side),
            pairing: None,
        }
    }

    fn alternatives(resolution: Resolution) -> Vec<Alternative> {
        match resolution {
            Resolution::Dependent(alternatives) => alternatives,
            other => panic!("expected dependent placements, got {other:?}"),
        }
    }

    #[test]
    fn test_mirrored_fixture_comes_before_reservation() {
        let mut s = Setup::new(&divisions());
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        let target = SlotRef::new(1, 0, 0);
        assert_eq!(
            alternatives(s.resolve(at)),
            vec![
                vec![s.full(target, "WAN2", "BRE2")],
                vec![reservation(target, "BRE2", Side::Away)],
            ]
        );
    }

    #[test]
    fn test_reservation_when_pairing_already_used() {
        let mut s = Setup::new(&divisions());
        s.place(SlotRef::new(1, 1, 0), Fixture::new("WAN2", "BRE2"));
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        assert_eq!(
            alternatives(s.resolve(at)),
            vec![vec![reservation(SlotRef::new(1, 0, 0), "BRE2", Side::Away)]]
        );
    }

    #[test]
    fn test_partner_can_complete_half_reserved_slot() {
        let mut s = Setup::new(&divisions());
        s.place(SlotRef::new(1, 0, 0), Fixture::reserved("CHE2", Side::Home));
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        let found = alternatives(s.resolve(at));
        assert_eq!(found.len(), 3);
        assert_eq!(found[1], vec![reservation(SlotRef::new(1, 0, 1), "BRE2", Side::Away)]);
        assert_eq!(found[2], vec![s.full(SlotRef::new(1, 0, 0), "CHE2", "BRE2")]);
    }

    #[test]
    fn test_partner_already_away_is_independent() {
        let mut s = Setup::new(&divisions());
        s.place(SlotRef::new(1, 0, 0), Fixture::new("CHE2", "BRE2"));
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        assert_eq!(s.resolve(at), Resolution::Independent);
    }

    #[test]
    fn test_partner_at_home_is_rejected() {
        let mut s = Setup::new(&divisions());
        s.place(SlotRef::new(1, 0, 0), Fixture::new("BRE2", "CHE2"));
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        assert_eq!(s.resolve(at), Resolution::Rejected);
    }

    #[test]
    fn test_no_room_for_partner_is_rejected() {
        let mut s = Setup::new(&divisions());
        s.place(SlotRef::new(1, 0, 0), Fixture::new("WAN2", "CHE2"));
        s.place(SlotRef::new(1, 0, 1), Fixture::reserved("HAD2", Side::Away));
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        assert_eq!(s.resolve(at), Resolution::Rejected);
    }

    #[test]
    fn test_home_team_without_partner_is_independent() {
        let mut s = Setup::new(&[Division::from_codes("Solo", &["CHE1", "HAD1"])]);
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("CHE1", "HAD1"));
        assert_eq!(s.resolve(at), Resolution::Independent);
    }

    #[test]
    fn test_division_with_byes_is_independent() {
        let divisions = vec![
            Division::from_codes("Prem", &["BRE1", "WAN1"]),
            Division::from_codes("2nd XI", &["BRE2", "CHE2", "HAD2"]),
        ];
        let mut s = Setup::new(&divisions);
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("BRE1", "WAN1"));
        assert_eq!(s.resolve(at), Resolution::Independent);
    }

    #[test]
    fn test_reverse_mode_puts_away_partner_at_home() {
        let mut s = Setup::new(&divisions());
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("CHE1", "WAN1"));
        let (first, second) = (SlotRef::new(1, 0, 0), SlotRef::new(1, 0, 1));

        assert_eq!(
            alternatives(s.resolve(at)),
            vec![
                vec![s.full(first, "WAN2", "CHE2")],
                vec![reservation(first, "CHE2", Side::Away)],
            ]
        );

        s.reverse = true;
        assert_eq!(
            alternatives(s.resolve(at)),
            vec![
                vec![s.full(first, "WAN2", "CHE2")],
                vec![
                    reservation(first, "CHE2", Side::Away),
                    reservation(second, "WAN2", Side::Home),
                ],
            ]
        );
    }

    #[test]
    fn test_reverse_mode_rejects_partners_both_away() {
        let mut s = Setup::new(&divisions());
        s.place(SlotRef::new(1, 0, 0), Fixture::new("HAD2", "WAN2"));
        let at = SlotRef::new(0, 0, 0);
        s.place(at, Fixture::new("CHE1", "WAN1"));
        assert!(matches!(s.resolve(at), Resolution::Dependent(_)));

        s.reverse = true;
        assert_eq!(s.resolve(at), Resolution::Rejected);
    }
}
