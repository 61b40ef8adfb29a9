//! Placement rules and shared-venue conflict resolution.
//!
//! A placement rule is a read-only check of one candidate fixture in one
//! slot. Rules are composed into a [`RuleSet`] and evaluated in order; the
//! first failure rejects the candidate.
//!
//! # Usage
//!
//! ```
//! use u_fixture::constraints::{rules, RuleSet};
//!
//! let standard = RuleSet::standard();
//! assert_eq!(standard.len(), 6);
//!
//! let custom = RuleSet::new()
//!     .with_rule(rules::PartialSlotConsistency)
//!     .with_rule(rules::TeamsNotAlreadyPlaying);
//! assert_eq!(custom.names(), vec!["partial-slot", "teams-not-playing"]);
//! ```

mod resolver;
pub mod rules;

pub use resolver::{Alternative, ConflictResolver, DependentPlacement, Resolution};

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::models::{ClubConflictTable, Fixture, MatchGrid, SlotRef, TeamId, VenueRequirements};

/// Read-only view of the search state handed to placement rules.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    /// Current grid.
    pub grid: &'a MatchGrid,
    /// Shared-venue counterparts.
    pub conflicts: &'a ClubConflictTable,
    /// Required sides per team and grid week.
    pub venue_requirements: &'a VenueRequirements,
    /// Team → division index.
    pub team_divisions: &'a HashMap<TeamId, usize>,
    /// Longest allowed run of consecutive weeks on the same side.
    pub consecutive_venue_limit: usize,
    /// Whether the grid's weeks are replayed with venues swapped.
    pub reverse_fixtures: bool,
    /// Whether venue runs continue from the last week into the mirrored half.
    pub venue_wraparound: bool,
}

impl PlacementContext<'_> {
    /// Division a team plays in.
    #[inline]
    pub fn division_of(&self, team: &str) -> Option<usize> {
        self.team_divisions.get(team).copied()
    }
}

/// A single hard constraint on a candidate placement.
///
/// Implementations must be pure with respect to the context: the same
/// context and candidate always give the same answer.
pub trait PlacementRule: Send + Sync + Debug {
    /// Short rule name used in logs.
    fn name(&self) -> &'static str;

    /// Whether `candidate` may be placed at `at`.
    fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Ordered, short-circuiting composition of placement rules.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn PlacementRule>>,
}

impl RuleSet {
    /// An empty rule set (accepts everything).
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The full set of fixture constraints.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(rules::TeamsNotAlreadyPlaying)
            .with_rule(rules::FixtureNotAlreadyScheduled)
            .with_rule(rules::NoVenueClash)
            .with_rule(rules::ConsecutiveVenueLimit)
            .with_rule(rules::VenueRequirementMatch)
            .with_rule(rules::PartialSlotConsistency)
    }

    /// Appends a rule.
    pub fn with_rule<R: PlacementRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Whether every rule accepts the candidate.
    pub fn check(&self, ctx: &PlacementContext<'_>, at: SlotRef, candidate: &Fixture) -> bool {
        self.rules.iter().all(|r| r.check(ctx, at, candidate))
    }

    /// Name of the first rule rejecting the candidate.
    pub fn first_failure(
        &self,
        ctx: &PlacementContext<'_>,
        at: SlotRef,
        candidate: &Fixture,
    ) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| !r.check(ctx, at, candidate))
            .map(|r| r.name())
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Number of rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.names())
            .finish()
    }
}
