//! Fixture domain models.
//!
//! Data types for the fixture search: the match grid and its fixtures,
//! the per-division candidate pool, the shared-venue conflict table, and
//! the externally imposed requirements.
//!
//! # Shape
//!
//! | Type | Holds |
//! |------|-------|
//! | `MatchGrid` | divisions → weeks → slots → `Fixture` |
//! | `CandidatePool` | divisions → required `Pairing`s with `used` flags |
//! | `ClubConflictTable` | team → team sharing its home ground |
//! | `VenueRequirements` | (team, week) → required `Side` |

mod conflicts;
mod fixture;
mod grid;
mod league;
mod pool;
mod requirement;
mod season;
mod team;

pub use conflicts::{ClubConflictTable, ConflictSource};
pub use fixture::{Fixture, Side, SlotRef};
pub use grid::{Completion, Direction, GridSlots, MatchGrid};
pub use league::League;
pub use pool::{round_robin, CandidatePool, Pairing};
pub use requirement::{
    resolve_week, FixtureRequirement, GridWeek, VenueRequirement, VenueRequirements,
};
pub use season::{season_fixtures, ScheduledFixture};
pub use team::{round_robin_weeks, Division, TeamCode, TeamId};
