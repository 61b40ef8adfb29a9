//! Fixture and slot addressing.
//!
//! A [`Fixture`] is the content of one slot: an ordered `(home, away)`
//! pair where either side may still be empty. Both sides empty means the
//! slot is unfilled; exactly one side set is a reservation made by conflict
//! propagation; both set means the slot is filled.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// Which side of a fixture a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Hosting the match.
    Home,
    /// Travelling.
    Away,
}

impl Side {
    /// The other side.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Address of a single slot: division → week → slot (all 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub division: usize,
    pub week: usize,
    pub slot: usize,
}

impl SlotRef {
    pub fn new(division: usize, week: usize, slot: usize) -> Self {
        Self {
            division,
            week,
            slot,
        }
    }
}

/// One slot's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Option<TeamId>, Option<TeamId>)", into = "(Option<TeamId>, Option<TeamId>)")]
pub struct Fixture {
    /// Home team, if placed.
    pub home: Option<TeamId>,
    /// Away team, if placed.
    pub away: Option<TeamId>,
}

impl Fixture {
    /// An unfilled slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A filled fixture.
    pub fn new(home: impl Into<TeamId>, away: impl Into<TeamId>) -> Self {
        Self {
            home: Some(home.into()),
            away: Some(away.into()),
        }
    }

    /// A one-sided reservation for `team` on `side`.
    pub fn reserved(team: impl Into<TeamId>, side: Side) -> Self {
        let team = Some(team.into());
        match side {
            Side::Home => Self { home: team, away: None },
            Side::Away => Self { home: None, away: team },
        }
    }

    /// Both sides empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.away.is_none()
    }

    /// Both sides set.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }

    /// Exactly one side set.
    #[inline]
    pub fn is_partial(&self) -> bool {
        !self.is_empty() && !self.is_filled()
    }

    /// The team on the given side.
    pub fn team(&self, side: Side) -> Option<&str> {
        match side {
            Side::Home => self.home.as_deref(),
            Side::Away => self.away.as_deref(),
        }
    }

    /// The side `team` plays on in this fixture, if present.
    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home.as_deref() == Some(team) {
            Some(Side::Home)
        } else if self.away.as_deref() == Some(team) {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Whether `team` appears on either side.
    #[inline]
    pub fn involves(&self, team: &str) -> bool {
        self.side_of(team).is_some()
    }

    /// Whether this filled fixture is the unordered pairing `{a, b}`.
    pub fn is_pairing(&self, a: &str, b: &str) -> bool {
        match (self.home.as_deref(), self.away.as_deref()) {
            (Some(h), Some(w)) => (h == a && w == b) || (h == b && w == a),
            _ => false,
        }
    }

    /// Same teams with venues swapped.
    pub fn reversed(&self) -> Self {
        Self {
            home: self.away.clone(),
            away: self.home.clone(),
        }
    }

    /// Teams present, home first.
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.home.as_deref().into_iter().chain(self.away.as_deref())
    }
}

impl From<(Option<TeamId>, Option<TeamId>)> for Fixture {
    fn from((home, away): (Option<TeamId>, Option<TeamId>)) -> Self {
        Self { home, away }
    }
}

impl From<Fixture> for (Option<TeamId>, Option<TeamId>) {
    fn from(f: Fixture) -> Self {
        (f.home, f.away)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_states() {
        assert!(Fixture::empty().is_empty());
        assert!(Fixture::new("A1", "B1").is_filled());
        let r = Fixture::reserved("B2", Side::Away);
        assert!(r.is_partial());
        assert_eq!(r.team(Side::Away), Some("B2"));
        assert_eq!(r.team(Side::Home), None);
    }

    #[test]
    fn test_side_of_and_pairing() {
        let f = Fixture::new("WAN1", "CHI1");
        assert_eq!(f.side_of("WAN1"), Some(Side::Home));
        assert_eq!(f.side_of("CHI1"), Some(Side::Away));
        assert_eq!(f.side_of("SOS1"), None);
        assert!(f.is_pairing("CHI1", "WAN1"));
        assert!(!f.is_pairing("CHI1", "SOS1"));
        assert!(!Fixture::reserved("CHI1", Side::Home).is_pairing("CHI1", "WAN1"));
    }

    #[test]
    fn test_reversed() {
        let f = Fixture::new("A1", "B1").reversed();
        assert_eq!(f, Fixture::new("B1", "A1"));
    }

    #[test]
    fn test_serde_as_pair() {
        let f: Fixture = serde_json::from_str(r#"["CHE1", null]"#).unwrap();
        assert_eq!(f, Fixture::reserved("CHE1", Side::Home));
        assert_eq!(
            serde_json::to_string(&Fixture::new("A1", "B1")).unwrap(),
            r#"["A1","B1"]"#
        );
    }

    #[test]
    fn test_side_flip() {
        assert_eq!(Side::Home.flip(), Side::Away);
        assert_eq!(Side::Away.flip(), Side::Home);
    }
}
