//! Season expansion for output writers.
//!
//! Flattens the grid into dated-week fixtures. With reverse fixtures the
//! grid holds only the first half; the second half repeats it week by week
//! with venues swapped.

use serde::{Deserialize, Serialize};

use super::{MatchGrid, TeamId};

/// One scheduled match of the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledFixture {
    /// Division index.
    pub division: usize,
    /// 1-based season week.
    pub week: usize,
    pub home: TeamId,
    pub away: TeamId,
}

/// Lists every filled fixture in division → week → slot order.
///
/// Partially filled and empty slots are skipped.
pub fn season_fixtures(grid: &MatchGrid, reverse_fixtures: bool) -> Vec<ScheduledFixture> {
    let mut out = Vec::new();
    for division in 0..grid.division_count() {
        let weeks = grid.week_count(division);
        let halves: &[bool] = if reverse_fixtures { &[false, true] } else { &[false] };
        for &mirrored in halves {
            for week in 0..weeks {
                for fixture in grid.week(division, week) {
                    let (Some(home), Some(away)) = (&fixture.home, &fixture.away) else {
                        continue;
                    };
                    let (home, away) = if mirrored { (away, home) } else { (home, away) };
                    out.push(ScheduledFixture {
                        division,
                        week: if mirrored { weeks + week + 1 } else { week + 1 },
                        home: home.clone(),
                        away: away.clone(),
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_half() {
        let grid: MatchGrid =
            serde_json::from_str(r#"[[[["A1","B1"]],[["B1",null]]]]"#).unwrap();
        let fixtures = season_fixtures(&grid, false);
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].week, 1);
        assert_eq!(fixtures[0].home, "A1");
    }

    #[test]
    fn test_mirrored_second_half() {
        let grid: MatchGrid = serde_json::from_str(
            r#"[[[["A1","B1"]],[["C1","A1"]],[["B1","C1"]]]]"#,
        )
        .unwrap();
        let fixtures = season_fixtures(&grid, true);
        assert_eq!(fixtures.len(), 6);
        let week4 = fixtures.iter().find(|f| f.week == 4).unwrap();
        assert_eq!((week4.home.as_str(), week4.away.as_str()), ("B1", "A1"));
        let week6 = fixtures.iter().find(|f| f.week == 6).unwrap();
        assert_eq!((week6.home.as_str(), week6.away.as_str()), ("C1", "B1"));
    }
}
