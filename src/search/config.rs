//! Search parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Tunable parameters of a fixture search.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `consecutive_venue_limit` | 2 |
/// | `low_start_floor` | 0.5 |
/// | `check_interval` | 100 000 placements |
/// | `stagnation_window` | 1 000 000 placements |
/// | `reverse_fixtures` | false |
/// | `venue_wraparound` | true |
/// | `max_restarts` | 2 |
/// | `max_attempts` | 20 |
/// | `seed` | drawn from the OS |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Longest allowed run of consecutive home (or away) weeks.
    pub consecutive_venue_limit: usize,
    /// A run is abandoned if its best completion is still below this at a
    /// progress check.
    pub low_start_floor: f64,
    /// Placements between progress checks.
    pub check_interval: u64,
    /// Placements between stagnation checks. Must be a multiple of
    /// `check_interval`.
    pub stagnation_window: u64,
    /// Play a mirrored second half with venues swapped.
    pub reverse_fixtures: bool,
    /// With reverse fixtures, count venue runs across the turn of the
    /// season into the mirrored half.
    pub venue_wraparound: bool,
    /// Direction-reversal restarts per run.
    pub max_restarts: u32,
    /// Seeded runs tried by [`solve`](crate::search::solve).
    pub max_attempts: u32,
    /// Base seed. `None` draws one and records it in the report.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            consecutive_venue_limit: 2,
            low_start_floor: 0.5,
            check_interval: 100_000,
            stagnation_window: 1_000_000,
            reverse_fixtures: false,
            venue_wraparound: true,
            max_restarts: 2,
            max_attempts: 20,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the consecutive venue limit.
    pub fn with_consecutive_venue_limit(mut self, limit: usize) -> Self {
        self.consecutive_venue_limit = limit;
        self
    }

    /// Sets the low-start floor.
    pub fn with_low_start_floor(mut self, floor: f64) -> Self {
        self.low_start_floor = floor;
        self
    }

    /// Sets the progress-check and stagnation intervals.
    pub fn with_intervals(mut self, check_interval: u64, stagnation_window: u64) -> Self {
        self.check_interval = check_interval;
        self.stagnation_window = stagnation_window;
        self
    }

    /// Enables or disables the mirrored second half.
    pub fn with_reverse_fixtures(mut self, reverse: bool) -> Self {
        self.reverse_fixtures = reverse;
        self
    }

    /// Enables or disables run checks across the half-way turn.
    pub fn with_venue_wraparound(mut self, wraparound: bool) -> Self {
        self.venue_wraparound = wraparound;
        self
    }

    /// Sets the restart budget per run.
    pub fn with_max_restarts(mut self, restarts: u32) -> Self {
        self.max_restarts = restarts;
        self
    }

    /// Sets the attempt budget of the retry driver.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Fixes the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.consecutive_venue_limit == 0 {
            return Err(invalid("consecutive_venue_limit", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.low_start_floor) {
            return Err(invalid(
                "low_start_floor",
                format!("{} is outside 0..=1", self.low_start_floor),
            ));
        }
        if self.check_interval == 0 {
            return Err(invalid("check_interval", "must be positive"));
        }
        if self.stagnation_window == 0 || self.stagnation_window % self.check_interval != 0 {
            return Err(invalid(
                "stagnation_window",
                format!(
                    "{} is not a positive multiple of check_interval {}",
                    self.stagnation_window, self.check_interval
                ),
            ));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}
