//! Fatal configuration errors.
//!
//! Everything that makes a league structurally unusable ends up here.
//! Recoverable search signals (low start, stagnation) are not errors; they
//! are reported through [`SearchOutcome`](crate::search::SearchOutcome).

use thiserror::Error;

use crate::validation::ValidationError;

/// Structurally invalid input. Never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{divisions} divisions but {weeks} week counts")]
    MismatchedLengths { divisions: usize, weeks: usize },

    #[error("division {division} has no teams")]
    EmptyDivision { division: usize },

    #[error("division {division} needs at least two teams, found {teams}")]
    DivisionTooSmall { division: usize, teams: usize },

    #[error("division {division} has {teams} teams but {weeks} weeks of {slots} slots")]
    WeekCountMismatch {
        division: usize,
        teams: usize,
        weeks: usize,
        slots: usize,
    },

    #[error("unknown team '{team}' referenced by {context}")]
    UnknownTeam { team: String, context: String },

    #[error("invalid team code '{0}': expected club letters followed by a squad number")]
    InvalidTeamCode(String),

    #[error("team '{team}' shares a venue with both '{first}' and '{second}'")]
    InconsistentConflict {
        team: String,
        first: String,
        second: String,
    },

    #[error("team '{0}' cannot conflict with itself")]
    SelfConflict(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("fixed fixture {home} v {away} in week {week} cannot be placed")]
    InfeasibleFixture {
        week: usize,
        home: String,
        away: String,
    },

    #[error("invalid league: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for ConfigurationError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_joins_messages() {
        let err = ConfigurationError::Invalid(vec![
            ValidationError::new(ValidationErrorKind::EmptyDivision, "division 'A' is empty"),
            ValidationError::new(ValidationErrorKind::DuplicateTeam, "team 'X' appears twice"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid league: division 'A' is empty; team 'X' appears twice"
        );
    }

    #[test]
    fn test_mismatched_lengths_message() {
        let err = ConfigurationError::MismatchedLengths {
            divisions: 2,
            weeks: 3,
        };
        assert_eq!(err.to_string(), "2 divisions but 3 week counts");
    }
}
