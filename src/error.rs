//! Error taxonomy shared by the rating systems.
//!
//! [`UsageError`] and [`IntegrityError`] are raised before any numerical work starts. [`DomainError`]
//! marks inputs for which a quantity is mathematically undefined. Non-convergence of the iterative
//! solvers is not an error; see [`Convergence`](crate::fixed_point::Convergence).

use thiserror::Error;

use crate::data::Team;

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("{0}")]
    Usage(#[from] UsageError),

    #[error("{0}")]
    Integrity(#[from] IntegrityError),

    #[error("{0}")]
    Domain(#[from] DomainError),
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("unknown {kind} mode '{value}', must be one of {expected}")]
    UnknownMode {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{0} requires a rating map")]
    RatingsRequired(&'static str),

    #[error("{formula} takes {expected} parameter(s), got {actual}")]
    ParamArity {
        formula: String,
        expected: usize,
        actual: usize,
    },

    #[error("{0}")]
    InvalidConfig(String),
}

impl From<anyhow::Error> for UsageError {
    fn from(value: anyhow::Error) -> Self {
        UsageError::InvalidConfig(value.to_string())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum IntegrityError {
    #[error("team set mismatch: {missing_from_standings:?} missing from standings, {missing_from_games:?} missing from games")]
    TeamMismatch {
        missing_from_standings: Vec<Team>,
        missing_from_games: Vec<Team>,
    },

    #[error("unknown team {0}")]
    UnknownTeam(Team),

    #[error("duplicate standing for {0}")]
    DuplicateStanding(Team),

    #[error("no games played by {0}")]
    NoGamesPlayed(Team),

    #[error("no games in season")]
    NoGames,

    #[error("season has neither games nor standings")]
    EmptySeason,
}

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("win percentage undefined for {points_for} points for, {points_against} against at exponent {exponent}")]
    UndefinedPrediction {
        points_for: f64,
        points_against: f64,
        exponent: f64,
    },

    #[error("no opponent games recorded for {0}")]
    NoOpponentGames(Team),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            "unknown srs mode 'foo', must be one of normal|offense|defense",
            UsageError::UnknownMode {
                kind: "srs",
                value: "foo".into(),
                expected: "normal|offense|defense"
            }
            .to_string()
        );
        assert_eq!(
            "no games played by X",
            RatingError::from(IntegrityError::NoGamesPlayed(Team::from("X"))).to_string()
        );
    }
}
