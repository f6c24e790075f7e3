//! Maximum-likelihood rating from wins and losses alone, in the manner of Bradley–Terry.
//!
//! The probability of team _A_ beating team _B_ is `r(A) / (r(A) + r(B))`. Each team is credited with
//! one win and one loss against a dummy opponent of rating 1, which keeps the ratings of undefeated
//! and winless teams finite.

use tracing::debug;

use crate::data::{DataProvider, Team};
use crate::error::RatingError;
use crate::fixed_point;
use crate::fixed_point::{Convergence, FixedPointConfig};
use crate::rating::Ratings;

const DUMMY_RATING: f64 = 1.0;
const INIT_RATING: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MlRatings {
    pub ratings: Ratings,
    pub convergence: Convergence,
}
impl MlRatings {
    /// Probability that `team` beats `opponent`.
    pub fn win_probability(&self, team: &Team, opponent: &Team) -> Option<f64> {
        let rating = self.ratings.get(team)?;
        let opponent_rating = self.ratings.get(opponent)?;
        Some(rating / (rating + opponent_rating))
    }
}

pub fn rate<P: DataProvider + ?Sized>(provider: &P, config: &FixedPointConfig) -> Result<MlRatings, RatingError> {
    config.validate().map_err(crate::error::UsageError::from)?;
    provider.require_games_played()?;
    let opponents = provider.opponents()?;
    let wins = provider.wins();
    debug!("ML rating {} teams", wins.len());

    let (values, convergence) = fixed_point::iterate(
        "ML rating",
        config,
        vec![INIT_RATING; wins.len()],
        |current, next| {
            for (team, next) in next.iter_mut().enumerate() {
                let rating = current[team];
                let mut denom: f64 = opponents
                    .of(team)
                    .iter()
                    .map(|&opponent| 1.0 / (rating + current[opponent]))
                    .sum();
                denom += 2.0 / (rating + DUMMY_RATING);
                *next = (wins[team] as f64 + 1.0) / denom;
            }
        },
    );

    Ok(MlRatings {
        ratings: Ratings::new(provider.teams().clone(), values),
        convergence,
    })
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use crate::data::{Game, Season};
    use crate::error::{IntegrityError, UsageError};
    use crate::testing::{assert_slice_f64_absolute, round_robin, standing};

    use super::*;

    #[test]
    fn round_robin_ratings() {
        let outcome = rate(&round_robin(), &FixedPointConfig::default()).unwrap();
        assert!(outcome.convergence.converged);
        assert_slice_f64_absolute(&[0.698, 0.698, 1.369, 1.369], outcome.ratings.values(), 0.01);
    }

    #[test]
    fn win_probability() {
        let outcome = rate(&round_robin(), &FixedPointConfig::default()).unwrap();
        let (a, c) = (Team::from("A"), Team::from("C"));
        let p_ac = outcome.win_probability(&a, &c).unwrap();
        let p_ca = outcome.win_probability(&c, &a).unwrap();
        assert_float_absolute_eq!(1.0, p_ac + p_ca, 1e-12);
        assert!(p_ac < 0.5);
        assert_eq!(None, outcome.win_probability(&a, &Team::from("Z")));
    }

    #[test]
    fn undefeated_and_winless_stay_finite_and_positive() {
        let season = Season::from_games(vec![
            Game::new("A", "B", 21.0, 0.0),
            Game::new("A", "C", 14.0, 7.0),
            Game::new("B", "C", 10.0, 3.0),
            Game::new("C", "A", 0.0, 35.0),
        ])
        .unwrap();
        for max_iterations in 1..=20 {
            let outcome = rate(
                &season,
                &FixedPointConfig {
                    tolerance: 1e-3,
                    max_iterations,
                },
            )
            .unwrap();
            for &rating in outcome.ratings.values() {
                assert!(rating.is_finite() && rating > 0.0, "rating {rating} at {max_iterations}");
            }
        }
        let outcome = rate(&season, &FixedPointConfig::default()).unwrap();
        let ratings = &outcome.ratings;
        assert!(ratings[&Team::from("A")] > ratings[&Team::from("B")]);
        assert!(ratings[&Team::from("B")] > ratings[&Team::from("C")]);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let outcome = rate(
            &round_robin(),
            &FixedPointConfig {
                tolerance: 1e-12,
                max_iterations: 2,
            },
        )
        .unwrap();
        assert!(!outcome.convergence.converged);
        assert_eq!(2, outcome.convergence.iterations);
        assert_eq!(4, outcome.ratings.len());
    }

    #[test]
    fn invalid_config() {
        let err = rate(
            &round_robin(),
            &FixedPointConfig {
                tolerance: -1.0,
                max_iterations: 10,
            },
        )
        .unwrap_err();
        assert!(matches!(err, RatingError::Usage(UsageError::InvalidConfig(_))));
    }

    #[test]
    fn team_without_games() {
        let season = Season::from_standings(vec![
            standing("A", 1, 0, 0, 10.0, 7.0),
            standing("B", 0, 0, 0, 0.0, 0.0),
        ])
        .unwrap();
        let err = rate(&season, &FixedPointConfig::default()).unwrap_err();
        assert!(matches!(err, RatingError::Integrity(IntegrityError::NoGamesPlayed(_))));
    }
}
