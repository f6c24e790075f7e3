//! Testing helpers.

use assert_float_eq::*;

use crate::data::{Game, Season, Standing, Team};

pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_absolute_eq!(expected, actual, epsilon);
        }
    }
}

/// Four teams, each playing the other three once.
pub fn round_robin_games() -> Vec<Game> {
    vec![
        Game::new("A", "B", 27.0, 13.0),
        Game::new("C", "D", 17.0, 41.0),
        Game::new("B", "D", 31.0, 28.0),
        Game::new("A", "C", 3.0, 10.0),
        Game::new("C", "B", 14.0, 13.0),
        Game::new("D", "A", 42.0, 41.0),
    ]
}

pub fn round_robin() -> Season {
    Season::from_games(round_robin_games()).unwrap()
}

pub fn standing(team: &str, wins: u32, losses: u32, ties: u32, points_for: f64, points_against: f64) -> Standing {
    Standing {
        team: Team::from(team),
        wins,
        losses,
        ties,
        points_for,
        points_against,
    }
}
