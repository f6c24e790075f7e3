//! Immutable team → value mappings produced by the rating systems.

use std::ops::Index;

use crate::data::{Team, TeamIndex};

/// Label of the pseudo-team carrying the home-field advantage term.
pub const HOME_FIELD_ADVANTAGE: &str = "Home field advantage";

#[derive(Debug, Clone, PartialEq)]
pub struct Ratings {
    teams: TeamIndex,
    values: Vec<f64>,
}
impl Ratings {
    pub fn new(teams: TeamIndex, values: Vec<f64>) -> Self {
        assert_eq!(
            teams.len(),
            values.len(),
            "{} values supplied for {} teams",
            values.len(),
            teams.len()
        );
        Self { teams, values }
    }

    pub fn teams(&self) -> &TeamIndex {
        &self.teams
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, team: &Team) -> Option<f64> {
        self.teams.ordinal(team).map(|ordinal| self.values[ordinal])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Team, f64)> {
        self.teams.iter().zip(self.values.iter().copied())
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl Index<usize> for Ratings {
    type Output = f64;

    fn index(&self, ordinal: usize) -> &Self::Output {
        &self.values[ordinal]
    }
}

impl Index<&Team> for Ratings {
    type Output = f64;

    fn index(&self, team: &Team) -> &Self::Output {
        let ordinal = self
            .teams
            .ordinal(team)
            .unwrap_or_else(|| panic!("no rating for {team}"));
        &self.values[ordinal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ratings {
        Ratings::new(
            TeamIndex::new(["A", "B", "C"].map(Team::from)),
            vec![3.5, -1.2, 0.9],
        )
    }

    #[test]
    fn lookup() {
        let ratings = sample();
        assert_eq!(Some(-1.2), ratings.get(&Team::from("B")));
        assert_eq!(None, ratings.get(&Team::from("Z")));
        assert_eq!(0.9, ratings[&Team::from("C")]);
        assert_eq!(3.5, ratings[0]);
    }

    #[test]
    fn aggregates() {
        let ratings = sample();
        assert_eq!(-1.2, ratings.min());
        assert_eq!(3.5, ratings.max());
        assert!((ratings.mean() - 3.2 / 3.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic = "2 values supplied for 3 teams"]
    fn mismatched_lengths() {
        Ratings::new(TeamIndex::new(["A", "B", "C"].map(Team::from)), vec![0.0, 1.0]);
    }
}
