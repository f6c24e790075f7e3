//! The opponents each team faced, one entry per game played.

use crate::data::{Game, Team, TeamIndex};
use crate::error::IntegrityError;

#[derive(Debug, Clone, PartialEq)]
pub struct Opponents {
    lists: Vec<Vec<usize>>,
}
impl Opponents {
    pub fn try_from_games(teams: &TeamIndex, games: &[Game]) -> Result<Self, IntegrityError> {
        let mut lists = vec![vec![]; teams.len()];
        for game in games {
            let home = teams.try_ordinal(&game.home)?;
            let away = teams.try_ordinal(&game.away)?;
            lists[home].push(away);
            lists[away].push(home);
        }
        Ok(Self { lists })
    }

    /// Ordinals of the opponents faced by the team with the given ordinal. Repeated matchups
    /// appear once per game.
    pub fn of(&self, team: usize) -> &[usize] {
        &self.lists[team]
    }

    pub fn count(&self, team: usize) -> usize {
        self.lists[team].len()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn named<'a>(&'a self, teams: &'a TeamIndex, team: &Team) -> Result<Vec<&'a Team>, IntegrityError> {
        let ordinal = teams.try_ordinal(team)?;
        Ok(self.of(ordinal).iter().map(|&opponent| &teams[opponent]).collect())
    }

    /// Sums `values` over the opponents of `team`.
    pub fn sum_over(&self, team: usize, values: &[f64]) -> f64 {
        self.of(team).iter().map(|&opponent| values[opponent]).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::data::DataProvider;
    use crate::testing::round_robin;

    use super::*;

    #[test]
    fn round_robin_opponents() {
        let season = round_robin();
        let opponents = season.opponents().unwrap();
        assert_eq!(4, opponents.len());
        for team in 0..opponents.len() {
            assert_eq!(3, opponents.count(team));
            assert!(!opponents.of(team).contains(&team));
        }
        assert_eq!(
            vec![&Team::from("B"), &Team::from("C"), &Team::from("D")],
            opponents.named(season.teams(), &Team::from("A")).unwrap()
        );
    }

    #[test]
    fn repeated_matchups_counted_per_game() {
        let teams = TeamIndex::new(["A", "B"].map(Team::from));
        let games = vec![
            Game::new("A", "B", 10.0, 3.0),
            Game::new("B", "A", 7.0, 7.0),
            Game::new("A", "B", 0.0, 14.0),
        ];
        let opponents = Opponents::try_from_games(&teams, &games).unwrap();
        assert_eq!(&[1, 1, 1], opponents.of(0));
        assert_eq!(&[0, 0, 0], opponents.of(1));
        assert_eq!(3.0, opponents.sum_over(0, &[5.0, 1.0]));
    }

    #[test]
    fn unknown_team() {
        let teams = TeamIndex::new(["A", "B"].map(Team::from));
        let games = vec![Game::new("A", "C", 10.0, 3.0)];
        assert_eq!(
            IntegrityError::UnknownTeam(Team::from("C")),
            Opponents::try_from_games(&teams, &games).unwrap_err()
        );
    }
}
