//! Season data: teams, games and standings, and the [DataProvider] through which the rating
//! systems consume them.
//!
//! All per-team series are `Vec`s aligned to the [TeamIndex], so the rating systems work on dense
//! ordinals rather than hashing team names in their inner loops.

use std::collections::BTreeSet;
use std::fmt::Formatter;
use std::ops::Index;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::IntegrityError;
use crate::opponents::Opponents;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Team(String);
impl Team {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Team {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for Team {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An ordered set of teams, assigning each a dense ordinal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamIndex {
    teams: Vec<Team>,
    ordinals: FxHashMap<Team, usize>,
}
impl TeamIndex {
    pub fn new(teams: impl IntoIterator<Item = Team>) -> Self {
        let teams: Vec<_> = teams
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let ordinals = teams
            .iter()
            .enumerate()
            .map(|(ordinal, team)| (team.clone(), ordinal))
            .collect();
        Self { teams, ordinals }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    pub fn ordinal(&self, team: &Team) -> Option<usize> {
        self.ordinals.get(team).copied()
    }

    pub fn try_ordinal(&self, team: &Team) -> Result<usize, IntegrityError> {
        self.ordinal(team)
            .ok_or_else(|| IntegrityError::UnknownTeam(team.clone()))
    }
}

impl Index<usize> for TeamIndex {
    type Output = Team;

    fn index(&self, ordinal: usize) -> &Self::Output {
        &self.teams[ordinal]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub home: Team,
    pub away: Team,
    pub home_score: f64,
    pub away_score: f64,
}
impl Game {
    pub fn new(home: impl Into<Team>, away: impl Into<Team>, home_score: f64, away_score: f64) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
            home_score,
            away_score,
        }
    }

    /// Home score less away score.
    pub fn margin(&self) -> f64 {
        self.home_score - self.away_score
    }
}

/// Aggregate results of one team over some window of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team: Team,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
}
impl Standing {
    pub fn empty(team: Team) -> Self {
        Self {
            team,
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Wins over games played; ties count as neither.
    pub fn win_pct(&self) -> f64 {
        self.wins as f64 / self.games_played() as f64
    }

    fn record(&mut self, scored: f64, conceded: f64) {
        self.points_for += scored;
        self.points_against += conceded;
        if scored > conceded {
            self.wins += 1;
        } else if scored < conceded {
            self.losses += 1;
        } else {
            self.ties += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Offense,
    Defense,
}

/// Supplies the materialised season data to the rating systems.
///
/// Implementors provide the team index, the games and the standings aligned to the index; the
/// derived series have default implementations.
pub trait DataProvider {
    fn teams(&self) -> &TeamIndex;

    fn games(&self) -> &[Game];

    /// One standing per team, in team index order.
    fn standings(&self) -> &[Standing];

    fn opponents(&self) -> Result<Opponents, IntegrityError> {
        Opponents::try_from_games(self.teams(), self.games())
    }

    fn wins(&self) -> Vec<u32> {
        self.standings().iter().map(|standing| standing.wins).collect()
    }

    fn games_played(&self) -> Vec<u32> {
        self.standings()
            .iter()
            .map(Standing::games_played)
            .collect()
    }

    fn points_for(&self) -> Vec<f64> {
        self.standings()
            .iter()
            .map(|standing| standing.points_for)
            .collect()
    }

    fn points_against(&self) -> Vec<f64> {
        self.standings()
            .iter()
            .map(|standing| standing.points_against)
            .collect()
    }

    fn win_pct(&self) -> Vec<f64> {
        self.standings().iter().map(Standing::win_pct).collect()
    }

    /// Margin of victory per game.
    fn mov(&self) -> Vec<f64> {
        self.standings()
            .iter()
            .map(|standing| {
                (standing.points_for - standing.points_against) / standing.games_played() as f64
            })
            .collect()
    }

    /// Points scored (offense) or conceded (defense) per game, less the league average points per
    /// team-game.
    fn scoring_over_average(&self, side: Side) -> Vec<f64> {
        let standings = self.standings();
        let total_points: f64 = standings.iter().map(|standing| standing.points_for).sum();
        let total_games: u32 = standings.iter().map(Standing::games_played).sum();
        let average = total_points / total_games as f64;
        standings
            .iter()
            .map(|standing| {
                let points = match side {
                    Side::Offense => standing.points_for,
                    Side::Defense => standing.points_against,
                };
                points / standing.games_played() as f64 - average
            })
            .collect()
    }

    /// Ensures that every team has played at least one game.
    fn require_games_played(&self) -> Result<(), IntegrityError> {
        match self
            .standings()
            .iter()
            .find(|standing| standing.games_played() == 0)
        {
            None => Ok(()),
            Some(standing) => Err(IntegrityError::NoGamesPlayed(standing.team.clone())),
        }
    }
}

/// In-memory [DataProvider] built from games, standings, or both.
#[derive(Debug, Clone)]
pub struct Season {
    teams: TeamIndex,
    games: Vec<Game>,
    standings: Vec<Standing>,
}
impl Season {
    /// Teams and standings are tallied from the games.
    pub fn from_games(games: Vec<Game>) -> Result<Self, IntegrityError> {
        if games.is_empty() {
            return Err(IntegrityError::EmptySeason);
        }
        let teams = TeamIndex::new(
            games
                .iter()
                .flat_map(|game| [game.home.clone(), game.away.clone()]),
        );
        let standings = tally(&teams, &games)?;
        Ok(Self {
            teams,
            games,
            standings,
        })
    }

    /// A season without games; sufficient for the Pythagorean models.
    pub fn from_standings(standings: Vec<Standing>) -> Result<Self, IntegrityError> {
        if standings.is_empty() {
            return Err(IntegrityError::EmptySeason);
        }
        let teams = TeamIndex::new(standings.iter().map(|standing| standing.team.clone()));
        let standings = align(&teams, standings)?;
        Ok(Self {
            teams,
            games: vec![],
            standings,
        })
    }

    /// Combines games with externally sourced standings. The team sets implied by each must match.
    pub fn new(games: Vec<Game>, standings: Vec<Standing>) -> Result<Self, IntegrityError> {
        if games.is_empty() {
            return Self::from_standings(standings);
        }
        if standings.is_empty() {
            return Self::from_games(games);
        }

        let game_teams: BTreeSet<_> = games
            .iter()
            .flat_map(|game| [&game.home, &game.away])
            .collect();
        let standing_teams: BTreeSet<_> = standings.iter().map(|standing| &standing.team).collect();
        if game_teams != standing_teams {
            return Err(IntegrityError::TeamMismatch {
                missing_from_standings: game_teams
                    .difference(&standing_teams)
                    .map(|&team| team.clone())
                    .collect(),
                missing_from_games: standing_teams
                    .difference(&game_teams)
                    .map(|&team| team.clone())
                    .collect(),
            });
        }

        let teams = TeamIndex::new(standing_teams.into_iter().cloned());
        let standings = align(&teams, standings)?;
        Ok(Self {
            teams,
            games,
            standings,
        })
    }
}

impl DataProvider for Season {
    fn teams(&self) -> &TeamIndex {
        &self.teams
    }

    fn games(&self) -> &[Game] {
        &self.games
    }

    fn standings(&self) -> &[Standing] {
        &self.standings
    }
}

fn tally(teams: &TeamIndex, games: &[Game]) -> Result<Vec<Standing>, IntegrityError> {
    let mut standings: Vec<_> = teams.iter().cloned().map(Standing::empty).collect();
    for game in games {
        let home = teams.try_ordinal(&game.home)?;
        let away = teams.try_ordinal(&game.away)?;
        standings[home].record(game.home_score, game.away_score);
        standings[away].record(game.away_score, game.home_score);
    }
    Ok(standings)
}

fn align(teams: &TeamIndex, standings: Vec<Standing>) -> Result<Vec<Standing>, IntegrityError> {
    let mut aligned: Vec<Option<Standing>> = vec![None; teams.len()];
    for standing in standings {
        let ordinal = teams.try_ordinal(&standing.team)?;
        if aligned[ordinal].is_some() {
            return Err(IntegrityError::DuplicateStanding(standing.team));
        }
        aligned[ordinal] = Some(standing);
    }
    Ok(aligned.into_iter().flatten().collect())
}
