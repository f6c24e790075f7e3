//! Strength of schedule, aggregated from opponents' ratings or from opponents' win percentages.

use std::str::FromStr;

use strum_macros::{Display, EnumIter};

use crate::data::DataProvider;
use crate::error::{DomainError, IntegrityError, RatingError, UsageError};
use crate::opponents::Opponents;
use crate::rating::Ratings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SosMode {
    /// Mean of the opponents' ratings.
    Average,
    /// [SosMode::Average], rescaled into [0, 1] by the extremes of the rating map. A map of equal
    /// ratings scales to 0.5 throughout.
    Scaled,
    /// `2/3 · OWP + 1/3 · OOWP`, where OWP is the opponents' pooled win percentage and OOWP that
    /// of the opponents' opponents.
    Bcs,
}
impl SosMode {
    pub fn requires_ratings(&self) -> bool {
        matches!(self, SosMode::Average | SosMode::Scaled)
    }
}

impl FromStr for SosMode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(SosMode::Average),
            "scaled" => Ok(SosMode::Scaled),
            "bcs" => Ok(SosMode::Bcs),
            _ => Err(UsageError::UnknownMode {
                kind: "sos",
                value: s.into(),
                expected: "average|scaled|bcs",
            }),
        }
    }
}

pub fn calculate<P: DataProvider + ?Sized>(
    provider: &P,
    mode: SosMode,
    ratings: Option<&Ratings>,
) -> Result<Ratings, RatingError> {
    if mode.requires_ratings() && ratings.is_none() {
        return Err(UsageError::RatingsRequired("sos average/scaled").into());
    }
    let teams = provider.teams();
    let opponents = provider.opponents()?;
    if let Some(team) = (0..teams.len()).find(|&team| opponents.count(team) == 0) {
        return Err(DomainError::NoOpponentGames(teams[team].clone()).into());
    }

    let values = match (mode, ratings) {
        (SosMode::Average, Some(ratings)) => average(provider, &opponents, ratings)?,
        (SosMode::Scaled, Some(ratings)) => {
            let (min, max) = (ratings.min(), ratings.max());
            let range = max - min;
            average(provider, &opponents, ratings)?
                .into_iter()
                .map(|sos| if range > 0.0 { (sos - min) / range } else { 0.5 })
                .collect()
        }
        _ => bcs(provider, &opponents)?,
    };
    Ok(Ratings::new(teams.clone(), values))
}

fn average<P: DataProvider + ?Sized>(
    provider: &P,
    opponents: &Opponents,
    ratings: &Ratings,
) -> Result<Vec<f64>, RatingError> {
    let teams = provider.teams();
    // the rating map may come from another index, so realign it by team name
    let aligned = teams
        .iter()
        .map(|team| {
            ratings
                .get(team)
                .ok_or_else(|| IntegrityError::UnknownTeam(team.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((0..teams.len())
        .map(|team| opponents.sum_over(team, &aligned) / opponents.count(team) as f64)
        .collect())
}

fn bcs<P: DataProvider + ?Sized>(provider: &P, opponents: &Opponents) -> Result<Vec<f64>, RatingError> {
    let teams = provider.teams();
    let wins = provider.wins();
    let games_played = provider.games_played();

    let pooled = |team: usize| -> (u64, u64) {
        opponents.of(team).iter().fold((0, 0), |(wins_sum, games_sum), &opponent| {
            (
                wins_sum + wins[opponent] as u64,
                games_sum + games_played[opponent] as u64,
            )
        })
    };

    let mut values = Vec::with_capacity(teams.len());
    for team in 0..teams.len() {
        let (opp_wins, opp_games) = pooled(team);
        let (opp_opp_wins, opp_opp_games) = opponents
            .of(team)
            .iter()
            .map(|&opponent| pooled(opponent))
            .fold((0, 0), |(wins_sum, games_sum), (wins, games)| {
                (wins_sum + wins, games_sum + games)
            });
        if opp_games == 0 || opp_opp_games == 0 {
            return Err(DomainError::NoOpponentGames(teams[team].clone()).into());
        }
        let owp = opp_wins as f64 / opp_games as f64;
        let oowp = opp_opp_wins as f64 / opp_opp_games as f64;
        values.push(2.0 / 3.0 * owp + 1.0 / 3.0 * oowp);
    }
    Ok(values)
}
