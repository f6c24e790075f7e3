//! Simple Rating System: a team's rating is its own scoring differential plus the average rating of
//! the opponents it faced, `srs = mov + sos`.

use std::str::FromStr;

use strum_macros::{Display, EnumIter};
use tracing::debug;

use crate::data::{DataProvider, Side};
use crate::error::{RatingError, UsageError};
use crate::fixed_point;
use crate::fixed_point::{Convergence, FixedPointConfig};
use crate::rating::Ratings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SrsMode {
    /// Margin of victory per game.
    Normal,
    /// Points scored per game over the league average (OSRS).
    Offense,
    /// Points conceded per game over the league average (DSRS).
    Defense,
}

impl FromStr for SrsMode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(SrsMode::Normal),
            "offense" => Ok(SrsMode::Offense),
            "defense" => Ok(SrsMode::Defense),
            _ => Err(UsageError::UnknownMode {
                kind: "srs",
                value: s.into(),
                expected: "normal|offense|defense",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SrsRatings {
    pub srs: Ratings,
    /// The base term: margin of victory, or scoring over average for the offense/defense modes.
    pub mov: Ratings,
    /// Strength of schedule, `srs − mov`.
    pub sos: Ratings,
    pub convergence: Convergence,
}

pub fn rate<P: DataProvider + ?Sized>(
    provider: &P,
    mode: SrsMode,
    config: &FixedPointConfig,
) -> Result<SrsRatings, RatingError> {
    config.validate().map_err(UsageError::from)?;
    provider.require_games_played()?;
    let opponents = provider.opponents()?;
    let games_played = provider.games_played();

    // offense ratings seed from the defensive series and vice versa
    let (base, init) = match mode {
        SrsMode::Normal => {
            let mov = provider.mov();
            (mov.clone(), mov)
        }
        SrsMode::Offense => (
            provider.scoring_over_average(Side::Offense),
            provider.scoring_over_average(Side::Defense),
        ),
        SrsMode::Defense => (
            provider.scoring_over_average(Side::Defense),
            provider.scoring_over_average(Side::Offense),
        ),
    };
    debug!("SRS ({mode}) base: {base:?}");

    let (srs, convergence) = fixed_point::iterate("SRS", config, init, |current, next| {
        for (team, next) in next.iter_mut().enumerate() {
            *next = base[team] + opponents.sum_over(team, current) / games_played[team] as f64;
        }
    });
    let sos = srs
        .iter()
        .zip(base.iter())
        .map(|(srs, base)| srs - base)
        .collect();

    let teams = provider.teams();
    Ok(SrsRatings {
        srs: Ratings::new(teams.clone(), srs),
        mov: Ratings::new(teams.clone(), base),
        sos: Ratings::new(teams.clone(), sos),
        convergence,
    })
}
