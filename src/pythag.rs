//! Pythagorean expectation: a team's win percentage predicted from the points it scored and
//! conceded, `pf^x / (pf^x + pa^x)`.
//!
//! The exponent `x` is either a constant or a function of the scoring environment, depending on the
//! [Formula]. Formula parameters can be fitted to the observed win percentages by minimising the
//! sum of squared prediction errors, or supplied directly.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::data::DataProvider;
use crate::error::{DomainError, RatingError, UsageError};
use crate::opt::{nelder_mead, NelderMeadConfig};
use crate::rating::Ratings;

/// The classic baseball exponent.
pub const DEFAULT_EXPONENT: f64 = 2.63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    /// `x = p0`
    Classic,
    /// `x = p0 · log10((pf + pa) / games) + p1`
    Pythagenport,
    /// `x = p0 · log10((pf + pa) / games)`, Pythagenport without the offset.
    PythagenportFo,
    /// `x = ((pf + pa) / games) ^ p0`
    Pythagenpat,
}
impl Formula {
    pub fn arity(&self) -> usize {
        match self {
            Formula::Pythagenport => 2,
            _ => 1,
        }
    }

    pub fn exponent(&self, points_for: f64, points_against: f64, games: f64, params: &[f64]) -> f64 {
        let scoring = (points_for + points_against) / games;
        match self {
            Formula::Classic => params[0],
            Formula::Pythagenport => params[0] * scoring.log10() + params[1],
            Formula::PythagenportFo => params[0] * scoring.log10(),
            Formula::Pythagenpat => scoring.powf(params[0]),
        }
    }

    fn check_arity(&self, params: &[f64]) -> Result<(), UsageError> {
        if params.len() != self.arity() {
            return Err(UsageError::ParamArity {
                formula: self.to_string(),
                expected: self.arity(),
                actual: params.len(),
            });
        }
        Ok(())
    }
}

/// Predicted win percentage for a single team.
pub fn win_pct(points_for: f64, points_against: f64, exponent: f64) -> Result<f64, DomainError> {
    let undefined = || DomainError::UndefinedPrediction {
        points_for,
        points_against,
        exponent,
    };
    if points_for == 0.0 && points_against == 0.0 {
        return Err(undefined());
    }
    if points_against == 0.0 && points_for > 0.0 {
        return Ok(1.0);
    }
    let numerator = points_for.powf(exponent);
    let denominator = numerator + points_against.powf(exponent);
    if denominator == 0.0 {
        return Err(undefined());
    }
    let prediction = numerator / denominator;
    if !prediction.is_finite() {
        return Err(undefined());
    }
    Ok(prediction)
}

/// Initial parameter guesses for each formula, and the optimiser settings used when fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythagoreanDefaults {
    pub classic: Vec<f64>,
    pub pythagenport: Vec<f64>,
    pub pythagenport_fo: Vec<f64>,
    pub pythagenpat: Vec<f64>,
    pub optimiser: NelderMeadConfig,
}
impl PythagoreanDefaults {
    pub fn initial(&self, formula: Formula) -> &[f64] {
        match formula {
            Formula::Classic => &self.classic,
            Formula::Pythagenport => &self.pythagenport,
            Formula::PythagenportFo => &self.pythagenport_fo,
            Formula::Pythagenpat => &self.pythagenpat,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (formula, params) in [
            (Formula::Classic, &self.classic),
            (Formula::Pythagenport, &self.pythagenport),
            (Formula::PythagenportFo, &self.pythagenport_fo),
            (Formula::Pythagenpat, &self.pythagenpat),
        ] {
            if params.len() != formula.arity() {
                bail!(
                    "{formula} takes {} initial parameters, {} supplied",
                    formula.arity(),
                    params.len()
                )
            }
        }
        self.optimiser.validate()
    }
}

impl Default for PythagoreanDefaults {
    fn default() -> Self {
        Self {
            classic: vec![DEFAULT_EXPONENT],
            pythagenport: vec![1.5, 0.45],
            pythagenport_fo: vec![1.5],
            pythagenpat: vec![0.287],
            optimiser: NelderMeadConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fit {
    /// Fit the parameters to the observed win percentages, starting from `initial` or, if absent,
    /// the formula's default guess.
    Optimise { initial: Option<Vec<f64>> },
    /// Evaluate with the given parameters.
    Static(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimisation {
    pub steps: u64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PythagoreanOutcome {
    pub predictions: Ratings,
    pub exponents: Ratings,
    pub params: Vec<f64>,
    /// Sum of squared differences between predicted and observed win percentages.
    pub residual: f64,
    /// Present only when the parameters were fitted.
    pub optimisation: Option<Optimisation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PythagoreanModel {
    pub formula: Formula,
    pub fit: Fit,
    pub defaults: PythagoreanDefaults,
}
impl PythagoreanModel {
    pub fn new(formula: Formula, fit: Fit) -> Self {
        Self {
            formula,
            fit,
            defaults: PythagoreanDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: PythagoreanDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn evaluate<P: DataProvider + ?Sized>(&self, provider: &P) -> Result<PythagoreanOutcome, RatingError> {
        let formula = self.formula;
        let initial = match &self.fit {
            Fit::Static(params) => params.as_slice(),
            Fit::Optimise { initial: Some(initial) } => initial.as_slice(),
            Fit::Optimise { initial: None } => self.defaults.initial(formula),
        };
        formula.check_arity(initial)?;
        provider.require_games_played()?;

        let season = SeasonPoints {
            points_for: provider.points_for(),
            points_against: provider.points_against(),
            games: provider
                .games_played()
                .into_iter()
                .map(|games| games as f64)
                .collect(),
            observed: provider.win_pct(),
        };
        // fails fast on teams whose prediction is undefined for any exponent
        season.predict(formula, initial)?;

        let (params, optimisation) = match &self.fit {
            Fit::Static(params) => (params.clone(), None),
            Fit::Optimise { .. } => {
                self.defaults.optimiser.validate().map_err(UsageError::from)?;
                let outcome = nelder_mead(&self.defaults.optimiser, initial, |params| {
                    season.residual(formula, params).unwrap_or(f64::INFINITY)
                })
                .map_err(UsageError::from)?;
                debug!(
                    "fitted {formula} params {:?} in {} steps, residual: {:.6}",
                    outcome.optimal_values, outcome.steps, outcome.optimal_residual
                );
                (
                    outcome.optimal_values,
                    Some(Optimisation {
                        steps: outcome.steps,
                        converged: outcome.converged,
                    }),
                )
            }
        };

        let (exponents, predictions) = season.predict(formula, &params)?;
        let residual = season.residual(formula, &params)?;
        let teams = provider.teams();
        Ok(PythagoreanOutcome {
            predictions: Ratings::new(teams.clone(), predictions),
            exponents: Ratings::new(teams.clone(), exponents),
            params,
            residual,
            optimisation,
        })
    }
}

struct SeasonPoints {
    points_for: Vec<f64>,
    points_against: Vec<f64>,
    games: Vec<f64>,
    observed: Vec<f64>,
}
impl SeasonPoints {
    /// Per-team exponents and predicted win percentages.
    fn predict(&self, formula: Formula, params: &[f64]) -> Result<(Vec<f64>, Vec<f64>), DomainError> {
        let mut exponents = Vec::with_capacity(self.games.len());
        let mut predictions = Vec::with_capacity(self.games.len());
        for team in 0..self.games.len() {
            let (points_for, points_against) = (self.points_for[team], self.points_against[team]);
            let exponent = formula.exponent(points_for, points_against, self.games[team], params);
            predictions.push(win_pct(points_for, points_against, exponent)?);
            exponents.push(exponent);
        }
        Ok((exponents, predictions))
    }

    fn residual(&self, formula: Formula, params: &[f64]) -> Result<f64, DomainError> {
        let (_, predictions) = self.predict(formula, params)?;
        Ok(predictions
            .iter()
            .zip(&self.observed)
            .map(|(predicted, observed)| (predicted - observed).powi(2))
            .sum())
    }
}
