//! Margin-of-victory rating with a league-wide home-field advantage.
//!
//! Each game contributes one equation, `r(home) − r(away) + hfa ≈ home score − away score`. The
//! resulting overdetermined system is solved in the least-squares sense through the SVD
//! pseudo-inverse, and the team ratings are shifted to a zero mean.
//!
//! The bootstrap variant resamples the games with replacement, solves each resample independently,
//! and averages the solutions. Resamples are spread across a pool of worker threads.

use anyhow::bail;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tinyrand::{Rand, Seeded, StdRand};
use tracing::{debug, warn};

use crate::data::DataProvider;
use crate::error::{IntegrityError, RatingError, UsageError};
use crate::linear::pinv;
use crate::rating::{Ratings, HOME_FIELD_ADVANTAGE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FisbConfig {
    /// Singular values below this cutoff are zeroed rather than inverted.
    pub singular_tolerance: f64,
}
impl FisbConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.singular_tolerance <= 0.0 {
            bail!("singular tolerance must be positive")
        }
        Ok(())
    }
}

impl Default for FisbConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: pinv::SINGULAR_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub iterations: u64,
    pub workers: usize,
    pub seed: u64,
}
impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.iterations == 0 {
            bail!("at least one bootstrap iteration must be specified")
        }
        if self.workers == 0 {
            bail!("at least one worker must be specified")
        }
        Ok(())
    }

    /// Number of resamples assigned to `worker`. The quotas sum to `iterations`.
    fn quota(&self, worker: usize) -> u64 {
        let workers = self.workers as u64;
        let base = self.iterations / workers;
        let remainder = self.iterations % workers;
        if (worker as u64) < remainder {
            base + 1
        } else {
            base
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            workers: 2,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FisbRatings {
    /// Zero-mean team ratings.
    pub ratings: Ratings,
    /// Points credited to the home team, excluded from normalisation.
    pub home_field_advantage: f64,
}
impl FisbRatings {
    /// Team ratings followed by the home-field advantage pseudo-team.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratings
            .iter()
            .map(|(team, rating)| (team.name(), rating))
            .chain(std::iter::once((
                HOME_FIELD_ADVANTAGE,
                self.home_field_advantage,
            )))
    }
}

/// The games × (teams + 1) design matrix and the vector of home margins.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSystem {
    pub matrix: DMatrix<f64>,
    pub margins: Vec<f64>,
}
impl DesignSystem {
    pub fn try_from_provider<P: DataProvider + ?Sized>(provider: &P) -> Result<Self, IntegrityError> {
        let teams = provider.teams();
        let games = provider.games();
        if games.is_empty() {
            return Err(IntegrityError::NoGames);
        }
        let home_field_col = teams.len();
        let mut matrix = DMatrix::zeros(games.len(), teams.len() + 1);
        let mut margins = Vec::with_capacity(games.len());
        for (row, game) in games.iter().enumerate() {
            matrix[(row, teams.try_ordinal(&game.home)?)] = 1.0;
            matrix[(row, teams.try_ordinal(&game.away)?)] = -1.0;
            matrix[(row, home_field_col)] = 1.0;
            margins.push(game.margin());
        }
        Ok(Self { matrix, margins })
    }

    pub fn games(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn solve(&self, config: &FisbConfig) -> Vec<f64> {
        pinv::solve(&self.matrix, &self.margins, config.singular_tolerance)
    }

    /// Draws `games()` rows with replacement.
    pub fn resample(&self, rand: &mut impl Rand) -> Self {
        let games = self.games();
        let rows: Vec<_> = (0..games)
            .map(|_| rand.next_lim_u64(games as u64) as usize)
            .collect();
        Self {
            matrix: self.matrix.select_rows(&rows),
            margins: rows.iter().map(|&row| self.margins[row]).collect(),
        }
    }
}

pub fn rate<P: DataProvider + ?Sized>(provider: &P, config: &FisbConfig) -> Result<FisbRatings, RatingError> {
    config.validate().map_err(UsageError::from)?;
    let system = DesignSystem::try_from_provider(provider)?;
    debug!(
        "solving {}x{} FISB system",
        system.matrix.nrows(),
        system.matrix.ncols()
    );
    let solution = system.solve(config);
    Ok(normalise(provider, solution))
}

pub fn rate_bootstrap<P: DataProvider + ?Sized>(
    provider: &P,
    config: &FisbConfig,
    bootstrap: &BootstrapConfig,
) -> Result<FisbRatings, RatingError> {
    config.validate().map_err(UsageError::from)?;
    bootstrap.validate().map_err(UsageError::from)?;
    let system = DesignSystem::try_from_provider(provider)?;
    let cols = system.matrix.ncols();
    debug!(
        "bootstrapping {}x{} FISB system over {} iterations on {} workers",
        system.matrix.nrows(),
        cols,
        bootstrap.iterations,
        bootstrap.workers
    );

    let run = || -> Vec<Vec<f64>> {
        (0..bootstrap.workers)
            .into_par_iter()
            .map(|worker| {
                let mut rand = StdRand::seed(bootstrap.seed.wrapping_add(worker as u64));
                let mut sum = vec![0.0; cols];
                for _ in 0..bootstrap.quota(worker) {
                    let solution = system.resample(&mut rand).solve(config);
                    for (total, value) in sum.iter_mut().zip(solution) {
                        *total += value;
                    }
                }
                sum
            })
            .collect()
    };
    let partial_sums = match rayon::ThreadPoolBuilder::new()
        .num_threads(bootstrap.workers)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(err) => {
            warn!("could not build a pool of {} workers: {err}", bootstrap.workers);
            run()
        }
    };

    let mut mean = vec![0.0; cols];
    for partial_sum in partial_sums {
        for (total, value) in mean.iter_mut().zip(partial_sum) {
            *total += value;
        }
    }
    for value in &mut mean {
        *value /= bootstrap.iterations as f64;
    }
    Ok(normalise(provider, mean))
}

fn normalise<P: DataProvider + ?Sized>(provider: &P, mut solution: Vec<f64>) -> FisbRatings {
    let home_field_advantage = solution.pop().unwrap_or_default();
    let mean = solution.iter().sum::<f64>() / solution.len() as f64;
    for rating in &mut solution {
        *rating -= mean;
    }
    FisbRatings {
        ratings: Ratings::new(provider.teams().clone(), solution),
        home_field_advantage,
    }
}
