//! Fixed-point iteration shared by the ML and SRS rating systems.
//!
//! Convergence of these schemes is empirical, so the iteration count is capped. Hitting the cap is
//! not an error: the last iterate is returned alongside a [Convergence] that records it.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_TOLERANCE: f64 = 1e-3;
pub const DEFAULT_MAX_ITERATIONS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedPointConfig {
    /// Iteration stops once the sum of squared changes falls below this value.
    pub tolerance: f64,
    pub max_iterations: u64,
}
impl FixedPointConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.tolerance <= 0.0 {
            bail!("tolerance must be positive")
        }
        if self.max_iterations == 0 {
            bail!("at least one iteration must be permitted")
        }
        Ok(())
    }
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Convergence {
    pub iterations: u64,
    /// Sum of squared changes over the final iteration.
    pub residual: f64,
    pub converged: bool,
}

/// Repeatedly applies `step`, which computes the next iterate from the current one, until the sum
/// of squared changes drops below the tolerance or the iteration cap is reached.
pub fn iterate(
    label: &str,
    config: &FixedPointConfig,
    init: Vec<f64>,
    mut step: impl FnMut(&[f64], &mut [f64]),
) -> (Vec<f64>, Convergence) {
    let mut current = init;
    let mut next = vec![0.0; current.len()];
    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    while iterations < config.max_iterations {
        iterations += 1;
        step(&current, &mut next);
        residual = current
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (new - old).powi(2))
            .sum();
        std::mem::swap(&mut current, &mut next);
        if residual < config.tolerance {
            break;
        }
    }

    let converged = residual < config.tolerance;
    if converged {
        debug!("{label} converged after {iterations} iterations, residual: {residual:.3e}");
    } else {
        warn!("{label} reached the maximum of {iterations} iterations, residual: {residual:.3e}");
    }
    (
        current,
        Convergence {
            iterations,
            residual,
            converged,
        },
    )
}
