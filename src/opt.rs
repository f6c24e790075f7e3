//! Derivative-free minimisation.

use anyhow::bail;
use serde::{Deserialize, Serialize};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Relative perturbation of each nonzero coordinate when building the initial simplex.
    pub init_step: f64,
    /// Absolute perturbation of coordinates that start at zero.
    pub zero_step: f64,
    /// The search stops once both the residual spread and the coordinate spread of the simplex
    /// fall below this value.
    pub min_spread: f64,
    pub max_steps: u64,
    pub acceptable_residual: f64,
}
impl NelderMeadConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.init_step <= 0.0 {
            bail!("init step must be positive")
        }
        if self.zero_step <= 0.0 {
            bail!("zero step must be positive")
        }
        if self.min_spread <= 0.0 {
            bail!("min spread must be positive")
        }
        if self.max_steps == 0 {
            bail!("at least one step must be specified")
        }
        if self.acceptable_residual < 0.0 {
            bail!("acceptable residual must be non-negative")
        }
        Ok(())
    }
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            init_step: 0.05,
            zero_step: 0.00025,
            min_spread: 1e-9,
            max_steps: 1_000,
            acceptable_residual: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadOutcome {
    pub steps: u64,
    pub optimal_values: Vec<f64>,
    pub optimal_residual: f64,
    pub converged: bool,
}

struct Vertex {
    values: Vec<f64>,
    residual: f64,
}

/// Minimises `loss_f` with the Nelder–Mead simplex method, starting from `initial`.
pub fn nelder_mead(
    config: &NelderMeadConfig,
    initial: &[f64],
    mut loss_f: impl FnMut(&[f64]) -> f64,
) -> Result<NelderMeadOutcome, anyhow::Error> {
    config.validate()?;
    if initial.is_empty() {
        bail!("at least one search dimension must be specified")
    }

    let dimensions = initial.len();
    let mut eval = |values: Vec<f64>| {
        let residual = loss_f(&values);
        Vertex { values, residual }
    };

    let mut simplex = Vec::with_capacity(dimensions + 1);
    simplex.push(eval(initial.to_vec()));
    for dimension in 0..dimensions {
        let mut values = initial.to_vec();
        values[dimension] = if values[dimension] != 0.0 {
            values[dimension] * (1.0 + config.init_step)
        } else {
            config.zero_step
        };
        simplex.push(eval(values));
    }

    let mut steps = 0;
    let mut converged = false;
    loop {
        simplex.sort_by(|a, b| a.residual.total_cmp(&b.residual));
        let (best, worst) = (&simplex[0], &simplex[dimensions]);
        if best.residual <= config.acceptable_residual || spread(&simplex) < config.min_spread {
            converged = true;
            break;
        }
        if steps == config.max_steps {
            break;
        }
        steps += 1;

        let mut centroid = vec![0.0; dimensions];
        for vertex in &simplex[..dimensions] {
            for (sum, value) in centroid.iter_mut().zip(&vertex.values) {
                *sum += value;
            }
        }
        for sum in &mut centroid {
            *sum /= dimensions as f64;
        }

        let towards = |from: &[f64], coefficient: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(from)
                .map(|(centre, value)| centre + coefficient * (value - centre))
                .collect()
        };

        let (best_residual, worst_residual) = (best.residual, worst.residual);
        let reflected = eval(towards(worst.values.as_slice(), -REFLECTION));
        if reflected.residual < best_residual {
            let expanded = eval(towards(reflected.values.as_slice(), EXPANSION));
            simplex[dimensions] = if expanded.residual < reflected.residual {
                expanded
            } else {
                reflected
            };
        } else if reflected.residual < simplex[dimensions - 1].residual {
            simplex[dimensions] = reflected;
        } else {
            let contracted = if reflected.residual < worst_residual {
                eval(towards(reflected.values.as_slice(), CONTRACTION))
            } else {
                eval(towards(simplex[dimensions].values.as_slice(), CONTRACTION))
            };
            if contracted.residual < f64::min(reflected.residual, worst_residual) {
                simplex[dimensions] = contracted;
            } else {
                let best_values = simplex[0].values.clone();
                for vertex in &mut simplex[1..] {
                    let values = best_values
                        .iter()
                        .zip(&vertex.values)
                        .map(|(best, value)| best + SHRINK * (value - best))
                        .collect();
                    *vertex = eval(values);
                }
            }
        }
    }

    let best = simplex.swap_remove(0);
    Ok(NelderMeadOutcome {
        steps,
        optimal_values: best.values,
        optimal_residual: best.residual,
        converged,
    })
}

/// The larger of the residual range and the widest coordinate distance from the best vertex.
fn spread(sorted: &[Vertex]) -> f64 {
    let best = &sorted[0];
    let residual_spread = sorted[sorted.len() - 1].residual - best.residual;
    let coordinate_spread = sorted[1..]
        .iter()
        .flat_map(|vertex| {
            vertex
                .values
                .iter()
                .zip(&best.values)
                .map(|(value, best)| (value - best).abs())
        })
        .fold(0.0, f64::max);
    f64::max(residual_spread, coordinate_spread)
}
