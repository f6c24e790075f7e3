//! Computes any selection of the rating systems and Pythagorean formulas for one season, collecting
//! the results into a single table with one row per team plus a home-field advantage row.

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::config::Config;
use crate::data::DataProvider;
use crate::error::{RatingError, UsageError};
use crate::fixed_point::Convergence;
use crate::pythag::{Fit, Formula, PythagoreanModel};
use crate::rating::{Ratings, HOME_FIELD_ADVANTAGE};
use crate::sos::SosMode;
use crate::srs::SrsMode;
use crate::{fisb, ml, sos, srs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Stat {
    #[strum(serialize = "fisb")]
    Fisb,
    #[strum(serialize = "ml")]
    MaxL,
    #[strum(serialize = "srs")]
    Srs,
    #[strum(serialize = "pyth")]
    Pythagorean,
    #[strum(serialize = "port")]
    Pythagenport,
    #[strum(serialize = "pat")]
    Pythagenpat,
}
impl Stat {
    /// Parses a comma-separated list of stat names, dropping repeats.
    pub fn parse_list(list: &str) -> Result<Vec<Stat>, UsageError> {
        let mut stats = vec![];
        for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let stat = Stat::from_str(name).map_err(|_| UsageError::UnknownMode {
                kind: "stat",
                value: name.into(),
                expected: "fisb|ml|srs|pyth|port|pat",
            })?;
            if !stats.contains(&stat) {
                stats.push(stat);
            }
        }
        Ok(stats)
    }

}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub heading: String,
    /// One value per table row; the last row is the home-field advantage.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    rows: Vec<String>,
    columns: Vec<Column>,
    notes: Vec<String>,
}
impl MetricsTable {
    fn new(teams: impl IntoIterator<Item = String>) -> Self {
        let mut rows: Vec<_> = teams.into_iter().collect();
        rows.push(HOME_FIELD_ADVANTAGE.into());
        Self {
            rows,
            columns: vec![],
            notes: vec![],
        }
    }

    /// Row labels: the team names followed by the home-field advantage.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, heading: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|column| column.heading == heading)
            .map(|column| column.values.as_slice())
    }

    pub fn get(&self, row: &str, heading: &str) -> Option<f64> {
        let row = self.rows.iter().position(|label| label == row)?;
        self.column(heading)?[row]
    }

    /// Warnings raised while computing, such as iterative solvers that hit their caps.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    fn push_ratings(&mut self, heading: impl Into<String>, ratings: &Ratings, home_field: Option<f64>) {
        let mut values: Vec<_> = ratings.values().iter().copied().map(Some).collect();
        values.push(home_field);
        self.columns.push(Column {
            heading: heading.into(),
            values,
        });
    }

    fn note_convergence(&mut self, heading: &str, convergence: &Convergence) {
        if !convergence.converged {
            self.notes.push(format!(
                "{heading} did not converge within {} iterations (residual {:.3e})",
                convergence.iterations, convergence.residual
            ));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub config: Config,
    /// Whether FISB ratings are averaged over bootstrap resamples rather than solved once.
    pub bootstrap: bool,
    /// Adds a strength of schedule column. The average and scaled modes are computed from the
    /// FISB ratings, or from SRS when FISB is not among the requested stats.
    pub sos: Option<SosMode>,
}
impl Metrics {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn compute<P: DataProvider + ?Sized>(&self, provider: &P, stats: &[Stat]) -> Result<MetricsTable, RatingError> {
        self.config.validate().map_err(UsageError::from)?;
        if let Some(mode) = self.sos {
            if mode.requires_ratings() && !stats.iter().any(|stat| matches!(stat, Stat::Fisb | Stat::Srs)) {
                return Err(UsageError::RatingsRequired("sos average/scaled").into());
            }
        }

        let mut table = MetricsTable::new(provider.teams().iter().map(|team| team.name().to_string()));
        let mut fisb_ratings = None;
        let mut srs_ratings = None;
        for stat in stats {
            debug!("computing {stat}");
            match stat {
                Stat::Fisb => {
                    let outcome = if self.bootstrap {
                        fisb::rate_bootstrap(provider, &self.config.fisb, &self.config.bootstrap)?
                    } else {
                        fisb::rate(provider, &self.config.fisb)?
                    };
                    table.push_ratings("FISB", &outcome.ratings, Some(outcome.home_field_advantage));
                    fisb_ratings = Some(outcome.ratings);
                }
                Stat::MaxL => {
                    let outcome = ml::rate(provider, &self.config.fixed_point)?;
                    table.note_convergence("Max-L", &outcome.convergence);
                    table.push_ratings("Max-L", &outcome.ratings, None);
                }
                Stat::Srs => {
                    let outcome = srs::rate(provider, SrsMode::Normal, &self.config.fixed_point)?;
                    table.note_convergence("SRS", &outcome.convergence);
                    table.push_ratings("SRS", &outcome.srs, None);
                    table.push_ratings("MOV", &outcome.mov, None);
                    table.push_ratings("SOS", &outcome.sos, None);
                    srs_ratings = Some(outcome.srs);
                }
                Stat::Pythagorean => self.pythagorean(provider, Formula::Classic, &mut table)?,
                Stat::Pythagenport => self.pythagorean(provider, Formula::Pythagenport, &mut table)?,
                Stat::Pythagenpat => self.pythagorean(provider, Formula::Pythagenpat, &mut table)?,
            }
        }

        if let Some(mode) = self.sos {
            let ratings = fisb_ratings.as_ref().or(srs_ratings.as_ref());
            let values = sos::calculate(provider, mode, ratings)?;
            table.push_ratings(format!("SOS ({mode})"), &values, None);
        }

        info!(
            "computed {} columns for {} teams",
            table.columns.len(),
            provider.teams().len()
        );
        Ok(table)
    }

    fn pythagorean<P: DataProvider + ?Sized>(
        &self,
        provider: &P,
        formula: Formula,
        table: &mut MetricsTable,
    ) -> Result<(), RatingError> {
        let outcome = PythagoreanModel::new(formula, Fit::Optimise { initial: None })
            .with_defaults(self.config.pythagorean.clone())
            .evaluate(provider)?;
        let heading = match formula {
            Formula::Classic => "Pythagorean",
            Formula::Pythagenport => "Pythagenport",
            Formula::PythagenportFo => "Pythagenport FO",
            Formula::Pythagenpat => "Pythagenpat",
        };
        if let Some(optimisation) = &outcome.optimisation {
            if !optimisation.converged {
                table.notes.push(format!(
                    "{heading} fit stopped after {} steps with params {:?}",
                    optimisation.steps, outcome.params
                ));
            }
        }
        table.push_ratings(heading, &outcome.predictions, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use crate::fixed_point::FixedPointConfig;
    use crate::testing::round_robin;

    use super::*;

    #[test]
    fn parse_list() {
        assert_eq!(
            vec![Stat::Fisb, Stat::Srs, Stat::Pythagenpat],
            Stat::parse_list("fisb, srs,pat,fisb").unwrap()
        );
        assert_eq!(
            UsageError::UnknownMode {
                kind: "stat",
                value: "elo".into(),
                expected: "fisb|ml|srs|pyth|port|pat",
            },
            Stat::parse_list("fisb,elo").unwrap_err()
        );
        assert_eq!("ml", Stat::MaxL.to_string());
    }

    #[test]
    fn fisb_and_srs() {
        let table = Metrics::default()
            .compute(&round_robin(), &[Stat::Fisb, Stat::Srs])
            .unwrap();
        assert_eq!(vec!["A", "B", "C", "D", HOME_FIELD_ADVANTAGE], table.rows());
        let headings: Vec<_> = table.columns().iter().map(|column| column.heading.as_str()).collect();
        assert_eq!(vec!["FISB", "SRS", "MOV", "SOS"], headings);
        assert_float_absolute_eq!(1.85, table.get("A", "FISB").unwrap(), 0.1);
        assert_float_absolute_eq!(-1.4, table.get(HOME_FIELD_ADVANTAGE, "FISB").unwrap(), 0.1);
        assert_float_absolute_eq!(5.5, table.get("D", "SRS").unwrap(), 0.05);
        assert_eq!(None, table.get(HOME_FIELD_ADVANTAGE, "SRS"));
        assert_eq!(None, table.get("A", "Max-L"));
        assert!(table.notes().is_empty());
    }

    #[test]
    fn sos_from_fisb() {
        let metrics = Metrics {
            sos: Some(SosMode::Average),
            ..Metrics::default()
        };
        let table = metrics.compute(&round_robin(), &[Stat::Fisb]).unwrap();
        assert_float_absolute_eq!(-0.62, table.get("A", "SOS (average)").unwrap(), 0.01);
        assert_eq!(None, table.get(HOME_FIELD_ADVANTAGE, "SOS (average)"));
    }

    #[test]
    fn sos_bcs_needs_no_ratings() {
        let metrics = Metrics {
            sos: Some(SosMode::Bcs),
            ..Metrics::default()
        };
        let table = metrics.compute(&round_robin(), &[Stat::MaxL]).unwrap();
        assert_float_absolute_eq!(0.53, table.get("B", "SOS (bcs)").unwrap(), 0.005);
    }

    #[test]
    fn sos_average_without_ratings() {
        let metrics = Metrics {
            sos: Some(SosMode::Scaled),
            ..Metrics::default()
        };
        let err = metrics.compute(&round_robin(), &[Stat::MaxL]).unwrap_err();
        assert!(matches!(err, RatingError::Usage(UsageError::RatingsRequired(_))));
    }

    #[test]
    fn convergence_notes() {
        let metrics = Metrics::new(Config {
            fixed_point: FixedPointConfig {
                tolerance: 1e-12,
                max_iterations: 2,
            },
            ..Config::default()
        });
        let table = metrics.compute(&round_robin(), &[Stat::MaxL, Stat::Srs]).unwrap();
        assert_eq!(2, table.notes().len());
        assert!(table.notes()[0].starts_with("Max-L did not converge within 2 iterations"));
        assert!(table.column("Max-L").unwrap()[0].is_some());
    }

    #[test]
    fn pythagorean_columns() {
        let table = Metrics::default()
            .compute(&round_robin(), &[Stat::Pythagorean, Stat::Pythagenpat])
            .unwrap();
        for heading in ["Pythagorean", "Pythagenpat"] {
            let values = table.column(heading).unwrap();
            assert_eq!(5, values.len());
            for value in &values[..4] {
                let value = value.unwrap();
                assert!(value > 0.0 && value < 1.0);
            }
            assert_eq!(None, values[4]);
        }
    }
}
