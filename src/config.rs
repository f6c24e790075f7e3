//! Tunable settings of the rating systems, loadable from a JSON file.
//!
//! Every section is optional in the file; absent sections and fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::file::read_json;
use crate::fisb::{BootstrapConfig, FisbConfig};
use crate::fixed_point::FixedPointConfig;
use crate::pythag::PythagoreanDefaults;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fixed_point: FixedPointConfig,
    pub fisb: FisbConfig,
    pub bootstrap: BootstrapConfig,
    pub pythagorean: PythagoreanDefaults,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.fixed_point.validate()?;
        self.fisb.validate()?;
        self.bootstrap.validate()?;
        self.pythagorean.validate()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let config: Config = read_json(path)?;
        config.validate()?;
        debug!("loaded config: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::file::FromJsonFile;

    use super::*;

    #[test]
    fn partial_json() {
        let config: Config = serde_json::from_str(
            r#"{"fixed_point": {"max_iterations": 250}, "bootstrap": {"workers": 8}}"#,
        )
        .unwrap();
        assert_eq!(250, config.fixed_point.max_iterations);
        assert_eq!(FixedPointConfig::default().tolerance, config.fixed_point.tolerance);
        assert_eq!(8, config.bootstrap.workers);
        assert_eq!(BootstrapConfig::default().iterations, config.bootstrap.iterations);
        assert_eq!(FisbConfig::default(), config.fisb);
        config.validate().unwrap();
    }

    #[test]
    fn pythagorean_section() {
        let config: Config = serde_json::from_str(
            r#"{"pythagorean": {"pythagenport": [1.2, 0.7], "optimiser": {"max_steps": 50}}}"#,
        )
        .unwrap();
        assert_eq!(vec![1.2, 0.7], config.pythagorean.pythagenport);
        assert_eq!(PythagoreanDefaults::default().classic, config.pythagorean.classic);
        assert_eq!(50, config.pythagorean.optimiser.max_steps);
    }

    #[test]
    fn invalid() {
        let config: Config = serde_json::from_str(r#"{"bootstrap": {"iterations": 0}}"#).unwrap();
        assert_eq!(
            "at least one bootstrap iteration must be specified",
            config.validate().unwrap_err().to_string()
        );
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("gridiron-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"fisb": {"singular_tolerance": 1e-8}}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(1e-8, config.fisb.singular_tolerance);
        let same = Config::from_json_file(&path).unwrap();
        assert_eq!(config, same);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_missing_file() {
        assert!(Config::load("/nonexistent/gridiron.json").is_err());
    }
}
