use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Structure representing the application configuration. Contains pathing, naming and geometry parameters.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub geometry_path: PathBuf,
    pub micromegas_readout_path: PathBuf,
    pub veto_readout_path: PathBuf,
    pub full_readout_path: PathBuf,
    pub readout_names: Vec<String>,
    pub veto_readout_name: String,
    pub alias_map_path: Option<PathBuf>,
    pub veto_volume_expression: String,
    pub light_guide_expression: String,
    pub boundary_delta: f64,
    pub module_width: f64,
    pub module_thickness: f64,
    pub monte_carlo_samples: u64,
    pub monte_carlo_half_extent: f64,
    pub monte_carlo_seed: Option<u64>,
}

impl Default for Config {
    /// Generate a new Config object. Paths are placeholders, geometry parameters are the IAXO defaults
    fn default() -> Self {
        Self {
            geometry_path: PathBuf::from("None"),
            micromegas_readout_path: PathBuf::from("readouts/readoutMicromegas.yml"),
            veto_readout_path: PathBuf::from("readouts/readoutVetoSystem.yml"),
            full_readout_path: PathBuf::from("readouts/readoutComplete.yml"),
            readout_names: vec![
                String::from("iaxoD0Readout"),
                String::from("iaxoD1Readout"),
            ],
            veto_readout_name: String::from("vetoSystemReadout"),
            alias_map_path: None,
            veto_volume_expression: String::from("^scintillatorVolume"),
            light_guide_expression: String::from("^scintillatorLightGuideVolume"),
            boundary_delta: 1.0,
            module_width: 200.0,
            module_thickness: 50.0,
            monte_carlo_samples: 5_000_000,
            monte_carlo_half_extent: 2000.0,
            monte_carlo_seed: None,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        let config = serde_yaml::from_str::<Self>(&yaml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values which can't be expressed through the type system
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.readout_names.is_empty() {
            return Err(ConfigError::NoReadoutNames);
        }
        if !(self.boundary_delta >= 0.0) {
            return Err(ConfigError::BadDelta(self.boundary_delta));
        }
        // the sampled range spans twice the half extent
        let extent = self.monte_carlo_half_extent;
        if !(extent >= 0.0) || !(2.0 * extent).is_finite() {
            return Err(ConfigError::BadExtent(extent));
        }
        Ok(())
    }

    pub fn run_monte_carlo(&self) -> bool {
        self.monte_carlo_samples > 0
    }
}
