//! TOML configuration
//!
//! ```toml
//! [data]
//! dir = "data"
//!
//! [simulation]
//! stake = 100.0
//! odd_min = 1.01
//! odd_max = 10.0
//! initial_bankroll = 0.0
//! aggregation = "max"
//!
//! [selection]
//! leagues = ["Premier League"]
//! seasons = [2024, 2025]
//! markets = ["Over/Under 2.5 - Over"]
//! ```
//!
//! Every table is optional; missing values fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backtesting::simulator::SimulationParams;
use crate::data::csv_loader::{MATCHES_FILE, ODDS_FILE};
use crate::data::odds::{AggregationMethod, Selection};
use crate::error::{validate_initial_bankroll, validate_odd_bounds, validate_stake, ConfigError};

pub const DEFAULT_CONFIG_FILE: &str = "footy.toml";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    /// Overrides `<dir>/matches.csv`
    pub matches_path: Option<PathBuf>,
    /// Overrides `<dir>/odds.csv`
    pub odds_path: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            matches_path: None,
            odds_path: None,
        }
    }
}

impl DataConfig {
    pub fn matches_path(&self) -> PathBuf {
        self.matches_path
            .clone()
            .unwrap_or_else(|| self.dir.join(MATCHES_FILE))
    }

    pub fn odds_path(&self) -> PathBuf {
        self.odds_path.clone().unwrap_or_else(|| self.dir.join(ODDS_FILE))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub stake: f64,
    pub odd_min: f64,
    pub odd_max: f64,
    pub initial_bankroll: f64,
    pub aggregation: AggregationMethod,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            stake: params.stake,
            odd_min: params.odd_min,
            odd_max: params.odd_max,
            initial_bankroll: params.initial_bankroll,
            aggregation: AggregationMethod::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stake(self.stake)?;
        validate_odd_bounds(self.odd_min, self.odd_max)?;
        validate_initial_bankroll(self.initial_bankroll)?;
        Ok(())
    }

    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            stake: self.stake,
            odd_min: self.odd_min,
            odd_max: self.odd_max,
            initial_bankroll: self.initial_bankroll,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.matches_path(), PathBuf::from("data/matches.csv"));
        assert_eq!(config.data.odds_path(), PathBuf::from("data/odds.csv"));
        assert_eq!(config.simulation.params(), SimulationParams::default());
        assert_eq!(config.simulation.aggregation, AggregationMethod::Max);
        assert!(config.selection.markets.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
            [data]
            dir = "fixtures"
            odds_path = "other/odds.csv"

            [simulation]
            stake = 50.0
            odd_min = 1.5
            odd_max = 3.0
            aggregation = "mean"

            [selection]
            leagues = ["Serie A"]
            seasons = [2024]
            markets = ["Match Winner - Home"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data.matches_path(), PathBuf::from("fixtures/matches.csv"));
        assert_eq!(config.data.odds_path(), PathBuf::from("other/odds.csv"));
        assert_eq!(config.simulation.stake, 50.0);
        assert_eq!(config.simulation.initial_bankroll, 0.0);
        assert_eq!(config.simulation.aggregation, AggregationMethod::Mean);
        assert_eq!(config.selection.seasons, vec![2024]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_simulation_rejected() {
        let err = Config::from_toml("[simulation]\nodd_min = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml("[simulation]\nstake = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml() {
        let err = Config::from_toml("[simulation\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[simulation]\nstake = 25.0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.simulation.stake, 25.0);

        let missing = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing, Config::default());
    }
}
