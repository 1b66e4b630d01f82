use polars::prelude::PolarsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or writing tabular data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read CSV: {0}")]
    Polars(#[from] PolarsError),

    #[error("Required column '{column}' missing from {table}")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("Failed to write CSV {path:?}: {message}")]
    Csv { path: PathBuf, message: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Lowest odd accepted as a lower bound
pub const MIN_ODD_BOUND: f64 = 1.01;

/// Validation functions
pub fn validate_stake(stake: f64) -> Result<(), ConfigError> {
    if !stake.is_finite() || stake <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "Stake must be a positive number, got {}",
            stake
        )));
    }
    Ok(())
}

pub fn validate_odd_bounds(odd_min: f64, odd_max: f64) -> Result<(), ConfigError> {
    if !odd_min.is_finite() || odd_min < MIN_ODD_BOUND {
        return Err(ConfigError::Invalid(format!(
            "Minimum odd must be at least {}, got {}",
            MIN_ODD_BOUND, odd_min
        )));
    }
    if !odd_max.is_finite() || odd_max < odd_min {
        return Err(ConfigError::Invalid(format!(
            "Maximum odd must be >= minimum odd ({}), got {}",
            odd_min, odd_max
        )));
    }
    Ok(())
}

pub fn validate_initial_bankroll(initial_bankroll: f64) -> Result<(), ConfigError> {
    if !initial_bankroll.is_finite() {
        return Err(ConfigError::Invalid(format!(
            "Initial bankroll must be finite, got {}",
            initial_bankroll
        )));
    }
    Ok(())
}
