//! Footy - Football betting market backtests
//!
//! This library provides:
//! - Market label parsing (Over/Under, Both Teams To Score, Match Winner)
//! - Bet settlement against final scores
//! - Flat-stake simulation with bankroll and drawdown tracking
//! - Per-market metrics and comparative reports
//! - CSV loading, odds aggregation and export
//!
//! # Example
//!
//! ```no_run
//! use footy::backtesting::{run_backtest, SimulationParams};
//! use footy::data::{build_market_rows, load_tables, AggregationMethod, AvailableFilters, Selection};
//!
//! let (matches, odds) = load_tables("data").unwrap();
//! let rows = build_market_rows(&matches, &odds, AggregationMethod::Max);
//!
//! let selection = Selection::default().or_defaults(&AvailableFilters::from_rows(&rows));
//! let report = run_backtest(&rows, &selection, &SimulationParams::default());
//!
//! for metrics in &report.metrics_table {
//!     println!("{}: {:.2}", metrics.market, metrics.total_profit);
//! }
//! ```

pub mod backtesting;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use backtesting::{run_backtest, BacktestReport, MarketMetrics, SimulationParams};
pub use config::Config;
pub use core::{parse_market_label, BetOutcome, ParsedMarket};
pub use error::{ConfigError, DataError};
pub use models::{MarketRow, MatchRecord, OddRecord};
