//! Backtesting engine for football betting markets

pub mod metrics;
pub mod runner;
pub mod simulator;
pub mod synthetic;

pub use metrics::{calculate_metrics, MarketMetrics, OddsDistribution, ProfitPivot};
pub use runner::{run_backtest, BacktestReport};
pub use simulator::{simulate, BetRecord, MarketSimulation, SimulationParams};
pub use synthetic::{MockDataConfig, MockDataGenerator};
