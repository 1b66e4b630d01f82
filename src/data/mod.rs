//! Data loading, odds aggregation and export

pub mod csv_loader;
pub mod export;
pub mod odds;

// Re-export commonly used types
pub use csv_loader::{load_matches, load_odds, load_tables};
pub use export::export_report;
pub use odds::{build_market_rows, AggregationMethod, AvailableFilters, Selection};
