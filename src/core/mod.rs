//! Core business logic modules

pub mod market;
pub mod outcome;

// Re-export commonly used types
pub use market::{parse_market_label, BttsSide, MatchSide, OverUnderSide, ParsedMarket};
pub use outcome::{bet_profit, evaluate_outcome, BetOutcome};
