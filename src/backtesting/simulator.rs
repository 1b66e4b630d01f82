//! Backtest Simulator
//!
//! Flat-stake simulation of a single market over historical matches.

use super::metrics::{calculate_metrics, MarketMetrics};
use crate::core::market::{parse_market_label, ParsedMarket};
use crate::core::outcome::{bet_profit, evaluate_outcome, BetOutcome};
use crate::models::MarketRow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Individual simulated row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    pub match_id: i64,
    pub date: Option<NaiveDateTime>,
    pub league: Option<String>,
    pub season: Option<i32>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_goals: u32,
    pub away_goals: u32,
    pub market: String,
    pub odd: f64,
    pub outcome: BetOutcome,
    pub profit: f64,
    /// Initial bankroll plus cumulative profit up to and including this row
    pub bankroll: f64,
    /// Bankroll minus its running maximum, always <= 0
    pub drawdown: f64,
}

/// Simulation parameters shared by every market of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub stake: f64,
    pub odd_min: f64,
    pub odd_max: f64,
    pub initial_bankroll: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            stake: 100.0,
            odd_min: 1.01,
            odd_max: 10.0,
            initial_bankroll: 0.0,
        }
    }
}

impl SimulationParams {
    fn accepts(&self, odd: f64) -> bool {
        odd >= self.odd_min && odd <= self.odd_max
    }
}

/// Result of simulating one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSimulation {
    pub market: String,
    pub parsed: ParsedMarket,
    pub bets: Vec<BetRecord>,
    /// None when no row survived the odds filters
    pub metrics: Option<MarketMetrics>,
}

impl MarketSimulation {
    fn empty(market: &str) -> Self {
        Self {
            market: market.to_string(),
            parsed: parse_market_label(market),
            bets: Vec::new(),
            metrics: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Metrics, or the neutral row used for markets without data
    pub fn metrics_or_empty(&self) -> MarketMetrics {
        self.metrics
            .clone()
            .unwrap_or_else(|| MarketMetrics::empty(&self.market))
    }

    /// (date, bankroll) points in bet order
    pub fn bankroll_curve(&self) -> Vec<(Option<NaiveDateTime>, f64)> {
        self.bets.iter().map(|b| (b.date, b.bankroll)).collect()
    }

    pub fn drawdown_series(&self) -> Vec<f64> {
        self.bets.iter().map(|b| b.drawdown).collect()
    }

    pub fn total_profit(&self) -> f64 {
        self.bets.iter().map(|b| b.profit).sum()
    }
}

/// Dated rows first in ascending order, undated rows after them
fn compare_dates(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Simulate flat-stake betting on `market_label` over `rows`
///
/// Rows with a missing or non-finite odd, or an odd outside
/// `[odd_min, odd_max]`, are dropped. The remaining rows are settled in
/// chronological order (stable on ties). Never fails: unusable input gives
/// an empty simulation without metrics.
pub fn simulate(rows: &[MarketRow], market_label: &str, params: &SimulationParams) -> MarketSimulation {
    let mut usable: Vec<(&MarketRow, f64)> = rows
        .iter()
        .filter_map(|row| row.odd.filter(|o| o.is_finite()).map(|o| (row, o)))
        .filter(|(_, odd)| params.accepts(*odd))
        .collect();

    if usable.is_empty() {
        return MarketSimulation::empty(market_label);
    }

    // sort_by is stable, equal dates keep input order
    usable.sort_by(|a, b| compare_dates(a.0.fixture.date, b.0.fixture.date));

    let parsed = parse_market_label(market_label);

    let mut bets = Vec::with_capacity(usable.len());
    let mut bankroll = params.initial_bankroll;
    let mut peak = f64::NEG_INFINITY;

    for (row, odd) in usable {
        let (home_goals, away_goals) = row.fixture.score();
        let outcome = evaluate_outcome(&parsed, home_goals, away_goals);
        let profit = bet_profit(outcome, odd, params.stake);

        bankroll += profit;
        peak = peak.max(bankroll);

        bets.push(BetRecord {
            match_id: row.fixture.match_id,
            date: row.fixture.date,
            league: row.fixture.league.clone(),
            season: row.fixture.season,
            home_team: row.fixture.home_team.clone(),
            away_team: row.fixture.away_team.clone(),
            home_goals,
            away_goals,
            market: row.market.clone(),
            odd,
            outcome,
            profit,
            bankroll,
            drawdown: bankroll - peak,
        });
    }

    let metrics = calculate_metrics(market_label, &bets, params.stake);

    MarketSimulation {
        market: market_label.to_string(),
        parsed,
        bets,
        metrics: Some(metrics),
    }
}
