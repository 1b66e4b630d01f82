//! Backtest Metrics
//!
//! Calculate ROI, hit rate, drawdown and the comparative breakdowns shown
//! next to the bankroll curves.

use super::simulator::{BetRecord, MarketSimulation};
use crate::core::outcome::BetOutcome;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Per-market evaluation metrics
///
/// Every field is always present; the ones that cannot be computed are None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub market: String,
    /// Rows that passed the odds filters
    pub records: usize,
    pub bets_placed: usize,
    pub total_profit: f64,
    pub total_staked: f64,
    pub roi: f64,
    pub hit_rate: Option<f64>,
    /// Deepest drawdown, <= 0
    pub max_drawdown: f64,
    pub avg_odd: Option<f64>,
}

impl MarketMetrics {
    /// Column order used by the metrics table and its CSV export
    pub const COLUMNS: [&'static str; 9] = [
        "market",
        "records",
        "bets_placed",
        "total_profit",
        "total_staked",
        "roi",
        "hit_rate",
        "max_drawdown",
        "avg_odd",
    ];

    /// Neutral row for a market without usable data
    pub fn empty(market: &str) -> Self {
        Self {
            market: market.to_string(),
            records: 0,
            bets_placed: 0,
            total_profit: 0.0,
            total_staked: 0.0,
            roi: 0.0,
            hit_rate: None,
            max_drawdown: 0.0,
            avg_odd: None,
        }
    }
}

/// Calculate metrics from simulated rows
pub fn calculate_metrics(market: &str, bets: &[BetRecord], stake: f64) -> MarketMetrics {
    if bets.is_empty() {
        return MarketMetrics::empty(market);
    }

    let records = bets.len();
    let bets_placed = bets.iter().filter(|b| b.outcome.is_placed()).count();
    let wins = bets.iter().filter(|b| b.outcome == BetOutcome::Won).count();

    let total_profit: f64 = bets.iter().map(|b| b.profit).sum();
    let total_staked = stake * bets_placed as f64;

    let roi = if total_staked > 0.0 {
        total_profit / total_staked
    } else {
        0.0
    };

    let hit_rate = if bets_placed > 0 {
        Some(wins as f64 / bets_placed as f64)
    } else {
        None
    };

    let bankroll: Vec<f64> = bets.iter().map(|b| b.bankroll).collect();
    let max_drawdown = drawdown_series(&bankroll)
        .into_iter()
        .fold(0.0_f64, f64::min);

    let avg_odd = Some(bets.iter().map(|b| b.odd).sum::<f64>() / records as f64);

    MarketMetrics {
        market: market.to_string(),
        records,
        bets_placed,
        total_profit,
        total_staked,
        roi,
        hit_rate,
        max_drawdown,
        avg_odd,
    }
}

/// Bankroll minus its running maximum at each point
pub fn drawdown_series(bankroll: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    bankroll
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            value - peak
        })
        .collect()
}

/// Order a metrics table by total profit, best first
pub fn sort_by_profit(table: &mut [MarketMetrics]) {
    table.sort_by(|a, b| {
        b.total_profit
            .partial_cmp(&a.total_profit)
            .unwrap_or(Ordering::Equal)
    });
}

/// Total profit per league (rows) and market (columns)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitPivot {
    pub leagues: Vec<String>,
    pub markets: Vec<String>,
    /// values[league][market]
    pub values: Vec<Vec<f64>>,
}

impl ProfitPivot {
    pub fn get(&self, league: &str, market: &str) -> Option<f64> {
        let row = self.leagues.iter().position(|l| l == league)?;
        let col = self.markets.iter().position(|m| m == market)?;
        Some(self.values[row][col])
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty() || self.markets.is_empty()
    }
}

/// Pivot simulated profit by league and market
///
/// Markets without bets and rows without a league are left out; missing
/// (league, market) cells are 0.
pub fn profit_by_league(simulations: &[MarketSimulation]) -> ProfitPivot {
    let markets: Vec<&MarketSimulation> = simulations.iter().filter(|s| !s.is_empty()).collect();

    let leagues: BTreeSet<&str> = markets
        .iter()
        .flat_map(|s| s.bets.iter().filter_map(|b| b.league.as_deref()))
        .collect();
    let leagues: Vec<String> = leagues.into_iter().map(String::from).collect();

    let mut values = vec![vec![0.0; markets.len()]; leagues.len()];
    for (col, sim) in markets.iter().enumerate() {
        for bet in &sim.bets {
            if let Some(league) = bet.league.as_deref() {
                if let Ok(row) = leagues.binary_search_by(|l| l.as_str().cmp(league)) {
                    values[row][col] += bet.profit;
                }
            }
        }
    }

    ProfitPivot {
        leagues,
        markets: markets.iter().map(|s| s.market.clone()).collect(),
        values,
    }
}

/// Five-number summary of the odds quoted for a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsDistribution {
    pub market: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize odds with linearly interpolated quartiles; None when no finite odd
pub fn odds_distribution(market: &str, odds: &[f64]) -> Option<OddsDistribution> {
    let mut sorted: Vec<f64> = odds.iter().copied().filter(|o| o.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    Some(OddsDistribution {
        market: market.to_string(),
        count: sorted.len(),
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Analysis results by dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub stake: f64,
    pub profit: f64,
    pub roi: f64,
}

/// Analyze placed bets by odds range
pub fn analyze_by_odds_range(bets: &[BetRecord], stake: f64) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<&str, Vec<&BetRecord>> = BTreeMap::new();
    for bet in bets.iter().filter(|b| b.outcome.is_placed()) {
        let key = if bet.odd < 1.5 {
            "low (<1.5)"
        } else if bet.odd < 2.5 {
            "mid (1.5-2.5)"
        } else {
            "high (>2.5)"
        };
        grouped.entry(key).or_default().push(bet);
    }

    grouped
        .into_iter()
        .map(|(key, group)| {
            let total = group.len();
            let wins = group.iter().filter(|b| b.outcome == BetOutcome::Won).count();
            let staked = stake * total as f64;
            let profit: f64 = group.iter().map(|b| b.profit).sum();

            DimensionAnalysis {
                key: key.to_string(),
                bets: total,
                wins,
                hit_rate: wins as f64 / total as f64,
                stake: staked,
                profit,
                roi: if staked > 0.0 { profit / staked } else { 0.0 },
            }
        })
        .collect()
}
