//! Multi-market backtest runner
//!
//! Runs the simulator once per selected market and gathers the comparative
//! outputs: metrics table, bankroll/drawdown curves, league pivot and odds
//! distributions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::metrics::{odds_distribution, profit_by_league, sort_by_profit, MarketMetrics, OddsDistribution, ProfitPivot};
use super::simulator::{simulate, MarketSimulation, SimulationParams};
use crate::data::odds::Selection;
use crate::models::MarketRow;

/// Result of a backtest across markets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// One entry per selected market, in selection order
    pub simulations: Vec<MarketSimulation>,
    /// One row per selected market, best total profit first
    pub metrics_table: Vec<MarketMetrics>,
    /// Odds quoted per market over the selected rows, before odds bounds
    pub odds_distributions: Vec<OddsDistribution>,
    /// Rows left after the league/season/market selection
    pub selected_rows: usize,
}

impl BacktestReport {
    pub fn empty() -> Self {
        Self {
            simulations: Vec::new(),
            metrics_table: Vec::new(),
            odds_distributions: Vec::new(),
            selected_rows: 0,
        }
    }

    pub fn simulation(&self, market: &str) -> Option<&MarketSimulation> {
        self.simulations.iter().find(|s| s.market == market)
    }

    /// Whether any market produced bets
    pub fn has_results(&self) -> bool {
        self.simulations.iter().any(|s| !s.is_empty())
    }

    pub fn profit_pivot(&self) -> ProfitPivot {
        profit_by_league(&self.simulations)
    }
}

impl Default for BacktestReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// Run a backtest for every market of `selection`
pub fn run_backtest(rows: &[MarketRow], selection: &Selection, params: &SimulationParams) -> BacktestReport {
    if !selection.is_runnable() {
        warn!("Selection needs at least one league, one season and one market");
        return BacktestReport::empty();
    }

    let selected = selection.filter(rows);
    info!(
        "Running {} markets over {} selected rows",
        selection.markets.len(),
        selected.len()
    );

    let mut simulations = Vec::with_capacity(selection.markets.len());
    let mut metrics_table = Vec::with_capacity(selection.markets.len());
    let mut odds_distributions = Vec::new();

    for market in &selection.markets {
        let market_rows: Vec<MarketRow> = selected.iter().filter(|r| &r.market == market).cloned().collect();

        let quoted: Vec<f64> = market_rows.iter().filter_map(|r| r.odd).collect();
        if let Some(dist) = odds_distribution(market, &quoted) {
            odds_distributions.push(dist);
        }

        let sim = simulate(&market_rows, market, params);
        if sim.is_empty() {
            debug!("No usable rows for market '{}'", market);
        } else if !sim.parsed.is_bettable() {
            warn!("Market '{}' could not be parsed, no bets placed", market);
        }

        metrics_table.push(sim.metrics_or_empty());
        simulations.push(sim);
    }

    sort_by_profit(&mut metrics_table);

    BacktestReport {
        simulations,
        metrics_table,
        odds_distributions,
        selected_rows: selected.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchRecord;
    use chrono::NaiveDate;

    fn row(match_id: i64, league: &str, day: u32, goals: (u32, u32), market: &str, odd: f64) -> MarketRow {
        let fixture = MatchRecord {
            match_id,
            league: Some(league.to_string()),
            season: Some(2024),
            date: NaiveDate::from_ymd_opt(2024, 8, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
            home_team: Some("Home FC".to_string()),
            away_team: Some("Away FC".to_string()),
            home_goals: Some(goals.0),
            away_goals: Some(goals.1),
        };
        MarketRow::new(fixture, market, Some(odd))
    }

    const HOME: &str = "Match Winner - Home";
    const OVER: &str = "Over/Under 2.5 - Over";
    const SPECIAL: &str = "Special Market X";

    fn create_test_rows() -> Vec<MarketRow> {
        vec![
            row(1, "Serie A", 1, (2, 1), HOME, 2.0),
            row(1, "Serie A", 1, (2, 1), OVER, 1.9),
            row(2, "La Liga", 2, (0, 0), HOME, 2.5),
            row(2, "La Liga", 2, (0, 0), OVER, 2.1),
            row(3, "Bundesliga", 3, (3, 3), HOME, 1.7),
            row(4, "Serie A", 4, (1, 0), SPECIAL, 3.0),
        ]
    }

    fn selection(markets: &[&str]) -> Selection {
        Selection {
            leagues: vec!["Serie A".into(), "La Liga".into()],
            seasons: vec![2024],
            markets: markets.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_run_backtest() {
        let rows = create_test_rows();
        let report = run_backtest(&rows, &selection(&[HOME, OVER]), &SimulationParams::default());

        assert_eq!(report.selected_rows, 4);
        assert_eq!(report.simulations.len(), 2);

        let home = report.simulation(HOME).unwrap();
        assert_eq!(home.bets.len(), 2);
        assert!((home.total_profit() - 0.0).abs() < 1e-9);

        let over = report.simulation(OVER).unwrap();
        assert!((over.total_profit() - (-10.0)).abs() < 1e-9);

        // Sorted by profit, best first
        assert_eq!(report.metrics_table[0].market, HOME);
        assert_eq!(report.metrics_table[1].market, OVER);
    }

    #[test]
    fn test_market_without_data_gets_neutral_row() {
        let rows = create_test_rows();
        let report = run_backtest(&rows, &selection(&[HOME, "Both Teams To Score - Yes"]), &SimulationParams::default());

        assert_eq!(report.metrics_table.len(), 2);
        let btts = report
            .metrics_table
            .iter()
            .find(|m| m.market == "Both Teams To Score - Yes")
            .unwrap();
        assert_eq!(*btts, MarketMetrics::empty("Both Teams To Score - Yes"));
        assert!(report.simulation("Both Teams To Score - Yes").unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_market_runs_without_bets() {
        let rows = create_test_rows();
        let report = run_backtest(&rows, &selection(&[SPECIAL]), &SimulationParams::default());

        let metrics = &report.metrics_table[0];
        assert_eq!(metrics.records, 1);
        assert_eq!(metrics.bets_placed, 0);
        assert_eq!(metrics.total_profit, 0.0);
    }

    #[test]
    fn test_empty_selection_runs_nothing() {
        let rows = create_test_rows();
        let report = run_backtest(&rows, &selection(&[]), &SimulationParams::default());

        assert_eq!(report, BacktestReport::empty());
        assert!(!report.has_results());
    }

    #[test]
    fn test_report_pivot_and_distributions() {
        let rows = create_test_rows();
        let report = run_backtest(&rows, &selection(&[HOME, OVER]), &SimulationParams::default());

        let pivot = report.profit_pivot();
        assert_eq!(pivot.leagues, vec!["La Liga", "Serie A"]);
        assert_eq!(pivot.get("Serie A", HOME), Some(100.0));
        assert_eq!(pivot.get("La Liga", HOME), Some(-100.0));

        assert_eq!(report.odds_distributions.len(), 2);
        let home_dist = &report.odds_distributions[0];
        assert_eq!(home_dist.market, HOME);
        assert_eq!(home_dist.count, 2);
        assert_eq!(home_dist.min, 2.0);
        assert_eq!(home_dist.max, 2.5);
    }

    #[test]
    fn test_run_is_deterministic() {
        let rows = create_test_rows();
        let sel = selection(&[HOME, OVER, SPECIAL]);
        let params = SimulationParams::default();

        assert_eq!(run_backtest(&rows, &sel, &params), run_backtest(&rows, &sel, &params));
    }
}
