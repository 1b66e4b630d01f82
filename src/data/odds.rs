//! Odds aggregation, match join and selection filters

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::{AggregatedOdd, MarketRow, MatchRecord, OddRecord};

/// How quotes from several bookmakers collapse into one odd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    /// Best available price
    #[default]
    Max,
    Mean,
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMethod::Max => write!(f, "max"),
            AggregationMethod::Mean => write!(f, "mean"),
        }
    }
}

impl FromStr for AggregationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max" => Ok(AggregationMethod::Max),
            "mean" => Ok(AggregationMethod::Mean),
            other => Err(format!("Unknown aggregation method '{}', use 'max' or 'mean'", other)),
        }
    }
}

/// Collapse quotes to one odd per (match_id, market)
///
/// Quotes without a numeric odd are ignored; groups left without any
/// disappear. Output is ordered by (match_id, market).
pub fn aggregate_odds(odds: &[OddRecord], method: AggregationMethod) -> Vec<AggregatedOdd> {
    let mut grouped: BTreeMap<(i64, &str), Vec<f64>> = BTreeMap::new();
    for record in odds {
        if let Some(odd) = record.odd.filter(|o| o.is_finite()) {
            grouped
                .entry((record.match_id, record.market.as_str()))
                .or_default()
                .push(odd);
        }
    }

    let aggregated: Vec<AggregatedOdd> = grouped
        .into_iter()
        .map(|((match_id, market), values)| {
            let odd = match method {
                AggregationMethod::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
            };
            AggregatedOdd {
                match_id,
                market: market.to_string(),
                odd,
            }
        })
        .collect();

    debug!(
        "Aggregated {} quotes into {} odds ({})",
        odds.len(),
        aggregated.len(),
        method
    );
    aggregated
}

/// Left join aggregated odds onto matches
///
/// Odds whose match is not loaded keep an id-only match reference.
pub fn join_matches(odds: &[AggregatedOdd], matches: &[MatchRecord]) -> Vec<MarketRow> {
    let index: HashMap<i64, &MatchRecord> = matches.iter().map(|m| (m.match_id, m)).collect();

    let mut unmatched = 0usize;
    let rows: Vec<MarketRow> = odds
        .iter()
        .map(|odd| {
            let fixture = match index.get(&odd.match_id) {
                Some(m) => (*m).clone(),
                None => {
                    unmatched += 1;
                    MatchRecord::unmatched(odd.match_id)
                }
            };
            MarketRow::new(fixture, odd.market.clone(), Some(odd.odd))
        })
        .collect();

    info!(
        "Joined {} odds onto {} matches ({} without match data)",
        rows.len(),
        matches.len(),
        unmatched
    );
    rows
}

/// Aggregate then join, the usual path from raw tables to simulator rows
pub fn build_market_rows(
    matches: &[MatchRecord],
    odds: &[OddRecord],
    method: AggregationMethod,
) -> Vec<MarketRow> {
    join_matches(&aggregate_odds(odds, method), matches)
}

/// Distinct filter values present in the data, sorted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableFilters {
    pub leagues: Vec<String>,
    pub seasons: Vec<i32>,
    pub markets: Vec<String>,
}

impl AvailableFilters {
    pub fn from_rows(rows: &[MarketRow]) -> Self {
        let leagues: BTreeSet<&str> = rows.iter().filter_map(|r| r.fixture.league.as_deref()).collect();
        let seasons: BTreeSet<i32> = rows.iter().filter_map(|r| r.fixture.season).collect();
        let markets: BTreeSet<&str> = rows.iter().map(|r| r.market.as_str()).collect();

        Self {
            leagues: leagues.into_iter().map(String::from).collect(),
            seasons: seasons.into_iter().collect(),
            markets: markets.into_iter().map(String::from).collect(),
        }
    }
}

/// User selection of leagues, seasons and markets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub leagues: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<i32>,
    #[serde(default)]
    pub markets: Vec<String>,
}

impl Selection {
    /// First five leagues, last two seasons, first three markets
    pub fn default_from(available: &AvailableFilters) -> Self {
        let seasons_from = available.seasons.len().saturating_sub(2);
        Self {
            leagues: available.leagues.iter().take(5).cloned().collect(),
            seasons: available.seasons[seasons_from..].to_vec(),
            markets: available.markets.iter().take(3).cloned().collect(),
        }
    }

    /// Fill the empty parts of this selection from the defaults
    pub fn or_defaults(self, available: &AvailableFilters) -> Self {
        let defaults = Self::default_from(available);
        Self {
            leagues: if self.leagues.is_empty() { defaults.leagues } else { self.leagues },
            seasons: if self.seasons.is_empty() { defaults.seasons } else { self.seasons },
            markets: if self.markets.is_empty() { defaults.markets } else { self.markets },
        }
    }

    /// A run needs at least one league, one season and one market
    pub fn is_runnable(&self) -> bool {
        !self.leagues.is_empty() && !self.seasons.is_empty() && !self.markets.is_empty()
    }

    pub fn matches(&self, row: &MarketRow) -> bool {
        let league_ok = row
            .fixture
            .league
            .as_ref()
            .is_some_and(|l| self.leagues.contains(l));
        let season_ok = row.fixture.season.is_some_and(|s| self.seasons.contains(&s));
        league_ok && season_ok && self.markets.contains(&row.market)
    }

    pub fn filter(&self, rows: &[MarketRow]) -> Vec<MarketRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(match_id: i64, market: &str, odd: Option<f64>, bookmaker: &str) -> OddRecord {
        OddRecord {
            match_id,
            market: market.to_string(),
            odd,
            bookmaker: Some(bookmaker.to_string()),
        }
    }

    fn fixture(match_id: i64, league: &str, season: i32) -> MatchRecord {
        MatchRecord {
            league: Some(league.to_string()),
            season: Some(season),
            ..MatchRecord::unmatched(match_id)
        }
    }

    fn create_test_quotes() -> Vec<OddRecord> {
        vec![
            quote(2, "Match Winner - Home", Some(2.0), "Bet365"),
            quote(2, "Match Winner - Home", Some(2.4), "Betfair"),
            quote(1, "Both Teams To Score - Yes", Some(1.8), "Bet365"),
            quote(1, "Both Teams To Score - Yes", None, "Betfair"),
            quote(3, "Over/Under 2.5 - Over", None, "Pinnacle"),
        ]
    }

    #[test]
    fn test_aggregate_max() {
        let agg = aggregate_odds(&create_test_quotes(), AggregationMethod::Max);

        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].match_id, 1);
        assert_eq!(agg[0].odd, 1.8);
        assert_eq!(agg[1].match_id, 2);
        assert_eq!(agg[1].odd, 2.4);
    }

    #[test]
    fn test_aggregate_mean() {
        let agg = aggregate_odds(&create_test_quotes(), AggregationMethod::Mean);

        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].odd, 1.8);
        assert!((agg[1].odd - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_aggregation_method_from_str() {
        assert_eq!("max".parse::<AggregationMethod>(), Ok(AggregationMethod::Max));
        assert_eq!("MEAN".parse::<AggregationMethod>(), Ok(AggregationMethod::Mean));
        assert!("median".parse::<AggregationMethod>().is_err());
        assert_eq!(AggregationMethod::default(), AggregationMethod::Max);
    }

    #[test]
    fn test_join_is_left_join() {
        let agg = aggregate_odds(&create_test_quotes(), AggregationMethod::Max);
        let matches = vec![fixture(2, "Serie A", 2024)];

        let rows = join_matches(&agg, &matches);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fixture, MatchRecord::unmatched(1));
        assert_eq!(rows[1].fixture.league.as_deref(), Some("Serie A"));
        assert_eq!(rows[1].odd, Some(2.4));
    }

    #[test]
    fn test_available_filters_sorted() {
        let rows = vec![
            MarketRow::new(fixture(1, "Serie A", 2024), "b", Some(2.0)),
            MarketRow::new(fixture(2, "La Liga", 2022), "a", Some(2.0)),
            MarketRow::new(fixture(3, "Serie A", 2023), "b", Some(2.0)),
            MarketRow::new(MatchRecord::unmatched(4), "c", Some(2.0)),
        ];

        let available = AvailableFilters::from_rows(&rows);

        assert_eq!(available.leagues, vec!["La Liga", "Serie A"]);
        assert_eq!(available.seasons, vec![2022, 2023, 2024]);
        assert_eq!(available.markets, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_selection() {
        let available = AvailableFilters {
            leagues: (1..=7).map(|i| format!("L{}", i)).collect(),
            seasons: vec![2022, 2023, 2024, 2025],
            markets: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };

        let selection = Selection::default_from(&available);

        assert_eq!(selection.leagues.len(), 5);
        assert_eq!(selection.seasons, vec![2024, 2025]);
        assert_eq!(selection.markets, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_selection_small_data() {
        let available = AvailableFilters {
            leagues: vec!["L".into()],
            seasons: vec![2024],
            markets: Vec::new(),
        };

        let selection = Selection::default_from(&available);
        assert_eq!(selection.seasons, vec![2024]);
        assert!(!selection.is_runnable());
    }

    #[test]
    fn test_or_defaults_keeps_explicit_parts() {
        let available = AvailableFilters {
            leagues: vec!["A".into(), "B".into()],
            seasons: vec![2023, 2024],
            markets: vec!["m".into()],
        };
        let selection = Selection {
            leagues: vec!["B".into()],
            ..Default::default()
        }
        .or_defaults(&available);

        assert_eq!(selection.leagues, vec!["B"]);
        assert_eq!(selection.seasons, vec![2023, 2024]);
        assert_eq!(selection.markets, vec!["m"]);
    }

    #[test]
    fn test_selection_filter() {
        let rows = vec![
            MarketRow::new(fixture(1, "Serie A", 2024), "m", Some(2.0)),
            MarketRow::new(fixture(2, "Serie A", 2023), "m", Some(2.0)),
            MarketRow::new(fixture(3, "La Liga", 2024), "m", Some(2.0)),
            MarketRow::new(fixture(4, "Serie A", 2024), "other", Some(2.0)),
            MarketRow::new(MatchRecord::unmatched(5), "m", Some(2.0)),
        ];
        let selection = Selection {
            leagues: vec!["Serie A".into()],
            seasons: vec![2024],
            markets: vec!["m".into()],
        };

        let filtered = selection.filter(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].fixture.match_id, 1);
    }
}
