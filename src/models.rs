use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Finished match loaded from the matches table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: i64,
    pub league: Option<String>,
    pub season: Option<i32>,
    pub date: Option<NaiveDateTime>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

impl MatchRecord {
    /// Match reference with nothing but an id (odds whose match is not loaded)
    pub fn unmatched(match_id: i64) -> Self {
        Self {
            match_id,
            league: None,
            season: None,
            date: None,
            home_team: None,
            away_team: None,
            home_goals: None,
            away_goals: None,
        }
    }

    /// Final score, missing goals counted as 0
    pub fn score(&self) -> (u32, u32) {
        (self.home_goals.unwrap_or(0), self.away_goals.unwrap_or(0))
    }
}

/// Single bookmaker quote from the odds table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddRecord {
    pub match_id: i64,
    pub market: String,
    /// None when the raw value was missing or not numeric
    pub odd: Option<f64>,
    pub bookmaker: Option<String>,
}

/// One quote per (match, market) after bookmaker aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedOdd {
    pub match_id: i64,
    pub market: String,
    pub odd: f64,
}

/// Joined (match, market, odd) row fed to the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub fixture: MatchRecord,
    pub market: String,
    pub odd: Option<f64>,
}

impl MarketRow {
    pub fn new(fixture: MatchRecord, market: impl Into<String>, odd: Option<f64>) -> Self {
        Self {
            fixture,
            market: market.into(),
            odd,
        }
    }
}
