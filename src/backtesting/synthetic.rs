//! Synthetic Match Data Generation
//!
//! Fabricate matches and bookmaker odds for demos when no historical
//! database is available. Output is deterministic for a given seed.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::csv_loader::{MATCHES_FILE, ODDS_FILE};
use crate::data::export::write_json_rows;
use crate::error::DataError;
use crate::models::{MatchRecord, OddRecord};

/// League name, teams, matches per season
const LEAGUES: [(&str, &[&str], usize); 6] = [
    (
        "Premier League",
        &[
            "Arsenal", "Chelsea", "Liverpool", "Manchester City", "Manchester United", "Tottenham",
            "Leicester City", "West Ham", "Everton", "Aston Villa", "Newcastle", "Wolves",
            "Crystal Palace", "Southampton", "Brighton", "Brentford", "Fulham", "Bournemouth",
            "Nottingham Forest", "Sheffield United",
        ],
        380,
    ),
    (
        "Bundesliga",
        &[
            "Bayern Munich", "Borussia Dortmund", "RB Leipzig", "Leverkusen", "Eintracht Frankfurt",
            "Stuttgart", "Wolfsburg", "Freiburg", "Hoffenheim", "Union Berlin", "Mainz", "Augsburg",
            "Hertha Berlin", "Bochum", "Darmstadt", "Nürnberg", "Kaiserslautern", "Paderborn",
        ],
        306,
    ),
    (
        "Serie A",
        &[
            "Juventus", "Inter", "Milan", "Napoli", "Roma", "Lazio", "Atalanta", "Fiorentina", "Torino",
            "Sassuolo", "Udinese", "Sampdoria", "Verona", "Empoli", "Monza", "Salernitana",
            "Cremonese", "Lecce", "Bologna", "Como", "Spezia",
        ],
        380,
    ),
    (
        "La Liga",
        &[
            "Real Madrid", "Barcelona", "Atletico Madrid", "Sevilla", "Valencia", "Real Sociedad",
            "Villarreal", "Athletic Bilbao", "Celta Vigo", "Granada", "Getafe", "Mallorca", "Osasuna",
            "Rayo Vallecano", "Real Betis", "Espanyol", "Almeria", "Cadiz", "Elche", "Girona",
        ],
        380,
    ),
    (
        "Brasileirão Série A",
        &[
            "Palmeiras", "Flamengo", "Corinthians", "São Paulo", "Grêmio", "Internacional",
            "Fluminense", "Cruzeiro", "Vasco", "Bahia", "Sport", "Ceará", "Vitória",
            "Atlético Mineiro", "Santos", "Botafogo", "RB Bragantino", "Mirassol", "Juventude",
            "Fortaleza",
        ],
        380,
    ),
    (
        "Brasileirão Série B",
        &[
            "Cuiaba", "Chapecoense", "CRB", "Guarani", "Vila Nova", "Ponte Preta", "Náutico", "Avaí",
            "CSA", "Ituano", "Londrina", "Operário-PR", "Sampaio Corrêa", "Tombense", "Brusque",
            "Novorizontino", "Figueirense", "Botafogo-SP", "Athletic MG", "Coritiba",
        ],
        380,
    ),
];

/// Market name and its outcomes with (low, high) odd ranges
const MARKETS: [(&str, &[(&str, f64, f64)]); 7] = [
    ("Match Winner", &[("Home", 1.3, 3.5), ("Draw", 2.5, 4.0), ("Away", 1.5, 4.0)]),
    ("Both Teams To Score", &[("Yes", 1.5, 2.2), ("No", 1.6, 2.4)]),
    ("Over/Under 1.5", &[("Over", 1.6, 2.5), ("Under", 1.5, 2.4)]),
    ("Over/Under 2.5", &[("Over", 1.6, 2.5), ("Under", 1.5, 2.4)]),
    ("Over/Under 3.5", &[("Over", 1.6, 2.5), ("Under", 1.5, 2.4)]),
    ("Asian Handicap 0.5", &[("Home", 1.7, 2.3), ("Away", 1.7, 2.3)]),
    ("Asian Handicap 1.0", &[("Home", 1.7, 2.3), ("Away", 1.7, 2.3)]),
];

const BOOKMAKERS: [&str; 4] = ["Bet365", "Betfair", "Pinnacle", "1xBet"];

const MAX_GOALS: u32 = 4;

/// Generator settings
#[derive(Debug, Clone)]
pub struct MockDataConfig {
    pub seed: u64,
    pub seasons: Vec<i32>,
    /// Overrides the per-league match count when set
    pub matches_per_season: Option<usize>,
}

impl Default for MockDataConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            seasons: vec![2022, 2023, 2024, 2025],
            matches_per_season: None,
        }
    }
}

/// Generated tables
#[derive(Debug, Clone, PartialEq)]
pub struct MockData {
    pub matches: Vec<MatchRecord>,
    pub odds: Vec<OddRecord>,
}

/// Synthetic match and odds generator
pub struct MockDataGenerator {
    config: MockDataConfig,
}

impl MockDataGenerator {
    pub fn new(config: MockDataConfig) -> Self {
        Self { config }
    }

    /// Generate every league and season
    pub fn generate(&self) -> MockData {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut matches = Vec::new();
        let mut odds = Vec::new();

        for (league_idx, (league, teams, default_count)) in LEAGUES.iter().enumerate() {
            for &season in &self.config.seasons {
                let count = self.config.matches_per_season.unwrap_or(*default_count);
                info!("Generating {} - {} ({} matches)", league, season, count);

                let base_id = (league_idx as i64 + 1) * 1_000_000 + i64::from(season) * 10_000;
                let start = NaiveDate::from_ymd_opt(season, 7, 1).and_then(|d| d.and_hms_opt(0, 0, 0));

                for idx in 0..count {
                    let match_id = base_id + idx as i64;
                    let date = start.map(|s| s + Duration::days(idx as i64 * 2));

                    let mut pair = teams.choose_multiple(&mut rng, 2);
                    let home = pair.next().map(|t| t.to_string());
                    let away = pair.next().map(|t| t.to_string());

                    matches.push(MatchRecord {
                        match_id,
                        league: Some(league.to_string()),
                        season: Some(season),
                        date,
                        home_team: home,
                        away_team: away,
                        home_goals: Some(rng.gen_range(0..=MAX_GOALS)),
                        away_goals: Some(rng.gen_range(0..=MAX_GOALS)),
                    });

                    for (market, outcomes) in MARKETS.iter() {
                        for &(outcome, low, high) in outcomes.iter() {
                            let odd = round2(rng.gen_range(low..=high));
                            let label = format!("{} - {}", market, outcome);
                            for bookmaker in BOOKMAKERS {
                                odds.push(OddRecord {
                                    match_id,
                                    market: label.clone(),
                                    odd: Some(odd),
                                    bookmaker: Some(bookmaker.to_string()),
                                });
                            }
                        }
                    }
                }
            }
        }

        info!("Generated {} matches and {} odds", matches.len(), odds.len());
        MockData { matches, odds }
    }

    /// Generate and write `matches.csv` and `odds.csv` into `dir`
    pub fn write_csv<P: AsRef<Path>>(&self, dir: P) -> Result<(PathBuf, PathBuf), DataError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| DataError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let data = self.generate();

        let matches_path = dir.join(MATCHES_FILE);
        let match_rows: Vec<serde_json::Value> = data.matches.iter().map(match_row).collect();
        write_json_rows(&matches_path, &MATCH_COLUMNS, &match_rows)?;

        let odds_path = dir.join(ODDS_FILE);
        let odd_rows: Vec<serde_json::Value> = data.odds.iter().map(odd_row).collect();
        write_json_rows(&odds_path, &ODD_COLUMNS, &odd_rows)?;

        Ok((matches_path, odds_path))
    }
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::new(MockDataConfig::default())
    }
}

const MATCH_COLUMNS: [&str; 8] = [
    "match_id",
    "league",
    "season",
    "date",
    "home_team",
    "away_team",
    "home_goals",
    "away_goals",
];

const ODD_COLUMNS: [&str; 4] = ["match_id", "market", "odd", "bookmaker"];

fn match_row(m: &MatchRecord) -> serde_json::Value {
    serde_json::json!({
        "match_id": m.match_id,
        "league": m.league,
        "season": m.season,
        "date": m.date.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        "home_team": m.home_team,
        "away_team": m.away_team,
        "home_goals": m.home_goals,
        "away_goals": m.away_goals,
    })
}

fn odd_row(o: &OddRecord) -> serde_json::Value {
    serde_json::json!({
        "match_id": o.match_id,
        "market": o.market,
        "odd": o.odd,
        "bookmaker": o.bookmaker,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
