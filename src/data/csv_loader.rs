//! CSV data loading for the matches and odds tables
//!
//! Every column is read as text and coerced here, so a dirty value only
//! affects its own cell: non-numeric odds and goals become None, rows with an
//! unusable `match_id` are skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::DataError;
use crate::models::{MatchRecord, OddRecord};

pub const MATCHES_FILE: &str = "matches.csv";
pub const ODDS_FILE: &str = "odds.csv";

/// Read a CSV file with every column typed as string
fn read_as_text(path: &Path) -> Result<DataFrame, DataError> {
    std::fs::metadata(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!("Read {} rows from {:?}", df.height(), path);
    Ok(df)
}

fn required_column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    column: &'static str,
) -> Result<&'a StringChunked, DataError> {
    let series = df
        .column(column)
        .map_err(|_| DataError::MissingColumn { table, column })?;
    Ok(series.str()?)
}

fn optional_column<'a>(df: &'a DataFrame, column: &str) -> Result<Option<&'a StringChunked>, DataError> {
    match df.column(column) {
        Ok(series) => Ok(Some(series.str()?)),
        Err(_) => Ok(None),
    }
}

fn cell<'a>(col: Option<&'a StringChunked>, i: usize) -> Option<&'a str> {
    col.and_then(|c| c.get(i))
}

/// Load the matches table
pub fn load_matches<P: AsRef<Path>>(csv_path: P) -> Result<Vec<MatchRecord>, DataError> {
    let df = read_as_text(csv_path.as_ref())?;

    let id_col = required_column(&df, "matches", "match_id")?;
    let league_col = optional_column(&df, "league")?;
    let season_col = optional_column(&df, "season")?;
    let date_col = optional_column(&df, "date")?;
    let home_col = optional_column(&df, "home_team")?;
    let away_col = optional_column(&df, "away_team")?;
    let home_goals_col = optional_column(&df, "home_goals")?;
    let away_goals_col = optional_column(&df, "away_goals")?;

    let mut matches = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for i in 0..df.height() {
        let match_id = match id_col.get(i).and_then(parse_id) {
            Some(id) => id,
            None => {
                skipped += 1;
                continue;
            }
        };

        matches.push(MatchRecord {
            match_id,
            league: cell(league_col, i).and_then(parse_text),
            season: cell(season_col, i).and_then(parse_season),
            date: cell(date_col, i).and_then(parse_date),
            home_team: cell(home_col, i).and_then(parse_text),
            away_team: cell(away_col, i).and_then(parse_text),
            home_goals: cell(home_goals_col, i).and_then(parse_goals),
            away_goals: cell(away_goals_col, i).and_then(parse_goals),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} match rows without a valid match_id", skipped);
    }

    Ok(matches)
}

/// Load the raw (per-bookmaker) odds table
pub fn load_odds<P: AsRef<Path>>(csv_path: P) -> Result<Vec<OddRecord>, DataError> {
    let df = read_as_text(csv_path.as_ref())?;

    let id_col = required_column(&df, "odds", "match_id")?;
    let market_col = required_column(&df, "odds", "market")?;
    let odd_col = required_column(&df, "odds", "odd")?;
    let bookmaker_col = optional_column(&df, "bookmaker")?;

    let mut odds = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for i in 0..df.height() {
        let (match_id, market) = match (
            id_col.get(i).and_then(parse_id),
            market_col.get(i).and_then(parse_text),
        ) {
            (Some(id), Some(market)) => (id, market),
            _ => {
                skipped += 1;
                continue;
            }
        };

        odds.push(OddRecord {
            match_id,
            market,
            odd: odd_col.get(i).and_then(parse_odd),
            bookmaker: cell(bookmaker_col, i).and_then(parse_text),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} odds rows without match_id or market", skipped);
    }

    Ok(odds)
}

/// Load both tables from a data directory
pub fn load_tables<P: AsRef<Path>>(data_dir: P) -> Result<(Vec<MatchRecord>, Vec<OddRecord>), DataError> {
    let dir = data_dir.as_ref();
    let matches = load_matches(dir.join(MATCHES_FILE))?;
    let odds = load_odds(dir.join(ODDS_FILE))?;
    Ok((matches, odds))
}

pub fn parse_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Integer that may have been written as a float ("1000.0")
fn parse_integral(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v: f64 = trimmed.parse().ok()?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

pub fn parse_id(raw: &str) -> Option<i64> {
    parse_integral(raw)
}

pub fn parse_season(raw: &str) -> Option<i32> {
    parse_integral(raw).and_then(|v| i32::try_from(v).ok())
}

/// Goals are truncated like an integer cast; negatives and values past `u32::MAX` are rejected
pub fn parse_goals(raw: &str) -> Option<u32> {
    let v: f64 = raw.trim().parse().ok()?;
    if v.is_finite() && v >= 0.0 && v.trunc() <= f64::from(u32::MAX) {
        Some(v.trunc() as u32)
    } else {
        None
    }
}

pub fn parse_odd(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_id("1000"), Some(1000));
        assert_eq!(parse_id("1000.0"), Some(1000));
        assert_eq!(parse_id("10.5"), None);
        assert_eq!(parse_id("abc"), None);

        assert_eq!(parse_goals("2"), Some(2));
        assert_eq!(parse_goals("3.0"), Some(3));
        assert_eq!(parse_goals("-1"), None);
        assert_eq!(parse_goals("n/a"), None);
        assert_eq!(parse_goals("4294967295"), Some(u32::MAX));
        assert_eq!(parse_goals("4294967296"), None);
        assert_eq!(parse_goals("1e12"), None);

        assert_eq!(parse_odd(" 1.85 "), Some(1.85));
        assert_eq!(parse_odd("NaN"), None);
        assert_eq!(parse_odd("suspended"), None);

        assert_eq!(parse_season("2024"), Some(2024));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(parse_date("2023-07-01T00:00:00"), Some(expected));
        assert_eq!(parse_date("2023-07-01 00:00:00"), Some(expected));
        assert_eq!(parse_date("2023-07-01"), Some(expected));
        assert_eq!(parse_date("2023-07-01T00:00:00+00:00"), Some(expected));
        assert_eq!(parse_date("2023-07-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_date("01/07/2023"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_load_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            MATCHES_FILE,
            "match_id,league,season,date,home_team,away_team,home_goals,away_goals\n\
             1,Serie A,2024,2024-08-01T00:00:00,Roma,Lazio,2,1\n\
             2,Serie A,2024,not a date,Milan,Inter,,x\n\
             bad,Serie A,2024,2024-08-03,Napoli,Torino,0,0\n",
        );

        let matches = load_matches(&path).unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].match_id, 1);
        assert_eq!(matches[0].league.as_deref(), Some("Serie A"));
        assert_eq!(matches[0].season, Some(2024));
        assert!(matches[0].date.is_some());
        assert_eq!(matches[0].score(), (2, 1));

        assert!(matches[1].date.is_none());
        assert_eq!(matches[1].home_goals, None);
        assert_eq!(matches[1].away_goals, None);
        assert_eq!(matches[1].score(), (0, 0));
    }

    #[test]
    fn test_load_odds_coerces_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            ODDS_FILE,
            "match_id,market,odd,bookmaker\n\
             1,Match Winner - Home,2.10,Bet365\n\
             1,Match Winner - Home,n/a,Betfair\n\
             1,,1.90,Pinnacle\n",
        );

        let odds = load_odds(&path).unwrap();

        assert_eq!(odds.len(), 2);
        assert_eq!(odds[0].odd, Some(2.10));
        assert_eq!(odds[0].bookmaker.as_deref(), Some("Bet365"));
        assert_eq!(odds[1].odd, None);
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), ODDS_FILE, "match_id,odd\n1,2.0\n");

        let err = load_odds(&path).unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn {
                table: "odds",
                column: "market"
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_matches(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_load_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            MATCHES_FILE,
            "match_id,league,season,date,home_team,away_team,home_goals,away_goals\n\
             7,La Liga,2023,2023-09-01,Getafe,Elche,1,1\n",
        );
        write_file(
            dir.path(),
            ODDS_FILE,
            "match_id,market,odd,bookmaker\n7,Match Winner - Draw,3.2,Bet365\n",
        );

        let (matches, odds) = load_tables(dir.path()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(odds.len(), 1);
        assert_eq!(odds[0].match_id, matches[0].match_id);
    }
}
