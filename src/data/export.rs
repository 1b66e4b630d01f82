//! CSV export of backtest results

use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backtesting::metrics::MarketMetrics;
use crate::backtesting::runner::BacktestReport;
use crate::backtesting::simulator::BetRecord;
use crate::error::DataError;

pub const METRICS_FILE: &str = "metrics_backtest.csv";

/// Column order of the per-market detail export
pub const BET_COLUMNS: [&str; 11] = [
    "date",
    "league",
    "season",
    "home_team",
    "away_team",
    "market",
    "odd",
    "outcome",
    "profit",
    "bankroll",
    "drawdown",
];

fn csv_field(value: &Value) -> String {
    match value {
        Value::String(s) => {
            if s.contains(',') || s.contains('"') || s.contains('\n') {
                format!("\"{}\"", s.replace('"', "\"\""))
            } else {
                s.clone()
            }
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write JSON objects as CSV rows with a fixed header
pub fn write_json_rows(path: &Path, headers: &[&str], rows: &[Value]) -> Result<(), DataError> {
    let io_err = |source| DataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", headers.join(",")).map_err(io_err)?;
    for row in rows {
        let values: Vec<String> = headers.iter().map(|h| csv_field(&row[*h])).collect();
        writeln!(writer, "{}", values.join(",")).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    Ok(())
}

fn metrics_row(metrics: &MarketMetrics) -> Result<Value, DataError> {
    serde_json::to_value(metrics).map_err(|e| DataError::Csv {
        path: PathBuf::from(METRICS_FILE),
        message: e.to_string(),
    })
}

fn bet_row(bet: &BetRecord) -> Value {
    json!({
        "date": bet.date.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        "league": bet.league,
        "season": bet.season,
        "home_team": bet.home_team,
        "away_team": bet.away_team,
        "market": bet.market,
        "odd": bet.odd,
        "outcome": bet.outcome.as_str(),
        "profit": bet.profit,
        "bankroll": bet.bankroll,
        "drawdown": bet.drawdown,
    })
}

/// Write the metrics table; null metrics become empty cells
pub fn write_metrics_csv<P: AsRef<Path>>(table: &[MarketMetrics], path: P) -> Result<(), DataError> {
    let rows = table.iter().map(metrics_row).collect::<Result<Vec<_>, _>>()?;
    write_json_rows(path.as_ref(), &MarketMetrics::COLUMNS, &rows)
}

/// Write the detailed rows of one market
pub fn write_bets_csv<P: AsRef<Path>>(bets: &[BetRecord], path: P) -> Result<(), DataError> {
    let rows: Vec<Value> = bets.iter().map(bet_row).collect();
    write_json_rows(path.as_ref(), &BET_COLUMNS, &rows)
}

/// File-name friendly version of a market label
pub fn sanitize_market(market: &str) -> String {
    let mut out = String::with_capacity(market.len());
    let mut last_underscore = false;
    for c in market.chars() {
        if c.is_ascii_alphanumeric() || c == '.' {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}

/// Export a whole report into `dir`, returning the files written
pub fn export_report<P: AsRef<Path>>(report: &BacktestReport, dir: P) -> Result<Vec<PathBuf>, DataError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();

    let metrics_path = dir.join(METRICS_FILE);
    write_metrics_csv(&report.metrics_table, &metrics_path)?;
    written.push(metrics_path);

    for sim in report.simulations.iter().filter(|s| !s.is_empty()) {
        let path = dir.join(format!("bets_{}.csv", sanitize_market(&sim.market)));
        write_bets_csv(&sim.bets, &path)?;
        written.push(path);
    }

    info!("Exported {} files to {:?}", written.len(), dir);
    Ok(written)
}
