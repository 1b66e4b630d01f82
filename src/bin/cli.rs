//! Footy CLI - Command-line interface for football market backtests

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use footy::backtesting::metrics::analyze_by_odds_range;
use footy::backtesting::{self, BacktestReport, MockDataConfig, MockDataGenerator, SimulationParams};
use footy::config::{Config, DEFAULT_CONFIG_FILE};
use footy::core::parse_market_label;
use footy::data::export::export_report;
use footy::data::{build_market_rows, load_matches, load_odds, AggregationMethod, AvailableFilters, Selection};
use footy::models::MarketRow;

#[derive(Parser)]
#[command(name = "footy")]
#[command(author, version, about = "Football betting market backtests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding matches.csv and odds.csv (overrides the config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest flat-stake bets on the selected markets
    Backtest {
        /// League to include (repeatable)
        #[arg(short, long = "league")]
        leagues: Vec<String>,

        /// Season to include (repeatable)
        #[arg(short, long = "season")]
        seasons: Vec<i32>,

        /// Market label to simulate (repeatable)
        #[arg(short, long = "market")]
        markets: Vec<String>,

        /// Stake per bet
        #[arg(long)]
        stake: Option<f64>,

        /// Minimum accepted odd
        #[arg(long)]
        odd_min: Option<f64>,

        /// Maximum accepted odd
        #[arg(long)]
        odd_max: Option<f64>,

        /// Bankroll before the first bet
        #[arg(long)]
        initial_bankroll: Option<f64>,

        /// Bookmaker aggregation: max or mean
        #[arg(long)]
        aggregation: Option<AggregationMethod>,

        /// Write metrics and per-market bets as CSV into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// List the leagues, seasons and markets present in the data
    Filters,

    /// Show how a market label is interpreted
    Parse {
        /// Market label, e.g. "Over/Under 2.5 - Over"
        label: String,
    },

    /// Write synthetic matches.csv and odds.csv
    Generate {
        /// Output directory (defaults to the data directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Season to generate (repeatable, defaults to 2022-2025)
        #[arg(long = "season")]
        seasons: Vec<i32>,

        /// Matches per league and season
        #[arg(long)]
        matches_per_season: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    println!("{}", "Footy CLI v0.1.0".cyan().bold());
    println!();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
        config.data.matches_path = None;
        config.data.odds_path = None;
    }

    if cli.interactive {
        run_interactive(&config)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Backtest {
                leagues,
                seasons,
                markets,
                stake,
                odd_min,
                odd_max,
                initial_bankroll,
                aggregation,
                export_dir,
            } => {
                let sim = &mut config.simulation;
                sim.stake = stake.unwrap_or(sim.stake);
                sim.odd_min = odd_min.unwrap_or(sim.odd_min);
                sim.odd_max = odd_max.unwrap_or(sim.odd_max);
                sim.initial_bankroll = initial_bankroll.unwrap_or(sim.initial_bankroll);
                sim.aggregation = aggregation.unwrap_or(sim.aggregation);
                sim.validate().context("Invalid simulation settings")?;

                let selection = merge_selection(
                    &config.selection,
                    Selection {
                        leagues,
                        seasons,
                        markets,
                    },
                );
                run_backtest(&config, selection, export_dir.as_deref())?;
            }
            Commands::Filters => {
                list_filters(&config)?;
            }
            Commands::Parse { label } => {
                run_parse(&label)?;
            }
            Commands::Generate {
                output,
                seed,
                seasons,
                matches_per_season,
            } => {
                let output = output.unwrap_or_else(|| config.data.dir.clone());
                run_generate(&output, seed, seasons, matches_per_season)?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

/// Command-line values win over the config file, part by part
fn merge_selection(base: &Selection, flags: Selection) -> Selection {
    Selection {
        leagues: if flags.leagues.is_empty() { base.leagues.clone() } else { flags.leagues },
        seasons: if flags.seasons.is_empty() { base.seasons.clone() } else { flags.seasons },
        markets: if flags.markets.is_empty() { base.markets.clone() } else { flags.markets },
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb
}

fn load_rows(config: &Config) -> Result<Vec<MarketRow>> {
    let pb = spinner("Loading matches and odds...");

    let matches_path = config.data.matches_path();
    let odds_path = config.data.odds_path();

    let matches = load_matches(&matches_path)
        .with_context(|| format!("Failed to load matches from {:?}", matches_path))?;
    let odds = load_odds(&odds_path).with_context(|| format!("Failed to load odds from {:?}", odds_path))?;

    let rows = build_market_rows(&matches, &odds, config.simulation.aggregation);

    pb.finish_and_clear();
    Ok(rows)
}

fn run_backtest(config: &Config, selection: Selection, export_dir: Option<&Path>) -> Result<()> {
    let rows = load_rows(config)?;
    let available = AvailableFilters::from_rows(&rows);
    let selection = selection.or_defaults(&available);
    let params = config.simulation.params();

    println!("{}", "Running backtest...".green());
    println!("Leagues: {}", selection.leagues.join(", "));
    println!(
        "Seasons: {}",
        selection.seasons.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!("Markets: {}", selection.markets.join(", "));
    println!(
        "Stake: {:.2} | Odds: {:.2}-{:.2} | Initial bankroll: {:.2} | Aggregation: {}",
        params.stake, params.odd_min, params.odd_max, params.initial_bankroll, config.simulation.aggregation
    );
    println!();

    if !selection.is_runnable() {
        println!(
            "{}",
            "Select at least one league, one season and one market.".yellow()
        );
        return Ok(());
    }

    let report = backtesting::run_backtest(&rows, &selection, &params);
    print_report(&report, &params);

    if let Some(dir) = export_dir {
        let written = export_report(&report, dir).with_context(|| format!("Failed to export to {:?}", dir))?;
        println!();
        println!("{} {} files written to {:?}", "→".green(), written.len(), dir);
    }

    Ok(())
}

fn print_report(report: &BacktestReport, params: &SimulationParams) {
    println!("{} ({} rows selected)", "Metrics by Market:".yellow().bold(), report.selected_rows);
    println!(
        "{:<32} {:>7} {:>6} {:>12} {:>8} {:>8} {:>12} {:>7}",
        "Market", "Records", "Bets", "Profit", "ROI", "Hit", "Max DD", "Avg Odd"
    );
    println!("{}", "-".repeat(100));

    for m in &report.metrics_table {
        let profit = format!("{:.2}", m.total_profit);
        let profit = if m.total_profit > 0.0 {
            profit.green()
        } else if m.total_profit < 0.0 {
            profit.red()
        } else {
            profit.normal()
        };

        println!(
            "{:<32} {:>7} {:>6} {:>12} {:>7.1}% {:>8} {:>12.2} {:>7}",
            truncate_label(&m.market, 32),
            m.records,
            m.bets_placed,
            profit,
            m.roi * 100.0,
            m.hit_rate
                .map(|h| format!("{:.1}%", h * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            m.max_drawdown,
            m.avg_odd.map(|o| format!("{:.2}", o)).unwrap_or_else(|| "-".to_string()),
        );
    }

    if !report.has_results() {
        println!();
        println!("{}", "No bets for this selection.".yellow());
        return;
    }

    let pivot = report.profit_pivot();
    if !pivot.is_empty() {
        println!("\n{}", "Profit by League:".yellow().bold());
        print!("{:<24}", "League");
        for market in &pivot.markets {
            print!(" {:>16}", truncate_label(market, 16));
        }
        println!();
        println!("{}", "-".repeat(24 + 17 * pivot.markets.len()));
        for league in &pivot.leagues {
            print!("{:<24}", truncate_label(league, 24));
            for market in &pivot.markets {
                match pivot.get(league, market) {
                    Some(v) => print!(" {:>16.2}", v),
                    None => print!(" {:>16}", "-"),
                }
            }
            println!();
        }
    }

    if !report.odds_distributions.is_empty() {
        println!("\n{}", "Odds Distribution:".yellow().bold());
        println!(
            "{:<32} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
            "Market", "Count", "Min", "Q1", "Median", "Q3", "Max"
        );
        println!("{}", "-".repeat(75));
        for d in &report.odds_distributions {
            println!(
                "{:<32} {:>6} {:>6.2} {:>6.2} {:>6.2} {:>6.2} {:>6.2}",
                truncate_label(&d.market, 32),
                d.count,
                d.min,
                d.q1,
                d.median,
                d.q3,
                d.max
            );
        }
    }

    println!("\n{}", "Analysis by Odds Range:".yellow().bold());
    println!(
        "{:<32} {:>14} {:>6} {:>6} {:>10} {:>12} {:>8}",
        "Market", "Range", "Bets", "Wins", "Hit Rate", "Profit", "ROI"
    );
    println!("{}", "-".repeat(95));
    for sim in report.simulations.iter().filter(|s| !s.is_empty()) {
        for a in analyze_by_odds_range(&sim.bets, params.stake) {
            println!(
                "{:<32} {:>14} {:>6} {:>6} {:>9.1}% {:>12.2} {:>7.1}%",
                truncate_label(&sim.market, 32),
                a.key,
                a.bets,
                a.wins,
                a.hit_rate * 100.0,
                a.profit,
                a.roi * 100.0
            );
        }
    }

    println!("\n{}", "Final Bankroll:".yellow().bold());
    for sim in report.simulations.iter().filter(|s| !s.is_empty()) {
        let last = sim.bets.last().map(|b| b.bankroll).unwrap_or(params.initial_bankroll);
        let worst = sim.drawdown_series().into_iter().fold(0.0, f64::min);
        println!(
            "{:<32} {:>12.2} (worst drawdown {:.2})",
            truncate_label(&sim.market, 32),
            last,
            worst
        );
    }
}

fn list_filters(config: &Config) -> Result<()> {
    let rows = load_rows(config)?;
    let available = AvailableFilters::from_rows(&rows);

    println!("{} ({})", "Leagues:".yellow().bold(), available.leagues.len());
    for league in &available.leagues {
        println!("  {}", league);
    }

    println!("\n{} ({})", "Seasons:".yellow().bold(), available.seasons.len());
    for season in &available.seasons {
        println!("  {}", season);
    }

    println!("\n{} ({})", "Markets:".yellow().bold(), available.markets.len());
    for market in &available.markets {
        let parsed = parse_market_label(market);
        let tag = if parsed.is_bettable() {
            parsed.to_string().normal()
        } else {
            "not simulated".dimmed()
        };
        println!("  {:<40} {}", market, tag);
    }

    Ok(())
}

fn run_parse(label: &str) -> Result<()> {
    let parsed = parse_market_label(label);

    println!("{}: {}", "Label".green(), label);
    println!("{}: {}", "Parsed".green(), parsed);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    if !parsed.is_bettable() {
        println!("{}", "This market is not simulated; it produces no bets.".yellow());
    }

    Ok(())
}

fn run_generate(output: &Path, seed: u64, seasons: Vec<i32>, matches_per_season: Option<usize>) -> Result<()> {
    let mut mock_config = MockDataConfig {
        seed,
        matches_per_season,
        ..MockDataConfig::default()
    };
    if !seasons.is_empty() {
        mock_config.seasons = seasons;
    }

    let pb = spinner("Generating synthetic data...");
    std::fs::create_dir_all(output).with_context(|| format!("Failed to create {:?}", output))?;
    let (matches_path, odds_path) = MockDataGenerator::new(mock_config)
        .write_csv(output)
        .with_context(|| format!("Failed to write synthetic data to {:?}", output))?;
    pb.finish_and_clear();

    println!("{} {:?}", "Wrote".green(), matches_path);
    println!("{} {:?}", "Wrote".green(), odds_path);

    Ok(())
}

fn run_interactive(config: &Config) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();
    let rows = load_rows(config)?;
    let available = AvailableFilters::from_rows(&rows);
    let defaults = config.selection.clone().or_defaults(&available);

    loop {
        let options = vec!["Run a backtest", "List filters", "Parse a market label", "Quit"];

        let choice = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let leagues = pick(&theme, "Leagues", &available.leagues, &defaults.leagues)?;
                let seasons = pick(&theme, "Seasons", &available.seasons, &defaults.seasons)?;
                let markets = pick(&theme, "Markets", &available.markets, &defaults.markets)?;

                let stake: f64 = Input::with_theme(&theme)
                    .with_prompt("Stake per bet")
                    .default(config.simulation.stake)
                    .interact_text()?;
                let odd_min: f64 = Input::with_theme(&theme)
                    .with_prompt("Minimum odd")
                    .default(config.simulation.odd_min)
                    .interact_text()?;
                let odd_max: f64 = Input::with_theme(&theme)
                    .with_prompt("Maximum odd")
                    .default(config.simulation.odd_max)
                    .interact_text()?;

                let mut run_config = config.clone();
                run_config.simulation.stake = stake;
                run_config.simulation.odd_min = odd_min;
                run_config.simulation.odd_max = odd_max;
                if let Err(e) = run_config.simulation.validate() {
                    println!("{}", e.to_string().red());
                    continue;
                }

                let selection = Selection {
                    leagues,
                    seasons,
                    markets,
                };
                if !selection.is_runnable() {
                    println!(
                        "{}",
                        "Select at least one league, one season and one market.".yellow()
                    );
                    continue;
                }

                println!();
                let report = backtesting::run_backtest(&rows, &selection, &run_config.simulation.params());
                print_report(&report, &run_config.simulation.params());
                println!();
            }
            1 => {
                println!();
                list_filters(config)?;
                println!();
            }
            2 => {
                let label: String = Input::with_theme(&theme)
                    .with_prompt("Market label")
                    .interact_text()?;
                println!();
                run_parse(&label)?;
                println!();
            }
            3 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Multi-select over `items`, pre-checking the defaults
fn pick<T>(theme: &ColorfulTheme, prompt: &str, items: &[T], defaults: &[T]) -> Result<Vec<T>>
where
    T: Clone + PartialEq + ToString,
{
    let checked: Vec<bool> = items.iter().map(|i| defaults.contains(i)).collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .defaults(&checked)
        .interact()?;
    Ok(chosen.into_iter().map(|i| items[i].clone()).collect())
}

/// Truncate a label to fit display width
fn truncate_label(label: &str, max_len: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_len {
        label.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
