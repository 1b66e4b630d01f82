//! Market Label Parser
//!
//! Classifies free-text bookmaker market labels such as `"Over/Under 2.5 - Over"`
//! into a typed bet. Rules are tried in a fixed order:
//!
//! 1. Over/Under with a goal line
//! 2. Both teams to score
//! 3. Match winner (1X2)
//! 4. Unknown
//!
//! Labels that fall through every rule are `Unknown` and never bet on.
//!
//! # Example
//!
//! ```
//! use footy::core::market::{parse_market_label, OverUnderSide, ParsedMarket};
//!
//! let parsed = parse_market_label("Over/Under 2.5 - Over");
//! assert_eq!(
//!     parsed,
//!     ParsedMarket::OverUnder { side: OverUnderSide::Over, line: 2.5 }
//! );
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const OVER_UNDER_HEADING: &str = "Over/Under";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverUnderSide {
    Over,
    Under,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BttsSide {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchSide {
    Home,
    Draw,
    Away,
}

/// Structured bet type extracted from a market label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedMarket {
    OverUnder { side: OverUnderSide, line: f64 },
    /// `side` is None when the label names the market but no selection
    BothTeamsToScore { side: Option<BttsSide> },
    MatchWinner { side: MatchSide },
    Unknown { label: String },
}

impl ParsedMarket {
    /// Whether bets are placed for this market
    pub fn is_bettable(&self) -> bool {
        !matches!(self, ParsedMarket::Unknown { .. })
    }
}

impl fmt::Display for ParsedMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedMarket::OverUnder { side, line } => write!(f, "{:?} {}", side, line),
            ParsedMarket::BothTeamsToScore { side: Some(side) } => write!(f, "BTTS {:?}", side),
            ParsedMarket::BothTeamsToScore { side: None } => write!(f, "BTTS"),
            ParsedMarket::MatchWinner { side } => write!(f, "Match Winner {:?}", side),
            ParsedMarket::Unknown { label } => write!(f, "Unknown ({})", label),
        }
    }
}

fn side_with_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(Over|Under)\s*([0-9]+(?:\.[0-9]+)?)").unwrap())
}

fn side_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(Over|Under)\b").unwrap())
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap())
}

fn yes_no_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(yes|no)").unwrap())
}

/// Parse a market label into a [`ParsedMarket`]
pub fn parse_market_label(label: &str) -> ParsedMarket {
    if is_over_under_label(label) {
        if let Some(parsed) = parse_over_under(label) {
            return parsed;
        }
    }

    if label.contains("Both Teams") || label.to_uppercase().starts_with("BTTS") {
        return ParsedMarket::BothTeamsToScore {
            side: parse_btts_side(label),
        };
    }

    if label.contains("Match Winner") || label.contains("1X2") || label.contains("Match") {
        if let Some(side) = parse_match_side(label) {
            return ParsedMarket::MatchWinner { side };
        }
    }

    ParsedMarket::Unknown {
        label: label.to_string(),
    }
}

/// Same as [`parse_market_label`] for nullable labels
pub fn parse_optional_label(label: Option<&str>) -> ParsedMarket {
    parse_market_label(label.unwrap_or(""))
}

fn is_over_under_label(label: &str) -> bool {
    label.contains(OVER_UNDER_HEADING) || (label.contains("Over") && label.contains('/'))
}

fn parse_over_under(label: &str) -> Option<ParsedMarket> {
    // The "Over/Under" heading names the market, not the selection
    let body = label.replace(OVER_UNDER_HEADING, " ");

    if let Some(caps) = side_with_line_re().captures(&body) {
        let side = parse_ou_side(caps.get(1)?.as_str())?;
        let line: f64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(ParsedMarket::OverUnder { side, line });
    }

    // "Over/Under 2.5 - Over": line first, selection last
    let trailing_side = side_word_re()
        .find_iter(&body)
        .last()
        .and_then(|m| parse_ou_side(m.as_str()));
    if let (Some(side), Some(line)) = (trailing_side, first_line(&body)) {
        return Some(ParsedMarket::OverUnder { side, line });
    }

    // No selection after the heading: "Over/Under 2.5" reads as Under 2.5
    let caps = side_with_line_re().captures(label)?;
    let side = parse_ou_side(caps.get(1)?.as_str())?;
    let line: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(ParsedMarket::OverUnder { side, line })
}

fn first_line(text: &str) -> Option<f64> {
    line_re().find(text)?.as_str().parse().ok()
}

fn parse_ou_side(token: &str) -> Option<OverUnderSide> {
    match token {
        "Over" => Some(OverUnderSide::Over),
        "Under" => Some(OverUnderSide::Under),
        _ => None,
    }
}

fn parse_btts_side(label: &str) -> Option<BttsSide> {
    let token = yes_no_re().find(label)?.as_str().to_lowercase();
    if token == "yes" {
        Some(BttsSide::Yes)
    } else {
        Some(BttsSide::No)
    }
}

fn parse_match_side(label: &str) -> Option<MatchSide> {
    let lower = label.to_lowercase();
    if lower.contains("home") {
        Some(MatchSide::Home)
    } else if lower.contains("away") {
        Some(MatchSide::Away)
    } else if lower.contains("draw") {
        Some(MatchSide::Draw)
    } else {
        None
    }
}
