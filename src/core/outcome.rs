//! Outcome Evaluation
//!
//! Settles a parsed market against a final score.
//!
//! Profit on a flat stake:
//!     win  = (odd - 1) * stake
//!     loss = -stake
//!     no bet = 0

use super::market::{BttsSide, MatchSide, OverUnderSide, ParsedMarket};
use serde::{Deserialize, Serialize};

/// Result of a single bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetOutcome {
    Won,
    Lost,
    /// Market could not be parsed, nothing was wagered
    NoBet,
}

impl BetOutcome {
    pub fn is_placed(self) -> bool {
        self != BetOutcome::NoBet
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BetOutcome::Won => "won",
            BetOutcome::Lost => "lost",
            BetOutcome::NoBet => "no_bet",
        }
    }
}

/// Decide the outcome of `market` for a match that ended `home_goals`-`away_goals`
pub fn evaluate_outcome(market: &ParsedMarket, home_goals: u32, away_goals: u32) -> BetOutcome {
    let won = match market {
        ParsedMarket::OverUnder { side, line } => {
            let total = f64::from(home_goals) + f64::from(away_goals);
            match side {
                OverUnderSide::Over => total > *line,
                // Ties on integer lines go to Under
                OverUnderSide::Under => total <= *line,
            }
        }
        ParsedMarket::BothTeamsToScore { side } => match side {
            Some(BttsSide::Yes) => home_goals > 0 && away_goals > 0,
            Some(BttsSide::No) | None => home_goals == 0 || away_goals == 0,
        },
        ParsedMarket::MatchWinner { side } => match side {
            MatchSide::Home => home_goals > away_goals,
            MatchSide::Away => away_goals > home_goals,
            MatchSide::Draw => home_goals == away_goals,
        },
        ParsedMarket::Unknown { .. } => return BetOutcome::NoBet,
    };

    if won {
        BetOutcome::Won
    } else {
        BetOutcome::Lost
    }
}

/// Profit of a settled bet
pub fn bet_profit(outcome: BetOutcome, odd: f64, stake: f64) -> f64 {
    match outcome {
        BetOutcome::Won => (odd - 1.0) * stake,
        BetOutcome::Lost => -stake,
        BetOutcome::NoBet => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::market::parse_market_label;

    #[test]
    fn test_over_strictly_above_line() {
        let market = parse_market_label("Over/Under 2.5 - Over");
        assert_eq!(evaluate_outcome(&market, 1, 1), BetOutcome::Lost);
        assert_eq!(evaluate_outcome(&market, 2, 1), BetOutcome::Won);
    }

    #[test]
    fn test_huge_scores_do_not_overflow() {
        let over = parse_market_label("Over/Under 2.5 - Over");
        let under = parse_market_label("Over/Under 2.5 - Under");
        assert_eq!(evaluate_outcome(&over, u32::MAX, 5), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&under, u32::MAX, u32::MAX), BetOutcome::Lost);
    }

    #[test]
    fn test_under_integer_line_tie() {
        let under = ParsedMarket::OverUnder {
            side: OverUnderSide::Under,
            line: 3.0,
        };
        let over = ParsedMarket::OverUnder {
            side: OverUnderSide::Over,
            line: 3.0,
        };
        assert_eq!(evaluate_outcome(&under, 2, 1), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&over, 2, 1), BetOutcome::Lost);
    }

    #[test]
    fn test_btts() {
        let yes = parse_market_label("Both Teams To Score - Yes");
        assert_eq!(evaluate_outcome(&yes, 0, 3), BetOutcome::Lost);
        assert_eq!(evaluate_outcome(&yes, 1, 1), BetOutcome::Won);

        let no = parse_market_label("Both Teams To Score - No");
        assert_eq!(evaluate_outcome(&no, 0, 3), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&no, 2, 1), BetOutcome::Lost);
    }

    #[test]
    fn test_btts_without_side_uses_no_rule() {
        let market = ParsedMarket::BothTeamsToScore { side: None };
        assert_eq!(evaluate_outcome(&market, 0, 0), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&market, 1, 1), BetOutcome::Lost);
    }

    #[test]
    fn test_match_winner() {
        let draw = parse_market_label("Match Winner - Draw");
        assert_eq!(evaluate_outcome(&draw, 2, 2), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&draw, 2, 1), BetOutcome::Lost);

        let home = parse_market_label("Match Winner - Home");
        assert_eq!(evaluate_outcome(&home, 2, 1), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&home, 1, 1), BetOutcome::Lost);

        let away = parse_market_label("Match Winner - Away");
        assert_eq!(evaluate_outcome(&away, 0, 1), BetOutcome::Won);
        assert_eq!(evaluate_outcome(&away, 1, 0), BetOutcome::Lost);
    }

    #[test]
    fn test_unknown_never_bets() {
        let market = parse_market_label("Special Market X");
        assert_eq!(evaluate_outcome(&market, 5, 0), BetOutcome::NoBet);
        assert!(!BetOutcome::NoBet.is_placed());
    }

    #[test]
    fn test_bet_profit() {
        assert!((bet_profit(BetOutcome::Won, 2.5, 100.0) - 150.0).abs() < 1e-9);
        assert_eq!(bet_profit(BetOutcome::Lost, 2.5, 100.0), -100.0);
        assert_eq!(bet_profit(BetOutcome::NoBet, 2.5, 100.0), 0.0);
    }
}
