//! Handicap sides and the settlement rule.
//!
//! A handicap bet backs one of two match sides, optionally with a
//! points concession ("odds") given by the stronger side. Odds are
//! expressed in hundredths of a goal, so the quarter and half lines of
//! the fixtures (25, 50) read as 0.25 and 0.5 goals.

use serde::{Deserialize, Serialize};

/// Scale of the odds encoding: 100 odds units = one goal.
pub const ODDS_SCALE: i64 = 100;

/// One side of a match.
///
/// Wire encoding follows the configuration surface: 0 = none,
/// 1 = home, 2 = away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// The opposing side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Decode the 0/1/2 wire value; 0 maps to `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Home),
            2 => Some(Self::Away),
            _ => None,
        }
    }

    /// The 1/2 wire value (`None` encodes as 0 at the call sites).
    pub const fn code(self) -> u8 {
        match self {
            Self::Home => 1,
            Self::Away => 2,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// Result of applying the handicap rule to a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandicapOutcome {
    /// The home backer wins both net stakes.
    HomeWins,
    /// The away backer wins both net stakes.
    AwayWins,
    /// Dead heat after adjustment: each party recovers its net stake.
    Push,
}

/// Apply the handicap rule to a recorded final score.
///
/// The stronger side concedes the handicap: its goals are reduced by
/// `odds / 100` before comparison. With no stronger side the raw score
/// decides (odds must be zero, enforced at proposal time).
pub fn settle(
    home_score: u32,
    away_score: u32,
    stronger: Option<Side>,
    odds: u32,
) -> HandicapOutcome {
    let mut diff = (i64::from(home_score) - i64::from(away_score)) * ODDS_SCALE;
    match stronger {
        Some(Side::Home) => diff -= i64::from(odds),
        Some(Side::Away) => diff += i64::from(odds),
        None => {}
    }
    match diff {
        d if d > 0 => HandicapOutcome::HomeWins,
        d if d < 0 => HandicapOutcome::AwayWins,
        _ => HandicapOutcome::Push,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_codes_roundtrip() {
        assert_eq!(Side::from_code(0), None);
        assert_eq!(Side::from_code(1), Some(Side::Home));
        assert_eq!(Side::from_code(2), Some(Side::Away));
        assert_eq!(Side::Home.code(), 1);
        assert_eq!(Side::Away.code(), 2);
        assert_eq!(Side::Home.opposite(), Side::Away);
    }

    #[test]
    fn test_no_handicap_raw_score_decides() {
        assert_eq!(settle(2, 1, None, 0), HandicapOutcome::HomeWins);
        assert_eq!(settle(0, 3, None, 0), HandicapOutcome::AwayWins);
        assert_eq!(settle(1, 1, None, 0), HandicapOutcome::Push);
    }

    #[test]
    fn test_quarter_line_breaks_a_draw() {
        // Home gives 0.25: a draw settles for the away backer.
        assert_eq!(settle(0, 0, Some(Side::Home), 25), HandicapOutcome::AwayWins);
        assert_eq!(settle(1, 1, Some(Side::Away), 25), HandicapOutcome::HomeWins);
    }

    #[test]
    fn test_one_goal_margin_beats_quarter_line() {
        assert_eq!(settle(2, 1, Some(Side::Home), 25), HandicapOutcome::HomeWins);
        assert_eq!(settle(1, 2, Some(Side::Away), 25), HandicapOutcome::AwayWins);
    }

    #[test]
    fn test_half_line_never_pushes() {
        assert_eq!(settle(0, 0, Some(Side::Home), 50), HandicapOutcome::AwayWins);
        assert_eq!(settle(1, 0, Some(Side::Home), 50), HandicapOutcome::HomeWins);
        assert_eq!(settle(2, 2, Some(Side::Away), 50), HandicapOutcome::HomeWins);
    }

    #[test]
    fn test_full_goal_line_can_push() {
        // Home gives a full goal and wins by exactly one: dead heat.
        assert_eq!(settle(1, 0, Some(Side::Home), 100), HandicapOutcome::Push);
        assert_eq!(settle(0, 1, Some(Side::Away), 100), HandicapOutcome::Push);
    }

    #[test]
    fn test_stronger_side_still_wins_by_enough() {
        assert_eq!(settle(3, 0, Some(Side::Home), 100), HandicapOutcome::HomeWins);
        assert_eq!(settle(0, 11, Some(Side::Away), 50), HandicapOutcome::AwayWins);
    }
}
