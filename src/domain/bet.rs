//! Handicap bet records and lifecycle.
//!
//! A bet moves `Proposed → Accepted → Resolved`; an unaccepted bet may
//! instead be canceled by its proposer. Resolved and Canceled are
//! terminal. The record keeps the stake net of the proposal fee; the
//! gross stake (`amount + fee`) is what sits in escrow per party.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::handicap::{HandicapOutcome, Side};
use super::token::{Address, Amount};

/// Monotonically increasing bet identifier, unique within the ledger.
pub type BetId = u64;

/// External match identifier understood by the match registry.
pub type MatchId = String;

/// Lifecycle status of a handicap bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetStatus {
    /// Proposed and escrowed by one party, waiting for a counterparty.
    Proposed,
    /// Both stakes escrowed; waiting for the match result.
    Accepted,
    /// Settled against the recorded result. Terminal.
    Resolved,
    /// Withdrawn by the proposer before acceptance. Terminal.
    Canceled,
}

impl BetStatus {
    /// Whether the bet can no longer change state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Canceled)
    }
}

/// Which match a bet references and who backs which side.
///
/// Backers are mutually exclusive: once accepted, one party backs home
/// and the other backs away, never both the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
    /// Registry id of the referenced match.
    pub match_id: MatchId,
    /// The side conceding the handicap, if any.
    pub stronger: Option<Side>,
    /// Account backing the home side (unset until chosen).
    pub home_backer: Option<Address>,
    /// Account backing the away side (unset until chosen).
    pub away_backer: Option<Address>,
}

impl MatchDetail {
    /// The side `account` backs, if any.
    pub fn side_of(&self, account: &Address) -> Option<Side> {
        if self.home_backer.as_ref() == Some(account) {
            Some(Side::Home)
        } else if self.away_backer.as_ref() == Some(account) {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// The backer of `side`, if chosen.
    pub fn backer(&self, side: Side) -> Option<Address> {
        match side {
            Side::Home => self.home_backer,
            Side::Away => self.away_backer,
        }
    }
}

/// Economic terms of a bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetTerms {
    /// Token the stakes are denominated in.
    pub token: Address,
    /// Per-party stake net of the proposal fee.
    pub amount: Amount,
    /// Fixed fee deducted from each party's stake at escrow time.
    pub fee: Amount,
    /// Handicap points in hundredths of a goal; zero unless a stronger
    /// side is named.
    pub odds: u32,
}

impl BetTerms {
    /// The gross stake each party escrows.
    pub const fn gross(&self) -> Amount {
        self.amount + self.fee
    }
}

/// A two-party handicap bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandicapBet {
    /// Unique, monotonically increasing id.
    pub id: BetId,
    /// Account that proposed (and first escrowed) the bet.
    pub propose_user: Address,
    /// Counterparty; unset until accepted.
    pub accept_user: Option<Address>,
    /// Match reference and side assignment.
    pub match_detail: MatchDetail,
    /// Stake, fee, and odds.
    pub terms: BetTerms,
    /// Current lifecycle status.
    pub status: BetStatus,
    /// Settlement outcome, recorded when resolved.
    pub outcome: Option<HandicapOutcome>,
    /// When the bet was proposed.
    pub proposed_at: DateTime<Utc>,
    /// When the bet was accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the bet reached a terminal state.
    pub settled_at: Option<DateTime<Utc>>,
}

impl HandicapBet {
    /// Whether `account` is the proposer or accepter of this bet.
    pub fn involves(&self, account: &Address) -> bool {
        self.propose_user == *account || self.accept_user.as_ref() == Some(account)
    }

    /// Total gross escrow currently held for this bet.
    pub fn escrowed(&self) -> Amount {
        match self.status {
            BetStatus::Proposed => self.terms.gross(),
            BetStatus::Accepted => 2 * self.terms.gross(),
            BetStatus::Resolved | BetStatus::Canceled => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(status: BetStatus) -> HandicapBet {
        let proposer = Address::from_low_u64(1);
        HandicapBet {
            id: 1,
            propose_user: proposer,
            accept_user: None,
            match_detail: MatchDetail {
                match_id: "m1".to_string(),
                stronger: None,
                home_backer: None,
                away_backer: Some(proposer),
            },
            terms: BetTerms {
                token: Address::ZERO,
                amount: 99,
                fee: 1,
                odds: 0,
            },
            status,
            outcome: None,
            proposed_at: Utc::now(),
            accepted_at: None,
            settled_at: None,
        }
    }

    #[test]
    fn test_gross_is_amount_plus_fee() {
        assert_eq!(bet(BetStatus::Proposed).terms.gross(), 100);
    }

    #[test]
    fn test_escrow_per_status() {
        assert_eq!(bet(BetStatus::Proposed).escrowed(), 100);
        assert_eq!(bet(BetStatus::Accepted).escrowed(), 200);
        assert_eq!(bet(BetStatus::Resolved).escrowed(), 0);
        assert_eq!(bet(BetStatus::Canceled).escrowed(), 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BetStatus::Proposed.is_terminal());
        assert!(!BetStatus::Accepted.is_terminal());
        assert!(BetStatus::Resolved.is_terminal());
        assert!(BetStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_side_of_and_involves() {
        let b = bet(BetStatus::Proposed);
        let proposer = b.propose_user;
        assert_eq!(b.match_detail.side_of(&proposer), Some(Side::Away));
        assert_eq!(b.match_detail.side_of(&Address::from_low_u64(9)), None);
        assert!(b.involves(&proposer));
        assert!(!b.involves(&Address::from_low_u64(9)));
    }
}
