//! Ledger error taxonomy.
//!
//! Every mutating operation rejects atomically with one of these errors;
//! no partial escrow or share mutation is ever observable. `kind()` maps
//! each error onto its class, and `is_retriable()` marks the one class
//! (upstream results not ready yet) that a caller may safely re-submit
//! without first re-reading ledger state.

use thiserror::Error;

use super::bet::BetId;
use super::token::{Address, Amount};

/// Classification of a ledger rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation references an unregistered, disallowed, or paused token.
    Configuration,
    /// Malformed input: amounts out of range, bad split weights, bad side
    /// or odds selection.
    Validation,
    /// Operation conflicts with current ledger state (double accept,
    /// double resolve, overdraw).
    StateConflict,
    /// An external dependency has not produced the data the operation
    /// needs yet.
    Upstream,
    /// Caller lacks the role the operation requires.
    Permission,
}

/// Errors surfaced by the vault, bet ledger, and configuration surface.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("token {0} is not registered")]
    TokenNotRegistered(Address),

    #[error("token {0} is already registered")]
    TokenAlreadyRegistered(Address),

    #[error("token {0} is not allowed")]
    TokenNotAllowed(Address),

    #[error("token {0} is paused")]
    TokenPaused(Address),

    #[error("malformed address: {0}")]
    InvalidAddress(String),

    #[error("malformed amount: {0}")]
    InvalidAmount(String),

    #[error("amount {amount} outside bet range [{min}, {max}]")]
    AmountOutOfRange {
        amount: Amount,
        min: Amount,
        max: Amount,
    },

    #[error("stake {stake} does not cover the proposal fee {fee}")]
    StakeBelowFee { stake: Amount, fee: Amount },

    #[error("house edge split weights sum to {sum}, expected {expected}")]
    InvalidSplit { sum: u32, expected: u32 },

    #[error("odds require a stronger side")]
    OddsWithoutStronger,

    #[error("bet {0} does not exist")]
    BetNotFound(BetId),

    #[error("bet {0} has already been accepted")]
    AlreadyAccepted(BetId),

    #[error("bet {0} has not been accepted yet")]
    NotAccepted(BetId),

    #[error("bet {0} is already settled")]
    AlreadySettled(BetId),

    #[error("bet {0} can only be canceled by its proposer")]
    NotProposer(BetId),

    #[error("cannot accept your own bet {0}")]
    SelfAccept(BetId),

    #[error("side already taken on bet {0}")]
    SideTaken(BetId),

    #[error("account {account} holds {held} shares, {requested} requested")]
    InsufficientShares {
        account: Address,
        held: Amount,
        requested: Amount,
    },

    #[error("pool for token {token} holds {held}, {requested} requested")]
    InsufficientPoolBalance {
        token: Address,
        held: Amount,
        requested: Amount,
    },

    #[error("escrow for token {token} holds {held}, {requested} requested")]
    InsufficientEscrow {
        token: Address,
        held: Amount,
        requested: Amount,
    },

    #[error("match {0} is unknown to the registry")]
    MatchNotFound(String),

    #[error("match {0} has already started")]
    MatchAlreadyStarted(String),

    #[error("match {0} is already resolved")]
    MatchAlreadyResolved(String),

    #[error("match {0} was canceled")]
    MatchCanceled(String),

    #[error("match {0} has no recorded result yet")]
    MatchNotResolved(String),

    #[error("match registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("account {account} is missing the {role} role")]
    MissingRole { account: Address, role: String },

    #[error(transparent)]
    Transfer(#[from] crate::ports::token_transfer::TransferError),
}

impl LedgerError {
    /// The taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TokenNotRegistered(_)
            | Self::TokenAlreadyRegistered(_)
            | Self::TokenNotAllowed(_)
            | Self::TokenPaused(_) => ErrorKind::Configuration,

            Self::InvalidAddress(_)
            | Self::InvalidAmount(_)
            | Self::AmountOutOfRange { .. }
            | Self::StakeBelowFee { .. }
            | Self::InvalidSplit { .. }
            | Self::OddsWithoutStronger
            | Self::BetNotFound(_)
            | Self::MatchAlreadyStarted(_)
            | Self::MatchAlreadyResolved(_)
            | Self::MatchCanceled(_) => ErrorKind::Validation,

            Self::AlreadyAccepted(_)
            | Self::NotAccepted(_)
            | Self::AlreadySettled(_)
            | Self::NotProposer(_)
            | Self::SelfAccept(_)
            | Self::SideTaken(_)
            | Self::InsufficientShares { .. }
            | Self::InsufficientPoolBalance { .. }
            | Self::InsufficientEscrow { .. }
            | Self::Transfer(_) => ErrorKind::StateConflict,

            Self::MatchNotFound(_)
            | Self::MatchNotResolved(_)
            | Self::RegistryUnavailable(_) => ErrorKind::Upstream,

            Self::MissingRole { .. } => ErrorKind::Permission,
        }
    }

    /// Whether re-submitting the same operation later can succeed without
    /// the caller first re-checking ledger state.
    ///
    /// True only for upstream errors: once the match registry records a
    /// result, a failed resolve becomes valid as-is. Stake-moving errors
    /// must never be blindly retried.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Upstream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let token = Address::from_low_u64(7);
        assert_eq!(
            LedgerError::TokenPaused(token).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            LedgerError::InvalidSplit { sum: 9000, expected: 10000 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::AlreadySettled(3).kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            LedgerError::MatchNotResolved("m1".into()).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            LedgerError::MissingRole { account: token, role: "GAME".into() }.kind(),
            ErrorKind::Permission
        );
    }

    #[test]
    fn test_only_upstream_is_retriable() {
        assert!(LedgerError::MatchNotResolved("m1".into()).is_retriable());
        assert!(!LedgerError::AlreadySettled(1).is_retriable());
        assert!(!LedgerError::TokenNotAllowed(Address::ZERO).is_retriable());
    }
}
