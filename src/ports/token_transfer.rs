//! Token Transfer Port - Custody Movement Interface
//!
//! The seam between the ledger core and whatever execution environment
//! actually holds funds. Every deposit, escrow, payout, and harvest is
//! expressed as a transfer between accounts; the core never touches
//! balances directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::token::{Address, Amount};

/// Rejection from the custody layer.
#[derive(Debug, Error)]
pub enum TransferError {
  #[error("account {account} holds {held} of token {token}, {requested} requested")]
  InsufficientBalance {
    token: Address,
    account: Address,
    held: Amount,
    requested: Amount,
  },

  #[error("transfer rejected: {0}")]
  Rejected(String),
}

/// Trait for moving token custody between accounts.
///
/// Implementations must apply each transfer atomically: on error no
/// balance has changed. The gas-token sentinel address is an ordinary
/// token key at this boundary.
#[async_trait]
pub trait TokenTransfer: Send + Sync + 'static {
  /// Move `amount` of `token` from `from` to `to`.
  async fn transfer(
    &self,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: Amount,
  ) -> Result<(), TransferError>;
}
