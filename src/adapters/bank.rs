//! In-Memory Token Bank — Custody Adapter
//!
//! Implements the `TokenTransfer` port with plain balance maps. Stands
//! in for the token contracts (and the native gas balance) in tests,
//! the demo binary, and simulations: `mint` seeds balances the way the
//! original fixtures minted their bet token.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::token::{Address, Amount};
use crate::ports::token_transfer::{TokenTransfer, TransferError};

/// Balances per token, per account.
#[derive(Debug, Default)]
pub struct InMemoryTokenBank {
    balances: Mutex<HashMap<Address, HashMap<Address, Amount>>>,
}

impl InMemoryTokenBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `account` out of thin air.
    pub async fn mint(&self, token: &Address, account: &Address, amount: Amount) {
        let mut balances = self.balances.lock().await;
        *balances
            .entry(*token)
            .or_default()
            .entry(*account)
            .or_insert(0) += amount;
    }

    /// Current balance of `account` in `token`.
    pub async fn balance_of(&self, token: &Address, account: &Address) -> Amount {
        let balances = self.balances.lock().await;
        balances
            .get(token)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or(0)
    }

    /// Total supply of `token` across all accounts.
    pub async fn total_supply(&self, token: &Address) -> Amount {
        let balances = self.balances.lock().await;
        balances
            .get(token)
            .map_or(0, |accounts| accounts.values().sum())
    }
}

#[async_trait]
impl TokenTransfer for InMemoryTokenBank {
    async fn transfer(
        &self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut balances = self.balances.lock().await;
        let accounts = balances.entry(*token).or_default();
        let held = accounts.get(from).copied().unwrap_or(0);
        if amount > held {
            return Err(TransferError::InsufficientBalance {
                token: *token,
                account: *from,
                held,
                requested: amount,
            });
        }
        if let Some(entry) = accounts.get_mut(from) {
            *entry -= amount;
        }
        *accounts.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}
