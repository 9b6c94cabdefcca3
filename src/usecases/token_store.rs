//! Token Store - Administrative Configuration Surface
//!
//! The per-token parameter table consumed by both the vault and the bet
//! ledger. It is an explicit store object injected into both components
//! at construction (behind a shared read/write lock), never ambient
//! global state: a configuration read happens-before any dependent
//! balance mutation within the same logical operation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::error::LedgerError;
use crate::domain::fees::HouseEdgeSplit;
use crate::domain::token::{Address, Amount};

/// Risk and gating parameters for one registered token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSettings {
  /// Whether user-facing operations may reference this token.
  pub allowed: bool,
  /// Emergency gate: pauses new inflows and wagers.
  pub paused: bool,
  /// Minimum gross stake (and deposit floor).
  pub min_bet_amount: Amount,
  /// Maximum gross stake.
  pub max_bet_amount: Amount,
  /// Max payout as basis points of the pool balance.
  pub balance_risk_bps: u16,
  /// Five-way house-edge revenue split.
  pub house_edge_split: HouseEdgeSplit,
  /// Partner-share harvest threshold.
  pub min_partner_transfer_amount: Amount,
  /// Partner payout address, if one is configured.
  pub partner: Option<Address>,
  /// Chainlink-style randomness subscription id; configuration surface
  /// for sibling VRF games, never read by the ledger itself.
  pub vrf_subscription_id: u64,
}

impl Default for TokenSettings {
  fn default() -> Self {
    Self {
      allowed: true,
      paused: false,
      min_bet_amount: 0,
      max_bet_amount: Amount::MAX,
      balance_risk_bps: 0,
      house_edge_split: HouseEdgeSplit::even(),
      min_partner_transfer_amount: 0,
      partner: None,
      vrf_subscription_id: 0,
    }
  }
}

/// Token store shared between the vault and the bet ledger.
pub type SharedTokenStore = Arc<RwLock<TokenStore>>;

/// Create an empty shared store.
pub fn shared_store() -> SharedTokenStore {
  Arc::new(RwLock::new(TokenStore::new()))
}

/// Registry of per-token settings, keyed by token address.
///
/// The gas-token sentinel (all-zero address) is an ordinary key.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
  tokens: HashMap<Address, TokenSettings>,
}

impl TokenStore {
  /// Create an empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a token. Fails if it is already registered.
  pub fn register(
    &mut self,
    token: Address,
    settings: TokenSettings,
  ) -> Result<(), LedgerError> {
    if self.tokens.contains_key(&token) {
      return Err(LedgerError::TokenAlreadyRegistered(token));
    }
    self.tokens.insert(token, settings);
    Ok(())
  }

  /// Whether `token` is registered.
  pub fn is_registered(&self, token: &Address) -> bool {
    self.tokens.contains_key(token)
  }

  /// Settings for `token`.
  pub fn get(&self, token: &Address) -> Result<&TokenSettings, LedgerError> {
    self
      .tokens
      .get(token)
      .ok_or(LedgerError::TokenNotRegistered(*token))
  }

  /// Mutable settings for `token`.
  pub fn get_mut(&mut self, token: &Address) -> Result<&mut TokenSettings, LedgerError> {
    self
      .tokens
      .get_mut(token)
      .ok_or(LedgerError::TokenNotRegistered(*token))
  }

  /// Reject unless `token` is registered, allowed, and not paused.
  pub fn ensure_active(&self, token: &Address) -> Result<&TokenSettings, LedgerError> {
    let settings = self.get(token)?;
    if !settings.allowed {
      return Err(LedgerError::TokenNotAllowed(*token));
    }
    if settings.paused {
      return Err(LedgerError::TokenPaused(*token));
    }
    Ok(settings)
  }

  /// Reject unless `gross` lies within the token's bet range.
  pub fn ensure_bet_amount(&self, token: &Address, gross: Amount) -> Result<(), LedgerError> {
    let settings = self.get(token)?;
    if gross < settings.min_bet_amount || gross > settings.max_bet_amount {
      return Err(LedgerError::AmountOutOfRange {
        amount: gross,
        min: settings.min_bet_amount,
        max: settings.max_bet_amount,
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::error::ErrorKind;
  use crate::domain::token::UNIT;

  #[test]
  fn test_register_conflict() {
    let mut store = TokenStore::new();
    store.register(Address::ZERO, TokenSettings::default()).unwrap();
    assert!(store.is_registered(&Address::ZERO));
    let err = store
      .register(Address::ZERO, TokenSettings::default())
      .unwrap_err();
    assert!(matches!(err, LedgerError::TokenAlreadyRegistered(_)));
  }

  #[test]
  fn test_unregistered_lookup_fails() {
    let store = TokenStore::new();
    let err = store.get(&Address::from_low_u64(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
  }

  #[test]
  fn test_ensure_active_gating() {
    let t = Address::from_low_u64(5);
    let mut store = TokenStore::new();
    store.register(t, TokenSettings::default()).unwrap();
    assert!(store.ensure_active(&t).is_ok());

    store.get_mut(&t).unwrap().paused = true;
    assert!(matches!(
      store.ensure_active(&t).unwrap_err(),
      LedgerError::TokenPaused(_)
    ));

    store.get_mut(&t).unwrap().paused = false;
    store.get_mut(&t).unwrap().allowed = false;
    assert!(matches!(
      store.ensure_active(&t).unwrap_err(),
      LedgerError::TokenNotAllowed(_)
    ));
  }

  #[test]
  fn test_bet_amount_range() {
    let t = Address::from_low_u64(5);
    let mut store = TokenStore::new();
    store
      .register(
        t,
        TokenSettings {
          min_bet_amount: 10 * UNIT,
          max_bet_amount: 100 * UNIT,
          ..TokenSettings::default()
        },
      )
      .unwrap();

    assert!(store.ensure_bet_amount(&t, 10 * UNIT).is_ok());
    assert!(store.ensure_bet_amount(&t, 100 * UNIT).is_ok());
    assert!(store.ensure_bet_amount(&t, 10 * UNIT - 1).is_err());
    assert!(store.ensure_bet_amount(&t, 100 * UNIT + 1).is_err());
  }
}
