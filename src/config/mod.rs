//! Configuration Module - TOML-based Ledger Configuration
//!
//! Loads and validates configuration from `config.toml`. All addresses
//! and per-token risk parameters are externalized here - nothing is
//! hardcoded in the domain layer. Amounts are written as decimal
//! strings ("10", "0.1") and converted to atomic units at load time.

pub mod loader;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::fees::HouseEdgeSplit;
use crate::domain::token::{Address, Amount, parse_units};
use crate::usecases::token_store::TokenSettings;

/// Top-level ledger configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any component is wired.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Ledger identity, fee, and operator addresses.
  pub ledger: LedgerConfig,
  /// Token registrations and risk parameters.
  pub tokens: Vec<TokenConfig>,
  /// Audit-trail persistence.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Metrics export.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Ledger identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
  /// Human-readable deployment name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Fixed proposal fee in decimal token units (e.g. "0.1").
  pub bet_fee: String,
  /// Operator account holding the Admin role.
  pub admin: String,
  /// Treasury payout address.
  pub treasury: String,
  /// Team payout address.
  pub team: String,
}

impl LedgerConfig {
  /// The proposal fee in atomic units.
  pub fn bet_fee_units(&self) -> Result<Amount> {
    parse_units(&self.bet_fee)
      .with_context(|| format!("Invalid bet_fee: {}", self.bet_fee))
  }

  /// Parsed admin address.
  pub fn admin_address(&self) -> Result<Address> {
    self.admin.parse().with_context(|| format!("Invalid admin address: {}", self.admin))
  }

  /// Parsed treasury address.
  pub fn treasury_address(&self) -> Result<Address> {
    self
      .treasury
      .parse()
      .with_context(|| format!("Invalid treasury address: {}", self.treasury))
  }

  /// Parsed team address.
  pub fn team_address(&self) -> Result<Address> {
    self.team.parse().with_context(|| format!("Invalid team address: {}", self.team))
  }
}

/// Per-token registration entry.
///
/// Mirrors the operator setup sequence: addToken, allow/pause flags,
/// balance risk, bet bounds, house-edge split, VRF subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
  /// Human-readable token name.
  pub name: String,
  /// Token address; the all-zero address denotes the gas token.
  pub address: String,
  /// Whether the token starts allowed.
  #[serde(default = "default_true")]
  pub allowed: bool,
  /// Whether the token starts paused.
  #[serde(default)]
  pub paused: bool,
  /// Minimum gross stake, decimal units.
  pub min_bet_amount: String,
  /// Maximum gross stake, decimal units.
  pub max_bet_amount: String,
  /// Max payout as basis points of the pool balance.
  #[serde(default)]
  pub balance_risk_bps: u16,
  /// Partner-share harvest threshold, decimal units.
  #[serde(default = "default_zero_amount")]
  pub min_partner_transfer_amount: String,
  /// Partner payout address, if any.
  pub partner: Option<String>,
  /// Randomness subscription id for sibling VRF games.
  #[serde(default)]
  pub vrf_subscription_id: u64,
  /// Five-way house-edge split in basis points.
  #[serde(default)]
  pub house_edge_split: SplitConfig,
}

impl TokenConfig {
  /// Parsed token address.
  pub fn token_address(&self) -> Result<Address> {
    self
      .address
      .parse()
      .with_context(|| format!("Invalid token address for {}: {}", self.name, self.address))
  }

  /// Convert this entry into store settings.
  pub fn to_settings(&self) -> Result<TokenSettings> {
    Ok(TokenSettings {
      allowed: self.allowed,
      paused: self.paused,
      min_bet_amount: parse_units(&self.min_bet_amount)
        .with_context(|| format!("Invalid min_bet_amount for {}", self.name))?,
      max_bet_amount: parse_units(&self.max_bet_amount)
        .with_context(|| format!("Invalid max_bet_amount for {}", self.name))?,
      balance_risk_bps: self.balance_risk_bps,
      house_edge_split: self.house_edge_split.to_split()?,
      min_partner_transfer_amount: parse_units(&self.min_partner_transfer_amount)
        .with_context(|| format!("Invalid min_partner_transfer_amount for {}", self.name))?,
      partner: self
        .partner
        .as_ref()
        .map(|p| {
          p.parse()
            .with_context(|| format!("Invalid partner address for {}: {p}", self.name))
        })
        .transpose()?,
      vrf_subscription_id: self.vrf_subscription_id,
    })
  }
}

/// House-edge split weights as they appear in TOML.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SplitConfig {
  pub bank: u16,
  pub dividend: u16,
  pub partner: u16,
  pub treasury: u16,
  pub team: u16,
}

impl SplitConfig {
  /// Validate and convert into the domain split type.
  pub fn to_split(self) -> Result<HouseEdgeSplit> {
    HouseEdgeSplit::new(self.bank, self.dividend, self.partner, self.treasury, self.team)
      .context("House edge split weights must sum to 10000")
  }
}

impl Default for SplitConfig {
  fn default() -> Self {
    Self {
      bank: 2000,
      dividend: 2000,
      partner: 2000,
      treasury: 2000,
      team: 2000,
    }
  }
}

/// Audit-trail persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for the JSONL audit trail.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
  /// Whether to record an audit trail at all.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      enabled: true,
    }
  }
}

/// Metrics export configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics registration.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_zero_amount() -> String {
  "0".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}
