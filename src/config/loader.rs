//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    name = %config.ledger.name,
    tokens = config.tokens.len(),
    bet_fee = %config.ledger.bet_fee,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Parseable operator and token addresses
/// - At least one token registration
/// - Bet bounds ordered, with the proposal fee below every minimum
/// - Split weights summing to the fixed denominator
pub fn validate_config(config: &AppConfig) -> Result<()> {
  config.ledger.admin_address()?;
  config.ledger.treasury_address()?;
  config.ledger.team_address()?;
  let fee = config.ledger.bet_fee_units()?;

  anyhow::ensure!(
    !config.tokens.is_empty(),
    "At least one token must be configured"
  );

  for (i, token) in config.tokens.iter().enumerate() {
    anyhow::ensure!(
      !token.name.is_empty(),
      "Token {i} has an empty name"
    );
    token.token_address()?;
    let settings = token.to_settings()?;
    anyhow::ensure!(
      settings.min_bet_amount <= settings.max_bet_amount,
      "Token {} ({}) has min_bet_amount above max_bet_amount",
      i,
      token.name
    );
    anyhow::ensure!(
      fee < settings.min_bet_amount || settings.min_bet_amount == 0,
      "Token {} ({}) has min_bet_amount at or below the proposal fee",
      i,
      token.name
    );
  }

  // Registrations must be unique per address.
  for (i, a) in config.tokens.iter().enumerate() {
    for b in config.tokens.iter().skip(i + 1) {
      anyhow::ensure!(
        a.address != b.address,
        "Token address {} configured twice",
        a.address
      );
    }
  }

  Ok(())
}
