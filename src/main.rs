//! EqualBets Ledger — Entry Point
//!
//! Operator binary: loads configuration, wires the vault and bet
//! ledger against in-memory adapters, applies the token setup
//! sequence, and replays one full betting round end to end so the
//! whole surface can be exercised and observed from the command line.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create adapters (token bank, match registry, audit log, metrics)
//! 4. Create the shared token store and the vault
//! 5. Apply the per-token setup sequence from config
//! 6. Create the bet ledger and grant it the Game role
//! 7. Seed demo balances and pool liquidity
//! 8. Propose → accept → record result → resolve one handicap bet
//! 9. Harvest fees and dump metrics + audit-trail location

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use tokio::sync::Mutex;
use tracing::info;

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::bank::InMemoryTokenBank;
use adapters::metrics::LedgerMetrics;
use adapters::persistence::JsonlAuditLog;
use adapters::registry::InMemoryMatchRegistry;
use domain::handicap::{HandicapOutcome, Side};
use domain::roles::Role;
use domain::token::{Address, UNIT, format_units};
use ports::repository::Repository;
use usecases::bet_ledger::HandicapLedger;
use usecases::token_store::shared_store;
use usecases::vault::Vault;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.ledger.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.ledger.name,
        version = env!("CARGO_PKG_VERSION"),
        tokens = config.tokens.len(),
        "Starting EqualBets ledger"
    );

    // ── 3. Create adapters ──────────────────────────────────
    let bank = Arc::new(InMemoryTokenBank::new());
    let registry = Arc::new(InMemoryMatchRegistry::new());
    let audit: Option<Arc<JsonlAuditLog>> = if config.persistence.enabled {
        Some(Arc::new(
            JsonlAuditLog::from_data_dir(&config.persistence.data_dir)
                .await
                .context("Failed to open audit log")?,
        ))
    } else {
        None
    };
    let metrics = if config.metrics.enabled {
        Some(LedgerMetrics::new().context("Failed to register metrics")?)
    } else {
        None
    };

    // ── 4. Create the shared store and the vault ────────────
    let admin = config.ledger.admin_address()?;
    let store = shared_store();
    let mut vault = Vault::new(
        vault_address(),
        config.ledger.treasury_address()?,
        config.ledger.team_address()?,
        admin,
        Arc::clone(&bank),
        Arc::clone(&store),
    );
    if let Some(audit) = &audit {
        vault = vault.with_audit(Arc::clone(audit) as Arc<dyn Repository>);
    }

    // ── 5. Apply the token setup sequence ───────────────────
    for token_config in &config.tokens {
        let token = token_config.token_address()?;
        let settings = token_config.to_settings()?;
        vault.add_token(&admin, token, settings.balance_risk_bps).await?;
        vault.set_allowed_token(&admin, &token, settings.allowed).await?;
        vault.set_paused_token(&admin, &token, settings.paused).await?;
        vault
            .set_token_min_bet_amount(&admin, &token, settings.min_bet_amount)
            .await?;
        vault
            .set_token_max_bet_amount(&admin, &token, settings.max_bet_amount)
            .await?;
        vault
            .set_min_partner_transfer_amount(
                &admin,
                &token,
                settings.min_partner_transfer_amount,
            )
            .await?;
        let split = settings.house_edge_split;
        vault
            .set_house_edge_split(
                &admin,
                &token,
                split.bank,
                split.dividend,
                split.partner,
                split.treasury,
                split.team,
            )
            .await?;
        if let Some(partner) = settings.partner {
            vault.set_token_partner(&admin, &token, partner).await?;
        }
        vault
            .set_token_vrf_sub_id(&admin, &token, settings.vrf_subscription_id)
            .await?;
        info!(token = %token, name = %token_config.name, "Token configured");
    }

    // ── 6. Create the bet ledger and grant the Game role ────
    let ledger_address = Address::from_low_u64(0xbe7);
    vault.grant_role(&admin, ledger_address, Role::Game)?;
    let vault = Arc::new(Mutex::new(vault));
    let mut ledger = HandicapLedger::new(
        ledger_address,
        config.ledger.bet_fee_units()?,
        Arc::clone(&bank),
        Arc::clone(&registry),
        store,
        Arc::clone(&vault),
    );
    if let Some(audit) = &audit {
        ledger = ledger.with_audit(Arc::clone(audit) as Arc<dyn Repository>);
    }

    // ── 7. Seed demo balances and pool liquidity ────────────
    let demo_token = config.tokens[0].token_address()?;
    let settings = config.tokens[0].to_settings()?;
    let stake = settings
        .min_bet_amount
        .max(10 * UNIT)
        .min(settings.max_bet_amount);
    let liquidity = stake * 10;
    let provider = Address::from_low_u64(0xa0);
    let proposer = Address::from_low_u64(0xa1);
    let accepter = Address::from_low_u64(0xa2);
    bank.mint(&demo_token, &provider, liquidity).await;
    bank.mint(&demo_token, &proposer, stake).await;
    bank.mint(&demo_token, &accepter, stake).await;

    let shares = vault
        .lock()
        .await
        .deposit(&provider, &demo_token, liquidity)
        .await?;
    info!(shares, "Demo liquidity deposited");

    // ── 8. One full betting round ───────────────────────────
    let match_id = "demo-derby";
    registry
        .create_match(match_id, Utc::now() + Duration::hours(1), "Home FC", "Away FC")
        .await;

    let bet_id = ledger
        .new_handicap_bet(
            &proposer,
            match_id,
            Some(Side::Home),
            Some(Side::Home),
            25,
            stake,
            &demo_token,
        )
        .await?;
    ledger.accept_handicap_bet(&accepter, bet_id, Side::Away).await?;
    if let Some(metrics) = &metrics {
        let label = demo_token.to_string();
        metrics.bets_proposed.with_label_values(&[&label]).inc();
        metrics.bets_accepted.with_label_values(&[&label]).inc();
        metrics.set_escrow_balance(&demo_token, ledger.escrow_balance(&demo_token));
    }

    registry.record_result(match_id, 2, 0).await?;
    let settlement = ledger.resolve_handicap_bet(bet_id).await?;
    info!(
        bet_id,
        outcome = ?settlement.outcome,
        fee_to_vault = %format_units(settlement.fee_to_vault),
        "Demo bet settled"
    );

    // ── 9. Harvest fees, dump metrics and audit location ────
    let mut vault_guard = vault.lock().await;
    let report = vault_guard.harvest_fees(&admin, &demo_token).await?;
    info!(
        treasury = %format_units(report.treasury_paid),
        team = %format_units(report.team_paid),
        dividend = %format_units(report.dividend_to_pool),
        pool = %format_units(vault_guard.get_balance(&demo_token)),
        "Fees harvested"
    );

    if let Some(metrics) = &metrics {
        let label = demo_token.to_string();
        let outcome_label = match settlement.outcome {
            HandicapOutcome::HomeWins => "home_wins",
            HandicapOutcome::AwayWins => "away_wins",
            HandicapOutcome::Push => "push",
        };
        metrics
            .bets_resolved
            .with_label_values(&[&label, outcome_label])
            .inc();
        metrics
            .house_edge_revenue
            .with_label_values(&[&label])
            .add(format_units(settlement.fee_to_vault).to_f64().unwrap_or(0.0));
        metrics.set_pool_balance(&demo_token, vault_guard.get_balance(&demo_token));
        metrics.set_escrow_balance(&demo_token, ledger.escrow_balance(&demo_token));
        println!("{}", metrics.export()?);
    }
    if let Some(audit) = &audit {
        info!(trail = %audit.path().display(), records = audit.load_all().await?.len(), "Audit trail written");
    }

    info!("Ledger demo complete");
    Ok(())
}

/// The vault custody address used by this binary.
fn vault_address() -> Address {
    Address::from_low_u64(0xba_4c)
}
