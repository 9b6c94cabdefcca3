//! Prometheus Metrics Registry - Ledger Observability
//!
//! Registers and exposes Prometheus metrics for the vault and bet
//! ledger. Covers liquidity flow, bet lifecycle counts, escrow and
//! pool levels, and house-edge revenue.
//!
//! All metrics follow the naming convention `equalbets_ledger_*` and
//! carry a token label for multi-token filtering. Balance gauges are
//! reported in whole-token units.

use prometheus::{
    Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use rust_decimal::prelude::*;

use crate::domain::token::{Address, Amount, format_units};

/// Centralized Prometheus metrics for the ledger.
pub struct LedgerMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Total liquidity deposits counter.
    pub deposits: IntCounterVec,
    /// Total liquidity withdrawals counter.
    pub withdrawals: IntCounterVec,
    /// Total bets proposed counter.
    pub bets_proposed: IntCounterVec,
    /// Total bets accepted counter.
    pub bets_accepted: IntCounterVec,
    /// Total bets canceled counter.
    pub bets_canceled: IntCounterVec,
    /// Total bets resolved counter, labeled by outcome.
    pub bets_resolved: IntCounterVec,
    /// Current pool balance gauge (whole tokens).
    pub pool_balance: GaugeVec,
    /// Current ledger escrow gauge (whole tokens).
    pub escrow_balance: GaugeVec,
    /// Cumulative house-edge revenue gauge (whole tokens).
    pub house_edge_revenue: GaugeVec,
}

impl LedgerMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let deposits = IntCounterVec::new(
            Opts::new("equalbets_ledger_deposits_total", "Total liquidity deposits"),
            &["token"],
        )?;

        let withdrawals = IntCounterVec::new(
            Opts::new(
                "equalbets_ledger_withdrawals_total",
                "Total liquidity withdrawals",
            ),
            &["token"],
        )?;

        let bets_proposed = IntCounterVec::new(
            Opts::new("equalbets_ledger_bets_proposed_total", "Total bets proposed"),
            &["token"],
        )?;

        let bets_accepted = IntCounterVec::new(
            Opts::new("equalbets_ledger_bets_accepted_total", "Total bets accepted"),
            &["token"],
        )?;

        let bets_canceled = IntCounterVec::new(
            Opts::new("equalbets_ledger_bets_canceled_total", "Total bets canceled"),
            &["token"],
        )?;

        let bets_resolved = IntCounterVec::new(
            Opts::new("equalbets_ledger_bets_resolved_total", "Total bets resolved"),
            &["token", "outcome"],
        )?;

        let pool_balance = GaugeVec::new(
            Opts::new(
                "equalbets_ledger_pool_balance",
                "Current pool balance in whole tokens",
            ),
            &["token"],
        )?;

        let escrow_balance = GaugeVec::new(
            Opts::new(
                "equalbets_ledger_escrow_balance",
                "Current bet escrow in whole tokens",
            ),
            &["token"],
        )?;

        let house_edge_revenue = GaugeVec::new(
            Opts::new(
                "equalbets_ledger_house_edge_revenue",
                "Cumulative house-edge revenue in whole tokens",
            ),
            &["token"],
        )?;

        registry.register(Box::new(deposits.clone()))?;
        registry.register(Box::new(withdrawals.clone()))?;
        registry.register(Box::new(bets_proposed.clone()))?;
        registry.register(Box::new(bets_accepted.clone()))?;
        registry.register(Box::new(bets_canceled.clone()))?;
        registry.register(Box::new(bets_resolved.clone()))?;
        registry.register(Box::new(pool_balance.clone()))?;
        registry.register(Box::new(escrow_balance.clone()))?;
        registry.register(Box::new(house_edge_revenue.clone()))?;

        Ok(Self {
            registry,
            deposits,
            withdrawals,
            bets_proposed,
            bets_accepted,
            bets_canceled,
            bets_resolved,
            pool_balance,
            escrow_balance,
            house_edge_revenue,
        })
    }

    /// Update the pool balance gauge for `token`.
    pub fn set_pool_balance(&self, token: &Address, balance: Amount) {
        self.pool_balance
            .with_label_values(&[&token.to_string()])
            .set(format_units(balance).to_f64().unwrap_or(0.0));
    }

    /// Update the escrow gauge for `token`.
    pub fn set_escrow_balance(&self, token: &Address, balance: Amount) {
        self.escrow_balance
            .with_label_values(&[&token.to_string()])
            .set(format_units(balance).to_f64().unwrap_or(0.0));
    }

    /// Render the current metric values in text exposition format.
    pub fn export(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
