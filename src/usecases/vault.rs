//! Liquidity Vault - Pooled Custody and Share Accounting
//!
//! Custody of per-token pooled funds: mints and burns proportional
//! liquidity shares, takes in house-edge revenue and splits it five
//! ways, and exposes the role-gated payout seam that wager games draw
//! on. Every mutating operation names its caller and is checked against
//! an explicit role predicate before anything else happens.
//!
//! Fund movement always goes through the `TokenTransfer` port; the
//! vault's own address is just another custody account at that
//! boundary.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::error::LedgerError;
use crate::domain::fees::HouseEdgeSplit;
use crate::domain::roles::{Role, RoleStore};
use crate::domain::shares::{TokenPool, amount_for_shares};
use crate::domain::token::{Address, Amount};
use crate::ports::repository::{AuditRecord, LedgerEvent, Repository};
use crate::ports::token_transfer::TokenTransfer;

use super::token_store::{SharedTokenStore, TokenSettings};

/// Accumulated house-edge shares awaiting harvest, per token.
///
/// The bank share never lands here: it credits the pool immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeBuckets {
  pub dividend: Amount,
  pub partner: Amount,
  pub treasury: Amount,
  pub team: Amount,
}

/// Amounts moved by one `harvest_fees` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestReport {
  /// Dividend share folded into the pool for liquidity providers.
  pub dividend_to_pool: Amount,
  /// Paid out to the treasury address.
  pub treasury_paid: Amount,
  /// Paid out to the team address.
  pub team_paid: Amount,
  /// Paid out to the partner (zero when below the transfer threshold
  /// or no partner is configured).
  pub partner_paid: Amount,
}

/// The liquidity vault.
pub struct Vault<T: TokenTransfer> {
  /// Custody account the vault holds funds under.
  address: Address,
  /// Treasury payout address.
  treasury: Address,
  /// Team payout address.
  team: Address,
  transfers: Arc<T>,
  store: SharedTokenStore,
  roles: RoleStore,
  pools: HashMap<Address, TokenPool>,
  buckets: HashMap<Address, FeeBuckets>,
  audit: Option<Arc<dyn Repository>>,
}

impl<T: TokenTransfer> Vault<T> {
  /// Create a vault.
  ///
  /// `admin` receives the Admin role; the treasury and team addresses
  /// receive harvested fee shares.
  pub fn new(
    address: Address,
    treasury: Address,
    team: Address,
    admin: Address,
    transfers: Arc<T>,
    store: SharedTokenStore,
  ) -> Self {
    Self {
      address,
      treasury,
      team,
      transfers,
      store,
      roles: RoleStore::with_admin(admin),
      pools: HashMap::new(),
      buckets: HashMap::new(),
      audit: None,
    }
  }

  /// Attach an audit trail. Recording is best-effort.
  #[must_use]
  pub fn with_audit(mut self, audit: Arc<dyn Repository>) -> Self {
    self.audit = Some(audit);
    self
  }

  /// The vault's custody address.
  pub const fn address(&self) -> Address {
    self.address
  }

  /// Whether `account` currently holds `role`.
  pub fn has_role(&self, account: &Address, role: Role) -> bool {
    self.roles.has(account, role)
  }

  // ── Role management ─────────────────────────────────────

  /// Grant `role` to `account`. Admin only.
  pub fn grant_role(
    &mut self,
    caller: &Address,
    account: Address,
    role: Role,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.roles.grant(account, role);
    info!(account = %account, role = %role, "Role granted");
    Ok(())
  }

  /// Revoke `role` from `account`. Admin only.
  pub fn revoke_role(
    &mut self,
    caller: &Address,
    account: &Address,
    role: Role,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.roles.revoke(account, role);
    info!(account = %account, role = %role, "Role revoked");
    Ok(())
  }

  // ── Administrative configuration surface ────────────────

  /// Register a new token with the given balance-risk rate.
  ///
  /// Fails if the token is already registered.
  pub async fn add_token(
    &mut self,
    caller: &Address,
    token: Address,
    balance_risk_bps: u16,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.register(
      token,
      TokenSettings {
        balance_risk_bps,
        ..TokenSettings::default()
      },
    )?;
    self.pools.insert(token, TokenPool::new());
    self.buckets.insert(token, FeeBuckets::default());
    info!(token = %token, risk_bps = balance_risk_bps, "Token registered");
    self.record(LedgerEvent::TokenAdded { token }).await;
    Ok(())
  }

  /// Toggle whether operations may reference `token`. Idempotent.
  pub async fn set_allowed_token(
    &mut self,
    caller: &Address,
    token: &Address,
    allowed: bool,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.allowed = allowed;
    info!(token = %token, allowed, "Token allowance updated");
    Ok(())
  }

  /// Toggle the emergency pause gate. Idempotent.
  pub async fn set_paused_token(
    &mut self,
    caller: &Address,
    token: &Address,
    paused: bool,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.paused = paused;
    info!(token = %token, paused, "Token pause updated");
    Ok(())
  }

  /// Set the max-payout-as-fraction-of-pool parameter.
  ///
  /// Consumed by `max_bet_amount`; deposits are never gated by it.
  pub async fn set_balance_risk(
    &mut self,
    caller: &Address,
    token: &Address,
    balance_risk_bps: u16,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.balance_risk_bps = balance_risk_bps;
    Ok(())
  }

  /// Set the minimum gross stake (doubles as the deposit floor).
  pub async fn set_token_min_bet_amount(
    &mut self,
    caller: &Address,
    token: &Address,
    amount: Amount,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.min_bet_amount = amount;
    Ok(())
  }

  /// Set the maximum gross stake.
  pub async fn set_token_max_bet_amount(
    &mut self,
    caller: &Address,
    token: &Address,
    amount: Amount,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.max_bet_amount = amount;
    Ok(())
  }

  /// Set the partner-share harvest threshold.
  pub async fn set_min_partner_transfer_amount(
    &mut self,
    caller: &Address,
    token: &Address,
    amount: Amount,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.min_partner_transfer_amount = amount;
    Ok(())
  }

  /// Configure the partner payout address for `token`.
  pub async fn set_token_partner(
    &mut self,
    caller: &Address,
    token: &Address,
    partner: Address,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.partner = Some(partner);
    Ok(())
  }

  /// Set the randomness subscription id (sibling VRF games only).
  pub async fn set_token_vrf_sub_id(
    &mut self,
    caller: &Address,
    token: &Address,
    sub_id: u64,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    self.store.write().await.get_mut(token)?.vrf_subscription_id = sub_id;
    Ok(())
  }

  /// Set the five-way house-edge split; weights must sum to 10000.
  pub async fn set_house_edge_split(
    &mut self,
    caller: &Address,
    token: &Address,
    bank: u16,
    dividend: u16,
    partner: u16,
    treasury: u16,
    team: u16,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    let split = HouseEdgeSplit::new(bank, dividend, partner, treasury, team)?;
    self.store.write().await.get_mut(token)?.house_edge_split = split;
    info!(token = %token, ?split, "House edge split updated");
    Ok(())
  }

  // ── Liquidity provision ─────────────────────────────────

  /// Deposit `amount` into the token's pool, minting shares.
  ///
  /// Fails if the token is unregistered, disallowed, or paused, or the
  /// amount is below the configured minimum.
  pub async fn deposit(
    &mut self,
    caller: &Address,
    token: &Address,
    amount: Amount,
  ) -> Result<Amount, LedgerError> {
    {
      let store = self.store.read().await;
      let settings = store.ensure_active(token)?;
      if amount < settings.min_bet_amount {
        return Err(LedgerError::AmountOutOfRange {
          amount,
          min: settings.min_bet_amount,
          max: Amount::MAX,
        });
      }
    }

    self
      .transfers
      .transfer(token, caller, &self.address, amount)
      .await?;

    let pool = self.pools.entry(*token).or_default();
    let shares = pool.deposit(*caller, amount);
    info!(
      token = %token,
      user = %caller,
      amount,
      shares,
      pool_balance = pool.balance,
      "Liquidity deposited"
    );
    self
      .record(LedgerEvent::Deposit {
        token: *token,
        user: *caller,
        amount,
        shares,
      })
      .await;
    Ok(shares)
  }

  /// Burn `shares` and pay out the proportional pool balance.
  ///
  /// Withdrawals remain possible while a token is paused; pausing gates
  /// new inflows, not LP exits.
  pub async fn withdraw(
    &mut self,
    caller: &Address,
    token: &Address,
    shares: Amount,
  ) -> Result<Amount, LedgerError> {
    self.store.read().await.get(token)?;

    let pool = self
      .pools
      .get(token)
      .ok_or(LedgerError::TokenNotRegistered(*token))?;
    let held = pool.shares_of(caller);
    if shares > held {
      return Err(LedgerError::InsufficientShares {
        account: *caller,
        held,
        requested: shares,
      });
    }
    let released = amount_for_shares(shares, pool.total_shares, pool.balance);

    // Funds move before ledger state: the transfer is the only fallible
    // step left, so a rejection leaves shares untouched.
    self
      .transfers
      .transfer(token, &self.address, caller, released)
      .await?;

    let pool = self.pools.entry(*token).or_default();
    pool.withdraw(caller, shares)?;
    info!(
      token = %token,
      user = %caller,
      shares,
      amount = released,
      pool_balance = pool.balance,
      "Liquidity withdrawn"
    );
    self
      .record(LedgerEvent::Withdrawal {
        token: *token,
        user: *caller,
        shares,
        amount: released,
      })
      .await;
    Ok(released)
  }

  // ── Read-only state ─────────────────────────────────────

  /// Pool balance for `token`.
  pub fn get_balance(&self, token: &Address) -> Amount {
    self.pools.get(token).map_or(0, |p| p.balance)
  }

  /// Shares held by `account` in the token's pool.
  pub fn shares_of(&self, token: &Address, account: &Address) -> Amount {
    self.pools.get(token).map_or(0, |p| p.shares_of(account))
  }

  /// Total shares outstanding for `token`.
  pub fn total_shares(&self, token: &Address) -> Amount {
    self.pools.get(token).map_or(0, |p| p.total_shares)
  }

  /// Accumulated fee buckets for `token`.
  pub fn fee_buckets(&self, token: &Address) -> FeeBuckets {
    self.buckets.get(token).copied().unwrap_or_default()
  }

  /// Largest gross stake a game paying `payout_multiplier_bps` (10000 =
  /// 1x) may accept, per the token's balance-risk rate.
  pub async fn max_bet_amount(
    &self,
    token: &Address,
    payout_multiplier_bps: u32,
  ) -> Result<Amount, LedgerError> {
    let risk_bps = {
      let store = self.store.read().await;
      Amount::from(store.get(token)?.balance_risk_bps)
    };
    if payout_multiplier_bps == 0 {
      return Ok(0);
    }
    let balance = self.get_balance(token);
    let max_payout = balance * risk_bps / 10_000;
    Ok(max_payout * 10_000 / Amount::from(payout_multiplier_bps))
  }

  // ── Game seam (Game role) ───────────────────────────────

  /// Take in house-edge revenue already transferred into vault custody
  /// and split it per the token's five-way weights.
  ///
  /// The bank share credits the pool immediately (accruing to share
  /// holders); the remaining shares accumulate in buckets until
  /// harvested. With no partner configured, the partner share accrues
  /// to the treasury bucket.
  pub async fn credit_house_edge(
    &mut self,
    caller: &Address,
    token: &Address,
    amount: Amount,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Game)?;
    let (split, has_partner) = {
      let store = self.store.read().await;
      let settings = store.get(token)?;
      (settings.house_edge_split, settings.partner.is_some())
    };

    let alloc = split.allocate(amount);
    self.pools.entry(*token).or_default().credit(alloc.bank);
    let buckets = self.buckets.entry(*token).or_default();
    buckets.dividend += alloc.dividend;
    if has_partner {
      buckets.partner += alloc.partner;
    } else {
      buckets.treasury += alloc.partner;
    }
    buckets.treasury += alloc.treasury;
    buckets.team += alloc.team;

    info!(
      token = %token,
      game = %caller,
      amount,
      bank = alloc.bank,
      "House edge credited"
    );
    self
      .record(LedgerEvent::HouseEdgeCredited { token: *token, amount })
      .await;
    Ok(())
  }

  /// Pull `amount` from the pool to pay a game winner.
  pub async fn payout(
    &mut self,
    caller: &Address,
    token: &Address,
    to: &Address,
    amount: Amount,
  ) -> Result<(), LedgerError> {
    self.roles.ensure(caller, Role::Game)?;
    let balance = self.get_balance(token);
    if amount > balance {
      return Err(LedgerError::InsufficientPoolBalance {
        token: *token,
        held: balance,
        requested: amount,
      });
    }

    self
      .transfers
      .transfer(token, &self.address, to, amount)
      .await?;
    self.pools.entry(*token).or_default().debit(token, amount)?;
    info!(token = %token, game = %caller, to = %to, amount, "Game payout");
    Ok(())
  }

  // ── Fee harvest (Admin role) ────────────────────────────

  /// Drain accumulated fee buckets for `token`.
  ///
  /// Treasury and team shares pay out to their configured addresses;
  /// the dividend share folds into the pool; the partner share pays out
  /// only once it meets `min_partner_transfer_amount`.
  pub async fn harvest_fees(
    &mut self,
    caller: &Address,
    token: &Address,
  ) -> Result<HarvestReport, LedgerError> {
    self.roles.ensure(caller, Role::Admin)?;
    let (partner, min_partner) = {
      let store = self.store.read().await;
      let settings = store.get(token)?;
      (settings.partner, settings.min_partner_transfer_amount)
    };

    let pending = self.buckets.get(token).copied().unwrap_or_default();
    let mut report = HarvestReport::default();

    if pending.treasury > 0 {
      self
        .transfers
        .transfer(token, &self.address, &self.treasury, pending.treasury)
        .await?;
      report.treasury_paid = pending.treasury;
    }
    if pending.team > 0 {
      self
        .transfers
        .transfer(token, &self.address, &self.team, pending.team)
        .await?;
      report.team_paid = pending.team;
    }
    if let Some(partner_addr) = partner {
      if pending.partner >= min_partner && pending.partner > 0 {
        self
          .transfers
          .transfer(token, &self.address, &partner_addr, pending.partner)
          .await?;
        report.partner_paid = pending.partner;
      }
    }
    if pending.dividend > 0 {
      self.pools.entry(*token).or_default().credit(pending.dividend);
      report.dividend_to_pool = pending.dividend;
    }

    let buckets = self.buckets.entry(*token).or_default();
    buckets.treasury = 0;
    buckets.team = 0;
    buckets.dividend = 0;
    if report.partner_paid > 0 {
      buckets.partner = 0;
    }

    info!(
      token = %token,
      treasury = report.treasury_paid,
      team = report.team_paid,
      partner = report.partner_paid,
      dividend = report.dividend_to_pool,
      "Fees harvested"
    );
    self.record(LedgerEvent::FeesHarvested { token: *token }).await;
    Ok(report)
  }

  /// Append to the audit trail, if one is attached. Best-effort.
  async fn record(&self, event: LedgerEvent) {
    if let Some(audit) = &self.audit {
      let record = AuditRecord::new(event);
      if let Err(e) = audit.append(&record).await {
        warn!(error = %e, "Audit append failed");
      }
    }
  }
}
