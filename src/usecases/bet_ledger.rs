//! Parimutuel Bet Ledger - Escrow, Matching, and Settlement
//!
//! Two-party handicap bets against externally reported match results.
//! The proposer escrows a gross stake (a fixed fee is carved out of the
//! recorded amount), a counterparty escrows the same, and once the
//! match registry carries a result anyone may trigger settlement: the
//! winner takes both net stakes, a push returns each party its net
//! stake, and the two fees route to the vault as house edge.
//!
//! Every mutating operation validates fully before moving funds, and
//! moves funds before mutating ledger state; no partial escrow is
//! observable.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::bet::{BetId, BetStatus, BetTerms, HandicapBet, MatchDetail};
use crate::domain::error::LedgerError;
use crate::domain::handicap::{HandicapOutcome, Side, settle};
use crate::domain::roles::Role;
use crate::domain::token::{Address, Amount};
use crate::ports::match_registry::{MatchInfo, MatchRegistry, MatchStatus};
use crate::ports::repository::{AuditRecord, LedgerEvent, Repository};
use crate::ports::token_transfer::TokenTransfer;

use super::token_store::SharedTokenStore;
use super::vault::Vault;

/// Result of settling one bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetSettlement {
  /// The settled bet.
  pub bet_id: BetId,
  /// Outcome after applying the handicap rule.
  pub outcome: HandicapOutcome,
  /// The winning backer, if the bet did not push.
  pub winner: Option<Address>,
  /// Amounts paid out of escrow, per recipient.
  pub payouts: Vec<(Address, Amount)>,
  /// House-edge revenue routed to the vault.
  pub fee_to_vault: Amount,
}

/// The handicap bet ledger.
pub struct HandicapLedger<T: TokenTransfer, M: MatchRegistry> {
  /// Custody account escrow is held under.
  address: Address,
  /// Fixed fee deducted from each party's stake at escrow time.
  fee: Amount,
  transfers: Arc<T>,
  registry: Arc<M>,
  store: SharedTokenStore,
  vault: Arc<Mutex<Vault<T>>>,
  bets: Vec<HandicapBet>,
  escrow: HashMap<Address, Amount>,
  audit: Option<Arc<dyn Repository>>,
}

impl<T: TokenTransfer, M: MatchRegistry> HandicapLedger<T, M> {
  /// Create a ledger.
  ///
  /// The ledger's own `address` must be granted the Game role on the
  /// vault before settlements can route house edge.
  pub fn new(
    address: Address,
    fee: Amount,
    transfers: Arc<T>,
    registry: Arc<M>,
    store: SharedTokenStore,
    vault: Arc<Mutex<Vault<T>>>,
  ) -> Self {
    Self {
      address,
      fee,
      transfers,
      registry,
      store,
      vault,
      bets: Vec::new(),
      escrow: HashMap::new(),
      audit: None,
    }
  }

  /// Attach an audit trail. Recording is best-effort.
  #[must_use]
  pub fn with_audit(mut self, audit: Arc<dyn Repository>) -> Self {
    self.audit = Some(audit);
    self
  }

  /// The ledger's custody address.
  pub const fn address(&self) -> Address {
    self.address
  }

  /// The fixed proposal fee.
  pub const fn fee(&self) -> Amount {
    self.fee
  }

  // ── Bet lifecycle ───────────────────────────────────────

  /// Propose a handicap bet, escrowing the gross stake.
  ///
  /// `chosen` is the side the proposer backs (or none, leaving the
  /// choice to the accepter). `odds` must be zero unless `stronger`
  /// names the conceding side. The gross stake must lie within the
  /// token's configured bet range and the match must not have started.
  pub async fn new_handicap_bet(
    &mut self,
    caller: &Address,
    match_id: &str,
    stronger: Option<Side>,
    chosen: Option<Side>,
    odds: u32,
    stake: Amount,
    token: &Address,
  ) -> Result<BetId, LedgerError> {
    {
      let store = self.store.read().await;
      store.ensure_active(token)?;
      store.ensure_bet_amount(token, stake)?;
    }
    if stake <= self.fee {
      return Err(LedgerError::StakeBelowFee { stake, fee: self.fee });
    }
    if odds > 0 && stronger.is_none() {
      return Err(LedgerError::OddsWithoutStronger);
    }

    let info = self.lookup_match(match_id).await?;
    match info.status {
      MatchStatus::Resolved => {
        return Err(LedgerError::MatchAlreadyResolved(match_id.to_string()));
      }
      MatchStatus::Canceled => {
        return Err(LedgerError::MatchCanceled(match_id.to_string()));
      }
      MatchStatus::Scheduled => {}
    }
    if info.has_started(Utc::now()) {
      return Err(LedgerError::MatchAlreadyStarted(match_id.to_string()));
    }

    self
      .transfers
      .transfer(token, caller, &self.address, stake)
      .await?;
    *self.escrow.entry(*token).or_insert(0) += stake;

    let id = self.bets.len() as BetId + 1;
    let bet = HandicapBet {
      id,
      propose_user: *caller,
      accept_user: None,
      match_detail: MatchDetail {
        match_id: match_id.to_string(),
        stronger,
        home_backer: (chosen == Some(Side::Home)).then_some(*caller),
        away_backer: (chosen == Some(Side::Away)).then_some(*caller),
      },
      terms: BetTerms {
        token: *token,
        amount: stake - self.fee,
        fee: self.fee,
        odds,
      },
      status: BetStatus::Proposed,
      outcome: None,
      proposed_at: Utc::now(),
      accepted_at: None,
      settled_at: None,
    };
    info!(
      bet_id = id,
      match_id,
      proposer = %caller,
      token = %token,
      amount = bet.terms.amount,
      fee = bet.terms.fee,
      odds,
      "Handicap bet proposed"
    );
    self
      .record(LedgerEvent::BetProposed {
        bet_id: id,
        token: *token,
        proposer: *caller,
        amount: bet.terms.amount,
        fee: bet.terms.fee,
      })
      .await;
    self.bets.push(bet);
    Ok(id)
  }

  /// Accept a proposed bet, escrowing the matching gross stake.
  ///
  /// The accepter backs `side`; if the proposer already backed a side,
  /// `side` must be the opposite one. The proposer is assigned whatever
  /// side remains, so the two backers are always mutually exclusive.
  pub async fn accept_handicap_bet(
    &mut self,
    caller: &Address,
    bet_id: BetId,
    side: Side,
  ) -> Result<(), LedgerError> {
    let (gross, token, match_id, proposer) = {
      let bet = self.bet(bet_id)?;
      match bet.status {
        BetStatus::Proposed => {}
        BetStatus::Accepted => return Err(LedgerError::AlreadyAccepted(bet_id)),
        BetStatus::Resolved | BetStatus::Canceled => {
          return Err(LedgerError::AlreadySettled(bet_id));
        }
      }
      if bet.propose_user == *caller {
        return Err(LedgerError::SelfAccept(bet_id));
      }
      if bet.match_detail.backer(side).is_some() {
        return Err(LedgerError::SideTaken(bet_id));
      }
      (
        bet.terms.gross(),
        bet.terms.token,
        bet.match_detail.match_id.clone(),
        bet.propose_user,
      )
    };

    let info = self.lookup_match(&match_id).await?;
    match info.status {
      MatchStatus::Resolved => {
        return Err(LedgerError::MatchAlreadyResolved(match_id));
      }
      MatchStatus::Canceled => return Err(LedgerError::MatchCanceled(match_id)),
      MatchStatus::Scheduled => {}
    }

    self
      .transfers
      .transfer(&token, caller, &self.address, gross)
      .await?;
    *self.escrow.entry(token).or_insert(0) += gross;

    let accepter = *caller;
    let bet = self.bet_mut(bet_id)?;
    bet.accept_user = Some(accepter);
    match side {
      Side::Home => {
        bet.match_detail.home_backer = Some(accepter);
        bet.match_detail.away_backer.get_or_insert(proposer);
      }
      Side::Away => {
        bet.match_detail.away_backer = Some(accepter);
        bet.match_detail.home_backer.get_or_insert(proposer);
      }
    }
    bet.status = BetStatus::Accepted;
    bet.accepted_at = Some(Utc::now());
    info!(
      bet_id,
      accepter = %accepter,
      side = %side,
      "Handicap bet accepted"
    );
    self
      .record(LedgerEvent::BetAccepted { bet_id, accepter })
      .await;
    Ok(())
  }

  /// Withdraw an unaccepted bet, refunding the gross stake.
  pub async fn cancel_handicap_bet(
    &mut self,
    caller: &Address,
    bet_id: BetId,
  ) -> Result<(), LedgerError> {
    let (gross, token) = {
      let bet = self.bet(bet_id)?;
      match bet.status {
        BetStatus::Proposed => {}
        BetStatus::Accepted => return Err(LedgerError::AlreadyAccepted(bet_id)),
        BetStatus::Resolved | BetStatus::Canceled => {
          return Err(LedgerError::AlreadySettled(bet_id));
        }
      }
      if bet.propose_user != *caller {
        return Err(LedgerError::NotProposer(bet_id));
      }
      (bet.terms.gross(), bet.terms.token)
    };

    self
      .transfers
      .transfer(&token, &self.address, caller, gross)
      .await?;
    self.debit_escrow(&token, gross)?;

    let bet = self.bet_mut(bet_id)?;
    bet.status = BetStatus::Canceled;
    bet.settled_at = Some(Utc::now());
    info!(bet_id, proposer = %caller, "Handicap bet canceled");
    self.record(LedgerEvent::BetCanceled { bet_id }).await;
    Ok(())
  }

  /// Settle an accepted bet against the recorded match result.
  ///
  /// Callable by anyone. Fails with a retriable upstream error while
  /// the registry has no result; fails with a state conflict once the
  /// bet is settled. A canceled match settles as a push.
  pub async fn resolve_handicap_bet(
    &mut self,
    bet_id: BetId,
  ) -> Result<BetSettlement, LedgerError> {
    let bet = {
      let bet = self.bet(bet_id)?;
      match bet.status {
        BetStatus::Accepted => {}
        BetStatus::Proposed => return Err(LedgerError::NotAccepted(bet_id)),
        BetStatus::Resolved | BetStatus::Canceled => {
          return Err(LedgerError::AlreadySettled(bet_id));
        }
      }
      bet.clone()
    };

    let info = self.lookup_match(&bet.match_detail.match_id).await?;
    let outcome = match info.status {
      MatchStatus::Scheduled => {
        return Err(LedgerError::MatchNotResolved(bet.match_detail.match_id));
      }
      // A called-off match settles as a dead heat.
      MatchStatus::Canceled => HandicapOutcome::Push,
      MatchStatus::Resolved => settle(
        info.home_score,
        info.away_score,
        bet.match_detail.stronger,
        bet.terms.odds,
      ),
    };

    let token = bet.terms.token;
    let amount = bet.terms.amount;
    let fee_to_vault = 2 * bet.terms.fee;
    // Both backers are set on an accepted bet; fall back to the parties
    // themselves to keep the types total.
    let home = bet.match_detail.home_backer.unwrap_or(bet.propose_user);
    let away = bet
      .match_detail
      .away_backer
      .or(bet.accept_user)
      .unwrap_or(bet.propose_user);

    let (winner, payouts): (Option<Address>, Vec<(Address, Amount)>) = match outcome {
      HandicapOutcome::HomeWins => (Some(home), vec![(home, 2 * amount)]),
      HandicapOutcome::AwayWins => (Some(away), vec![(away, 2 * amount)]),
      HandicapOutcome::Push => (None, vec![(home, amount), (away, amount)]),
    };

    let mut vault = self.vault.lock().await;
    if !vault.has_role(&self.address, Role::Game) {
      return Err(LedgerError::MissingRole {
        account: self.address,
        role: Role::Game.to_string(),
      });
    }

    for (recipient, paid) in &payouts {
      self
        .transfers
        .transfer(&token, &self.address, recipient, *paid)
        .await?;
    }
    self
      .transfers
      .transfer(&token, &self.address, &vault.address(), fee_to_vault)
      .await?;
    vault
      .credit_house_edge(&self.address, &token, fee_to_vault)
      .await?;
    drop(vault);

    self.debit_escrow(&token, 2 * bet.terms.gross())?;

    let bet = self.bet_mut(bet_id)?;
    bet.status = BetStatus::Resolved;
    bet.outcome = Some(outcome);
    bet.settled_at = Some(Utc::now());
    info!(
      bet_id,
      ?outcome,
      winner = winner.map(|w| w.to_string()).unwrap_or_else(|| "push".into()),
      fee_to_vault,
      "Handicap bet resolved"
    );
    self
      .record(LedgerEvent::BetResolved {
        bet_id,
        outcome,
        fee_to_vault,
      })
      .await;
    Ok(BetSettlement {
      bet_id,
      outcome,
      winner,
      payouts,
      fee_to_vault,
    })
  }

  // ── Read-only state ─────────────────────────────────────

  /// The bet with `bet_id`.
  pub fn bet(&self, bet_id: BetId) -> Result<&HandicapBet, LedgerError> {
    bet_id
      .checked_sub(1)
      .and_then(|idx| self.bets.get(idx as usize))
      .ok_or(LedgerError::BetNotFound(bet_id))
  }

  /// The most recent `n` bets, newest first.
  pub fn get_last_handicap_bets(&self, n: usize) -> Vec<HandicapBet> {
    self.bets.iter().rev().take(n).cloned().collect()
  }

  /// The most recent `n` bets involving `user`, newest first.
  pub fn get_last_user_handicap_bets(&self, n: usize, user: &Address) -> Vec<HandicapBet> {
    self
      .bets
      .iter()
      .rev()
      .filter(|bet| bet.involves(user))
      .take(n)
      .cloned()
      .collect()
  }

  /// Escrow currently held for `token`.
  pub fn escrow_balance(&self, token: &Address) -> Amount {
    self.escrow.get(token).copied().unwrap_or(0)
  }

  /// Escrow implied by bet state: one gross stake per proposed bet,
  /// two per accepted bet. Always equals `escrow_balance`.
  pub fn outstanding_escrow(&self, token: &Address) -> Amount {
    self
      .bets
      .iter()
      .filter(|bet| bet.terms.token == *token)
      .map(HandicapBet::escrowed)
      .sum()
  }

  // ── Internals ───────────────────────────────────────────

  fn bet_mut(&mut self, bet_id: BetId) -> Result<&mut HandicapBet, LedgerError> {
    bet_id
      .checked_sub(1)
      .and_then(|idx| self.bets.get_mut(idx as usize))
      .ok_or(LedgerError::BetNotFound(bet_id))
  }

  async fn lookup_match(&self, match_id: &str) -> Result<MatchInfo, LedgerError> {
    self
      .registry
      .match_info(match_id)
      .await
      .map_err(|e| LedgerError::RegistryUnavailable(e.to_string()))?
      .ok_or_else(|| LedgerError::MatchNotFound(match_id.to_string()))
  }

  fn debit_escrow(&mut self, token: &Address, amount: Amount) -> Result<(), LedgerError> {
    let held = self.escrow.entry(*token).or_insert(0);
    if amount > *held {
      return Err(LedgerError::InsufficientEscrow {
        token: *token,
        held: *held,
        requested: amount,
      });
    }
    *held -= amount;
    Ok(())
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
