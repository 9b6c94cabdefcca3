//! Repository Port - Audit Trail Interface
//!
//! Defines the trait for persisting committed ledger events using JSONL
//! files. No database dependency - lightweight append-only log format
//! optimized for audit trails. Recording is best-effort: a failed append
//! must never poison an already-committed ledger operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::bet::BetId;
use crate::domain::handicap::HandicapOutcome;
use crate::domain::token::{Address, Amount};

/// A committed ledger event worth auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
  /// A token was registered on the vault.
  TokenAdded { token: Address },
  /// Liquidity deposited; shares minted.
  Deposit {
    token: Address,
    user: Address,
    amount: Amount,
    shares: Amount,
  },
  /// Shares burned; liquidity withdrawn.
  Withdrawal {
    token: Address,
    user: Address,
    shares: Amount,
    amount: Amount,
  },
  /// A handicap bet was proposed and escrowed.
  BetProposed {
    bet_id: BetId,
    token: Address,
    proposer: Address,
    amount: Amount,
    fee: Amount,
  },
  /// The counterparty stake was escrowed.
  BetAccepted { bet_id: BetId, accepter: Address },
  /// The proposer withdrew an unaccepted bet.
  BetCanceled { bet_id: BetId },
  /// The bet settled against the recorded match result.
  BetResolved {
    bet_id: BetId,
    outcome: HandicapOutcome,
    fee_to_vault: Amount,
  },
  /// A game routed house-edge revenue into the vault.
  HouseEdgeCredited { token: Address, amount: Amount },
  /// Accumulated fee buckets were drained.
  FeesHarvested { token: Address },
}

/// An audit record: one event with identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
  /// Unique record id.
  pub id: Uuid,
  /// When the event was recorded.
  pub timestamp: DateTime<Utc>,
  /// The event itself.
  pub event: LedgerEvent,
}

impl AuditRecord {
  /// Stamp an event with identity and the current time.
  pub fn new(event: LedgerEvent) -> Self {
    Self {
      id: Uuid::new_v4(),
      timestamp: Utc::now(),
      event,
    }
  }
}

/// Trait for audit-trail persistence providers.
///
/// Uses JSONL (JSON Lines) format for append-only logging: each line is
/// a self-contained record, easy to stream and to recover from partial
/// writes.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
  /// Append one record to the trail.
  async fn append(&self, record: &AuditRecord) -> anyhow::Result<()>;

  /// Load the full trail in append order.
  async fn load_all(&self) -> anyhow::Result<Vec<AuditRecord>>;

  /// Check the provider is writable (disk space, permissions).
  async fn is_healthy(&self) -> bool;
}
