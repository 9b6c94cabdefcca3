//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! ledger's core workflows. The three components of the system live
//! here, each a self-contained state machine:
//!
//! - `TokenStore`: administrative configuration surface, shared by the
//!   other two behind a read/write lock
//! - `Vault`: pooled custody, share accounting, house-edge splitting,
//!   and the role-gated game payout seam
//! - `HandicapLedger`: escrow, matching, and settlement of two-party
//!   handicap bets

pub mod bet_ledger;
pub mod token_store;
pub mod vault;

pub use bet_ledger::{BetSettlement, HandicapLedger};
pub use token_store::{SharedTokenStore, TokenSettings, TokenStore, shared_store};
pub use vault::{FeeBuckets, HarvestReport, Vault};
