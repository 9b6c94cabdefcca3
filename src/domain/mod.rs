//! Domain layer - Core business logic and models.
//!
//! Pure ledger logic: addresses and fixed-point amounts, liquidity
//! share math, house-edge splitting, the handicap settlement rule, bet
//! records, role predicates, and the error taxonomy. No I/O here
//! (hexagonal architecture inner ring); everything is testable in
//! isolation.

pub mod bet;
pub mod error;
pub mod fees;
pub mod handicap;
pub mod roles;
pub mod shares;
pub mod token;

// Re-export core types for convenience
pub use bet::{BetId, BetStatus, BetTerms, HandicapBet, MatchDetail, MatchId};
pub use error::{ErrorKind, LedgerError};
pub use fees::{FeeAllocation, HouseEdgeSplit, SPLIT_DENOMINATOR};
pub use handicap::{HandicapOutcome, Side, settle};
pub use roles::{Role, RoleStore};
pub use shares::TokenPool;
pub use token::{Address, Amount, UNIT};
