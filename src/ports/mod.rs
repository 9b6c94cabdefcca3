//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `TokenTransfer`: custody movement (the execution-environment seam)
//! - `MatchRegistry`: oracle-reported match results, pull-based
//! - `Repository`: append-only audit trail (JSONL-based)

pub mod match_registry;
pub mod repository;
pub mod token_transfer;
