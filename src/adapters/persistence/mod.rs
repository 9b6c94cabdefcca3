//! Persistence Adapters - JSONL-based File Storage
//!
//! Implements the Repository port using an append-only JSONL file for
//! the ledger's audit trail. No database dependency — lightweight and
//! crash-recoverable.

pub mod audit_log;

pub use audit_log::JsonlAuditLog;
