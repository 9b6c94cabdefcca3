//! EqualBets Ledger — Library Root
//!
//! Liquidity vault and handicap bet ledger for two-sided sports
//! wagers. Re-exports all modules for integration tests and
//! benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
