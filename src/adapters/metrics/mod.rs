//! Metrics and Monitoring Adapters
//!
//! Provides a central Prometheus registry for ledger observability,
//! exported via text exposition (scrape-file or push style) — serving
//! it over HTTP is an outer-transport concern this crate stays out of.

pub mod prometheus;

pub use prometheus::LedgerMetrics;
