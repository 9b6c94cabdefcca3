//! JSONL Audit Log — Concrete Adapter for the Repository Port
//!
//! Append-only `events.jsonl`: one self-contained JSON record per
//! line. Easy to stream, grep, and recover from partial writes; the
//! load path skips a trailing torn line rather than failing the whole
//! trail.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::ports::repository::{AuditRecord, Repository};

/// File name of the audit trail inside the data directory.
const AUDIT_FILE: &str = "events.jsonl";

/// JSONL-backed audit trail.
pub struct JsonlAuditLog {
    path: PathBuf,
    /// Serializes appends so concurrent writers cannot interleave lines.
    write_lock: Mutex<()>,
}

impl JsonlAuditLog {
    /// Open (creating if needed) the audit trail under `data_dir`.
    pub async fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        Ok(Self {
            path: dir.join(AUDIT_FILE),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the underlying JSONL file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Repository for JsonlAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to encode audit record")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .context("Failed to append audit record")?;
        file.flush().await.context("Failed to flush audit log")?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<AuditRecord>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // A torn final line from a crash is recoverable; skip it.
                    warn!(line = i + 1, error = %e, "Skipping malformed audit line");
                }
            }
        }
        Ok(records)
    }

    async fn is_healthy(&self) -> bool {
        match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Audit log unhealthy");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::Address;
    use crate::ports::repository::LedgerEvent;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("equalbets-audit-{tag}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn test_append_then_load_roundtrip() {
        let dir = temp_dir("roundtrip");
        let log = JsonlAuditLog::from_data_dir(&dir).await.unwrap();

        let first = AuditRecord::new(LedgerEvent::TokenAdded { token: Address::ZERO });
        let second = AuditRecord::new(LedgerEvent::Deposit {
            token: Address::from_low_u64(0x32),
            user: Address::from_low_u64(2),
            amount: 20_000_000_000_000_000_000, // 20.0 tokens
            shares: 20_000_000_000_000_000_000,
        });
        let third = AuditRecord::new(LedgerEvent::BetCanceled { bet_id: 7 });
        log.append(&first).await.unwrap();
        log.append(&second).await.unwrap();
        log.append(&third).await.unwrap();

        let loaded = log.load_all().await.unwrap();
        assert_eq!(loaded, vec![first, second, third]);

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = temp_dir("empty");
        let log = JsonlAuditLog::from_data_dir(&dir).await.unwrap();
        assert!(log.load_all().await.unwrap().is_empty());
        assert!(log.is_healthy().await);
        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_torn_line_is_skipped() {
        let dir = temp_dir("torn");
        let log = JsonlAuditLog::from_data_dir(&dir).await.unwrap();
        let record = AuditRecord::new(LedgerEvent::BetCanceled { bet_id: 1 });
        log.append(&record).await.unwrap();

        // Simulate a crash mid-append.
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .await
            .unwrap();
        file.write_all(b"{\"type\":\"bet_c").await.unwrap();
        file.flush().await.unwrap();

        let loaded = log.load_all().await.unwrap();
        assert_eq!(loaded, vec![record]);

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
