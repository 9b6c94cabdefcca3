//! In-Memory Match Registry — Oracle Adapter
//!
//! Implements the `MatchRegistry` port over a plain map, playing the
//! role the oracle-fulfillment hooks played in the original fixtures:
//! an operator creates matches ahead of kick-off and records final
//! scores once they are known.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::bet::MatchId;
use crate::ports::match_registry::{MatchInfo, MatchRegistry, MatchStatus};

/// Operator-fed match registry.
#[derive(Debug, Default)]
pub struct InMemoryMatchRegistry {
    matches: RwLock<HashMap<MatchId, MatchInfo>>,
}

impl InMemoryMatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an upcoming match.
    pub async fn create_match(
        &self,
        id: &str,
        start_time: DateTime<Utc>,
        home_name: &str,
        away_name: &str,
    ) {
        let mut matches = self.matches.write().await;
        matches.insert(
            id.to_string(),
            MatchInfo {
                id: id.to_string(),
                start_time,
                home_name: home_name.to_string(),
                away_name: away_name.to_string(),
                home_score: 0,
                away_score: 0,
                status: MatchStatus::Scheduled,
            },
        );
    }

    /// Record the final score, flipping the match to resolved.
    pub async fn record_result(
        &self,
        id: &str,
        home_score: u32,
        away_score: u32,
    ) -> anyhow::Result<()> {
        let mut matches = self.matches.write().await;
        let info = matches
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("unknown match: {id}"))?;
        info.home_score = home_score;
        info.away_score = away_score;
        info.status = MatchStatus::Resolved;
        Ok(())
    }

    /// Call a match off; it will never carry a result.
    pub async fn cancel_match(&self, id: &str) -> anyhow::Result<()> {
        let mut matches = self.matches.write().await;
        let info = matches
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("unknown match: {id}"))?;
        info.status = MatchStatus::Canceled;
        Ok(())
    }
}

#[async_trait]
impl MatchRegistry for InMemoryMatchRegistry {
    async fn match_info(&self, id: &str) -> anyhow::Result<Option<MatchInfo>> {
        let matches = self.matches.read().await;
        Ok(matches.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_unknown_match_is_none() {
        let registry = InMemoryMatchRegistry::new();
        assert!(registry.match_info("nope").await.unwrap().is_none());
        assert!(registry.record_result("nope", 1, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_create_then_resolve() {
        let registry = InMemoryMatchRegistry::new();
        registry
            .create_match("m1", Utc::now() + Duration::hours(1), "hn", "hcm")
            .await;

        let info = registry.match_info("m1").await.unwrap().unwrap();
        assert_eq!(info.status, MatchStatus::Scheduled);
        assert_eq!(info.home_name, "hn");

        registry.record_result("m1", 0, 11).await.unwrap();
        let info = registry.match_info("m1").await.unwrap().unwrap();
        assert_eq!(info.status, MatchStatus::Resolved);
        assert_eq!((info.home_score, info.away_score), (0, 11));
    }

    #[tokio::test]
    async fn test_cancel_match() {
        let registry = InMemoryMatchRegistry::new();
        registry
            .create_match("m1", Utc::now() + Duration::hours(1), "hn", "hcm")
            .await;
        registry.cancel_match("m1").await.unwrap();
        let info = registry.match_info("m1").await.unwrap().unwrap();
        assert_eq!(info.status, MatchStatus::Canceled);
    }
}
