//! Match Registry Port - Oracle-Reported Match Results
//!
//! The bet ledger never owns match data: it pulls current match state
//! from an injected registry at propose time (match must not have
//! started) and at resolve time (match must carry a recorded result).
//! Randomness/oracle logic stays outside the ledger entirely.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::bet::MatchId;

/// Reported lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
  /// Known to the registry, result not yet recorded.
  Scheduled,
  /// Final result recorded; scores are authoritative.
  Resolved,
  /// Called off; no result will ever be recorded.
  Canceled,
}

/// A match as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
  /// Registry id referenced by bets.
  pub id: MatchId,
  /// Scheduled kick-off time.
  pub start_time: DateTime<Utc>,
  /// Home team display name.
  pub home_name: String,
  /// Away team display name.
  pub away_name: String,
  /// Final home score; zero until resolved.
  pub home_score: u32,
  /// Final away score; zero until resolved.
  pub away_score: u32,
  /// Current lifecycle status.
  pub status: MatchStatus,
}

impl MatchInfo {
  /// Whether the scheduled kick-off has passed at `now`.
  pub fn has_started(&self, now: DateTime<Utc>) -> bool {
    now >= self.start_time
  }
}

/// Trait for pull-based access to oracle-reported match state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRegistry: Send + Sync + 'static {
  /// Current state of the match with `id`, or `None` if unknown.
  ///
  /// An `Err` means the registry itself is unreachable, which the
  /// ledger surfaces as a retriable upstream error.
  async fn match_info(&self, id: &str) -> anyhow::Result<Option<MatchInfo>>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_has_started() {
    let now = Utc::now();
    let info = MatchInfo {
      id: "m1".to_string(),
      start_time: now + Duration::hours(1),
      home_name: "hn".to_string(),
      away_name: "hcm".to_string(),
      home_score: 0,
      away_score: 0,
      status: MatchStatus::Scheduled,
    };
    assert!(!info.has_started(now));
    assert!(info.has_started(now + Duration::hours(2)));
  }
}
