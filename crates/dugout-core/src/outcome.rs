//! Per-game ingestion outcomes and items queued for offline review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::box_score::{PlayerId, Side};

/// Terminal state of one game within an ingestion run.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
  /// Validated without hard errors and persisted.
  Accepted,
  /// Extracted but failed validation; kept aside, not persisted as a game.
  Quarantined,
  /// No box score exists on the page (postponed, rained out, not yet played).
  NoData,
  /// Transport failures exhausted the retry budget.
  FailedTransient,
  /// Anything else, e.g. a malformed game id or a store failure.
  Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
  pub run_id:      Uuid,
  pub game_id:     String,
  pub status:      GameStatus,
  pub attempts:    u32,
  /// Validation errors, warnings or the failure message, depending on status.
  pub messages:    Vec<String>,
  pub recorded_at: DateTime<Utc>,
}

/// Totals for one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
  pub run_id:           Uuid,
  pub started_at:       DateTime<Utc>,
  pub finished_at:      DateTime<Utc>,
  pub total:            u32,
  pub accepted:         u32,
  pub quarantined:      u32,
  pub no_data:          u32,
  pub failed_transient: u32,
  pub failed:           u32,
}

impl RunSummary {
  pub fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
    Self {
      run_id,
      started_at,
      finished_at: started_at,
      total: 0,
      accepted: 0,
      quarantined: 0,
      no_data: 0,
      failed_transient: 0,
      failed: 0,
    }
  }

  pub fn count(&mut self, status: GameStatus) {
    self.total += 1;
    match status {
      GameStatus::Accepted => self.accepted += 1,
      GameStatus::Quarantined => self.quarantined += 1,
      GameStatus::NoData => self.no_data += 1,
      GameStatus::FailedTransient => self.failed_transient += 1,
      GameStatus::Failed => self.failed += 1,
    }
  }
}

// ─── Review queue ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewKind {
  /// A team token that resolved to no franchise for the season.
  UnresolvedTeam { token: String },
  /// Several roster entries share the player's name.
  AmbiguousPlayer { candidates: Vec<PlayerId> },
  /// No roster entry matched the player's name.
  UnknownPlayer,
}

/// Something ingestion left unresolved rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
  pub game_id:   String,
  pub side:      Side,
  /// Player name or team token as printed.
  pub subject:   String,
  pub team_code: Option<String>,
  pub season:    Option<i32>,
  #[serde(flatten)]
  pub kind:      ReviewKind,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary_counts_each_status() {
    let mut s = RunSummary::new(Uuid::new_v4(), Utc::now());
    for status in [
      GameStatus::Accepted,
      GameStatus::Accepted,
      GameStatus::NoData,
      GameStatus::FailedTransient,
    ] {
      s.count(status);
    }
    assert_eq!((s.total, s.accepted, s.no_data, s.failed_transient), (4, 2, 1, 1));
    assert_eq!(s.quarantined + s.failed, 0);
  }

  #[test]
  fn review_kind_is_flattened_into_the_item() {
    let item = ReviewItem {
      game_id:   "20240323HHLG0".to_string(),
      side:      Side::Home,
      subject:   "김민수".to_string(),
      team_code: Some("LG".to_string()),
      season:    Some(2024),
      kind:      ReviewKind::AmbiguousPlayer {
        candidates: vec![PlayerId(1), PlayerId(2)],
      },
    };
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["kind"], "ambiguous_player");
    assert_eq!(json["candidates"], serde_json::json!([1, 2]));
    let back: ReviewItem = serde_json::from_value(json).unwrap();
    assert_eq!(back, item);
  }

  #[test]
  fn status_names_are_snake_case() {
    assert_eq!(GameStatus::FailedTransient.as_ref(), "failed_transient");
    assert_eq!("no_data".parse::<GameStatus>().unwrap(), GameStatus::NoData);
  }
}
