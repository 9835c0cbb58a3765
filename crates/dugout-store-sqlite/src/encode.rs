//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, dates `YYYY-MM-DD`, UUIDs hyphenated
//! lowercase strings. Box scores and message lists are compact JSON.

use chrono::{DateTime, NaiveDate, Utc};
use dugout_core::{
  box_score::BoxScore,
  outcome::{GameStatus, OutcomeRecord, RunSummary},
  validate::ValidationResult,
};
use uuid::Uuid;

use crate::{Error, Result, store::StoredGame};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_status(s: &str) -> Result<GameStatus> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "status",
    value:  s.to_string(),
  })
}

pub fn encode_messages(messages: &[String]) -> Result<String> {
  Ok(serde_json::to_string(messages)?)
}

pub fn decode_messages(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Raw columns of a `games` or `quarantine` row.
pub struct RawStoredGame {
  pub box_score_json: String,
  pub errors_json:    Option<String>,
  pub warnings_json:  String,
  pub stored_at:      String,
}

impl RawStoredGame {
  pub fn into_stored(self) -> Result<StoredGame> {
    let box_score: BoxScore = serde_json::from_str(&self.box_score_json)?;
    let errors = self
      .errors_json
      .as_deref()
      .map(decode_messages)
      .transpose()?
      .unwrap_or_default();
    Ok(StoredGame {
      box_score,
      validation: ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings: decode_messages(&self.warnings_json)?,
      },
      stored_at: decode_dt(&self.stored_at)?,
    })
  }
}

/// Raw columns of an `ingest_outcomes` row.
pub struct RawOutcome {
  pub run_id:        String,
  pub game_id:       String,
  pub status:        String,
  pub attempts:      u32,
  pub messages_json: String,
  pub recorded_at:   String,
}

impl RawOutcome {
  pub fn into_outcome(self) -> Result<OutcomeRecord> {
    Ok(OutcomeRecord {
      run_id:      decode_uuid(&self.run_id)?,
      game_id:     self.game_id,
      status:      decode_status(&self.status)?,
      attempts:    self.attempts,
      messages:    decode_messages(&self.messages_json)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw columns of an `ingest_runs` row.
pub struct RawRun {
  pub run_id:      String,
  pub started_at:  String,
  pub finished_at: String,
  /// total, accepted, quarantined, no_data, failed_transient, failed
  pub counts:      [u32; 6],
}

impl RawRun {
  pub fn into_summary(self) -> Result<RunSummary> {
    let [total, accepted, quarantined, no_data, failed_transient, failed] = self.counts;
    Ok(RunSummary {
      run_id: decode_uuid(&self.run_id)?,
      started_at: decode_dt(&self.started_at)?,
      finished_at: decode_dt(&self.finished_at)?,
      total,
      accepted,
      quarantined,
      no_data,
      failed_transient,
      failed,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_round_trips_through_its_column_text() {
    assert_eq!(GameStatus::FailedTransient.as_ref(), "failed_transient");
    assert_eq!(decode_status("no_data").unwrap(), GameStatus::NoData);
    assert!(matches!(
      decode_status("exploded"),
      Err(Error::UnknownValue { column: "status", .. })
    ));
  }

  #[test]
  fn dates_are_iso() {
    let d = NaiveDate::from_ymd_opt(1982, 3, 27).unwrap();
    assert_eq!(encode_date(d), "1982-03-27");
  }
}
