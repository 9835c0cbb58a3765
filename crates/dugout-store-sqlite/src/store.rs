//! [`SqliteStore`]: the SQLite implementation of [`GameSink`] and
//! [`RosterLookup`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use dugout_core::{
  box_score::{BoxScore, PlayerId},
  outcome::{OutcomeRecord, ReviewItem, ReviewKind, RunSummary},
  roster::{RosterCandidate, RosterLookup, RosterQuery},
  store::GameSink,
  validate::ValidationResult,
};

use crate::{
  Result,
  encode::{
    RawOutcome, RawRun, RawStoredGame, encode_date, encode_dt, encode_messages, encode_uuid,
  },
  schema::SCHEMA,
};

/// A box score read back from the store, with the validation it was stored
/// under.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGame {
  pub box_score:  BoxScore,
  pub validation: ValidationResult,
  pub stored_at:  DateTime<Utc>,
}

/// One player on one team's roster for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
  pub player_id:   PlayerId,
  pub name:        String,
  pub team_code:   String,
  pub season_year: i32,
  pub uniform_no:  Option<String>,
}

fn review_kind(kind: &ReviewKind) -> &'static str {
  match kind {
    ReviewKind::UnresolvedTeam { .. } => "unresolved_team",
    ReviewKind::AmbiguousPlayer { .. } => "ambiguous_player",
    ReviewKind::UnknownPlayer => "unknown_player",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Dugout store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  /// Insert or replace a roster entry.
  pub async fn add_roster_entry(&self, entry: RosterEntry) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO roster (player_id, name, team_code, season_year, uniform_no)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (player_id, team_code, season_year) DO UPDATE SET
             name = excluded.name,
             uniform_no = excluded.uniform_no",
          rusqlite::params![
            entry.player_id.0,
            entry.name.trim(),
            entry.team_code,
            entry.season_year,
            entry.uniform_no,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The accepted copy of a game, if any.
  pub async fn load_game(&self, game_id: &str) -> Result<Option<StoredGame>> {
    let game_id = game_id.to_string();
    let raw: Option<RawStoredGame> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT box_score_json, warnings_json, saved_at FROM games WHERE game_id = ?1",
              rusqlite::params![game_id],
              |row| {
                Ok(RawStoredGame {
                  box_score_json: row.get(0)?,
                  errors_json:    None,
                  warnings_json:  row.get(1)?,
                  stored_at:      row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStoredGame::into_stored).transpose()
  }

  /// The quarantined copy of a game, if any.
  pub async fn load_quarantined(&self, game_id: &str) -> Result<Option<StoredGame>> {
    let game_id = game_id.to_string();
    let raw: Option<RawStoredGame> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT box_score_json, errors_json, warnings_json, quarantined_at
               FROM quarantine WHERE game_id = ?1",
              rusqlite::params![game_id],
              |row| {
                Ok(RawStoredGame {
                  box_score_json: row.get(0)?,
                  errors_json:    Some(row.get(1)?),
                  warnings_json:  row.get(2)?,
                  stored_at:      row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStoredGame::into_stored).transpose()
  }

  /// Outcomes recorded for a run, in recording order.
  pub async fn outcomes(&self, run_id: Uuid) -> Result<Vec<OutcomeRecord>> {
    let run_id = encode_uuid(run_id);
    let raws: Vec<RawOutcome> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT run_id, game_id, status, attempts, messages_json, recorded_at
           FROM ingest_outcomes WHERE run_id = ?1 ORDER BY outcome_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![run_id], |row| {
            Ok(RawOutcome {
              run_id:        row.get(0)?,
              game_id:       row.get(1)?,
              status:        row.get(2)?,
              attempts:      row.get(3)?,
              messages_json: row.get(4)?,
              recorded_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawOutcome::into_outcome).collect()
  }

  /// Review items flagged for a game, in flagging order.
  pub async fn review_items(&self, game_id: &str) -> Result<Vec<ReviewItem>> {
    let game_id = game_id.to_string();
    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT item_json FROM review_items WHERE game_id = ?1 ORDER BY review_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![game_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    raws
      .iter()
      .map(|json| Ok(serde_json::from_str(json)?))
      .collect()
  }

  pub async fn run_summary(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
    let run_id = encode_uuid(run_id);
    let raw: Option<RawRun> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT run_id, started_at, finished_at, total, accepted, quarantined,
                      no_data, failed_transient, failed
               FROM ingest_runs WHERE run_id = ?1",
              rusqlite::params![run_id],
              |row| {
                Ok(RawRun {
                  run_id:      row.get(0)?,
                  started_at:  row.get(1)?,
                  finished_at: row.get(2)?,
                  counts:      [
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                  ],
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawRun::into_summary).transpose()
  }
}

// ─── GameSink impl ───────────────────────────────────────────────────────────

impl GameSink for SqliteStore {
  type Error = crate::Error;

  async fn save_game(&self, box_score: BoxScore, validation: ValidationResult) -> Result<()> {
    let game_id        = box_score.game_id.clone();
    let game_date      = box_score.game_date.map(encode_date);
    let era            = box_score.era.to_string();
    let away_code      = box_score.teams.away.resolved_code.clone();
    let home_code      = box_score.teams.home.resolved_code.clone();
    let away_score     = box_score.teams.away.score;
    let home_score     = box_score.teams.home.score;
    let box_score_json = serde_json::to_string(&box_score)?;
    let warnings_json  = encode_messages(&validation.warnings)?;
    let saved_at       = encode_dt(Utc::now());

    debug!(game_id, "saving game");
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO games (
             game_id, game_date, era, away_code, home_code, away_score, home_score,
             box_score_json, warnings_json, saved_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT (game_id) DO UPDATE SET
             game_date = excluded.game_date,
             era = excluded.era,
             away_code = excluded.away_code,
             home_code = excluded.home_code,
             away_score = excluded.away_score,
             home_score = excluded.home_score,
             box_score_json = excluded.box_score_json,
             warnings_json = excluded.warnings_json,
             saved_at = excluded.saved_at",
          rusqlite::params![
            game_id,
            game_date,
            era,
            away_code,
            home_code,
            away_score,
            home_score,
            box_score_json,
            warnings_json,
            saved_at,
          ],
        )?;
        tx.execute(
          "DELETE FROM quarantine WHERE game_id = ?1",
          rusqlite::params![game_id],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn quarantine_game(
    &self,
    box_score: BoxScore,
    validation: ValidationResult,
  ) -> Result<()> {
    let game_id        = box_score.game_id.clone();
    let box_score_json = serde_json::to_string(&box_score)?;
    let errors_json    = encode_messages(&validation.errors)?;
    let warnings_json  = encode_messages(&validation.warnings)?;
    let at             = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO quarantine (
             game_id, box_score_json, errors_json, warnings_json, quarantined_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (game_id) DO UPDATE SET
             box_score_json = excluded.box_score_json,
             errors_json = excluded.errors_json,
             warnings_json = excluded.warnings_json,
             quarantined_at = excluded.quarantined_at",
          rusqlite::params![game_id, box_score_json, errors_json, warnings_json, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_outcome(&self, outcome: OutcomeRecord) -> Result<()> {
    let run_id        = encode_uuid(outcome.run_id);
    let status        = outcome.status.to_string();
    let messages_json = encode_messages(&outcome.messages)?;
    let recorded_at   = encode_dt(outcome.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ingest_outcomes (
             run_id, game_id, status, attempts, messages_json, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            run_id,
            outcome.game_id,
            status,
            outcome.attempts,
            messages_json,
            recorded_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn flag_for_review(&self, items: Vec<ReviewItem>) -> Result<()> {
    if items.is_empty() {
      return Ok(());
    }
    let flagged_at = encode_dt(Utc::now());
    let rows = items
      .iter()
      .map(|item| {
        Ok((
          item.game_id.clone(),
          item.side.to_string(),
          item.subject.clone(),
          review_kind(&item.kind),
          serde_json::to_string(item)?,
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO review_items (game_id, side, subject, kind, item_json, flagged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (game_id, side, subject, kind, json) in &rows {
            stmt.execute(rusqlite::params![game_id, side, subject, kind, json, flagged_at])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_run(&self, summary: RunSummary) -> Result<()> {
    let run_id      = encode_uuid(summary.run_id);
    let started_at  = encode_dt(summary.started_at);
    let finished_at = encode_dt(summary.finished_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO ingest_runs (
             run_id, started_at, finished_at, total, accepted, quarantined,
             no_data, failed_transient, failed
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            run_id,
            started_at,
            finished_at,
            summary.total,
            summary.accepted,
            summary.quarantined,
            summary.no_data,
            summary.failed_transient,
            summary.failed,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RosterLookup impl ───────────────────────────────────────────────────────

impl RosterLookup for SqliteStore {
  type Error = crate::Error;

  async fn lookup(&self, query: RosterQuery) -> Result<Vec<RosterCandidate>> {
    let candidates = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT player_id, uniform_no FROM roster
           WHERE name = ?1 AND team_code = ?2 AND season_year = ?3
           ORDER BY player_id",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![query.name.trim(), query.team_code, query.season_year],
            |row| {
              Ok(RosterCandidate {
                player_id:  PlayerId(row.get(0)?),
                uniform_no: row.get(1)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(candidates)
  }
}
