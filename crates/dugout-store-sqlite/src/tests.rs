//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use dugout_core::{
  box_score::{
    BattingStats, BoxScore, Era, PlayerBattingRow, PlayerId, Side, TeamLine,
  },
  outcome::{GameStatus, OutcomeRecord, ReviewItem, ReviewKind, RunSummary},
  roster::{PlayerIdentityResolver, PlayerMatch, RosterLookup, RosterQuery},
  store::GameSink,
  validate::ValidationResult,
};
use uuid::Uuid;

use crate::{RosterEntry, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn hitter(side: Side, name: &str, runs: u32) -> PlayerBattingRow {
  PlayerBattingRow {
    player_id:      None,
    player_name:    name.to_string(),
    team_code:      Some("HH".to_string()),
    team_side:      side,
    uniform_no:     None,
    batting_order:  Some(1),
    position:       Some("유".to_string()),
    is_starter:     true,
    appearance_seq: 1,
    stats:          BattingStats {
      runs: Some(runs),
      ..BattingStats::default()
    },
    extras:         BTreeMap::from([("비고".to_string(), "교체".to_string())]),
  }
}

fn box_score(game_id: &str) -> BoxScore {
  let mut b = BoxScore::new(game_id, NaiveDate::from_ymd_opt(2024, 3, 23), Era::Modern);
  b.teams.away = TeamLine {
    name: Some("한화".to_string()),
    resolved_code: Some("HH".to_string()),
    franchise_code: Some("HH".to_string()),
    score: Some(3),
    line_score: vec![Some(0), Some(3), None],
    ..TeamLine::default()
  };
  b.hitters.away.push(hitter(Side::Away, "노시환", 3));
  b
}

fn warned() -> ValidationResult {
  ValidationResult {
    is_valid: true,
    errors:   vec![],
    warnings: vec!["away hitter runs (2) != team score (3)".to_string()],
  }
}

// ─── Games ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn saved_games_round_trip_with_warnings() {
  let s = store().await;
  s.save_game(box_score("20240323HHLG0"), warned()).await.unwrap();

  let stored = s.load_game("20240323HHLG0").await.unwrap().unwrap();
  assert_eq!(stored.box_score, box_score("20240323HHLG0"));
  assert_eq!(stored.validation, warned());
  assert_eq!(stored.box_score.hitters.away[0].extras["비고"], "교체");
}

#[tokio::test]
async fn load_missing_game_returns_none() {
  let s = store().await;
  assert!(s.load_game("20240323HHLG0").await.unwrap().is_none());
}

#[tokio::test]
async fn saving_again_replaces_the_game() {
  let s = store().await;
  s.save_game(box_score("20240323HHLG0"), warned()).await.unwrap();

  let mut updated = box_score("20240323HHLG0");
  updated.teams.away.score = Some(4);
  s.save_game(updated, ValidationResult::default()).await.unwrap();

  let stored = s.load_game("20240323HHLG0").await.unwrap().unwrap();
  assert_eq!(stored.box_score.teams.away.score, Some(4));
  assert!(stored.validation.warnings.is_empty());
}

#[tokio::test]
async fn quarantined_games_are_kept_apart() {
  let s = store().await;
  let invalid = ValidationResult {
    is_valid: false,
    errors:   vec!["No pitcher rows for home".to_string()],
    warnings: vec![],
  };
  s.quarantine_game(box_score("20240323HHLG0"), invalid.clone())
    .await
    .unwrap();

  assert!(s.load_game("20240323HHLG0").await.unwrap().is_none());
  let q = s.load_quarantined("20240323HHLG0").await.unwrap().unwrap();
  assert_eq!(q.validation, invalid);

  // Accepting the game later clears the quarantine copy.
  s.save_game(box_score("20240323HHLG0"), warned()).await.unwrap();
  assert!(s.load_quarantined("20240323HHLG0").await.unwrap().is_none());
}

// ─── Outcomes, runs, review ──────────────────────────────────────────────────

#[tokio::test]
async fn outcomes_are_listed_per_run_in_order() {
  let s = store().await;
  let run_id = Uuid::new_v4();
  for (game_id, status) in [
    ("20240323HHLG0", GameStatus::Accepted),
    ("20240323SSKT0", GameStatus::NoData),
  ] {
    s.record_outcome(OutcomeRecord {
      run_id,
      game_id: game_id.to_string(),
      status,
      attempts: 1,
      messages: vec![],
      recorded_at: Utc::now(),
    })
    .await
    .unwrap();
  }
  s.record_outcome(OutcomeRecord {
    run_id:      Uuid::new_v4(),
    game_id:     "20240324HHLG0".to_string(),
    status:      GameStatus::FailedTransient,
    attempts:    3,
    messages:    vec!["timed out".to_string()],
    recorded_at: Utc::now(),
  })
  .await
  .unwrap();

  let outcomes = s.outcomes(run_id).await.unwrap();
  assert_eq!(outcomes.len(), 2);
  assert_eq!(outcomes[0].status, GameStatus::Accepted);
  assert_eq!(outcomes[1].game_id, "20240323SSKT0");
}

#[tokio::test]
async fn run_summaries_round_trip() {
  let s = store().await;
  let mut summary = RunSummary::new(Uuid::new_v4(), Utc::now());
  summary.count(GameStatus::Accepted);
  summary.count(GameStatus::Quarantined);
  s.record_run(summary.clone()).await.unwrap();

  let stored = s.run_summary(summary.run_id).await.unwrap().unwrap();
  assert_eq!((stored.total, stored.accepted, stored.quarantined), (2, 1, 1));
  assert_eq!(stored.finished_at.timestamp(), summary.finished_at.timestamp());
  assert!(s.run_summary(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn review_items_round_trip() {
  let s = store().await;
  let items = vec![
    ReviewItem {
      game_id:   "20090405SKHH0".to_string(),
      side:      Side::Away,
      subject:   "김민수".to_string(),
      team_code: Some("SK".to_string()),
      season:    Some(2009),
      kind:      ReviewKind::AmbiguousPlayer {
        candidates: vec![PlayerId(1), PlayerId(2)],
      },
    },
    ReviewItem {
      game_id:   "20090405SKHH0".to_string(),
      side:      Side::Home,
      subject:   "ZZ".to_string(),
      team_code: None,
      season:    Some(2009),
      kind:      ReviewKind::UnresolvedTeam {
        token: "ZZ".to_string(),
      },
    },
  ];
  s.flag_for_review(items.clone()).await.unwrap();
  s.flag_for_review(vec![]).await.unwrap();

  assert_eq!(s.review_items("20090405SKHH0").await.unwrap(), items);
  assert!(s.review_items("20240323HHLG0").await.unwrap().is_empty());
}

// ─── Roster ──────────────────────────────────────────────────────────────────

fn entry(id: u32, name: &str, uniform: Option<&str>) -> RosterEntry {
  RosterEntry {
    player_id:   PlayerId(id),
    name:        name.to_string(),
    team_code:   "SK".to_string(),
    season_year: 2009,
    uniform_no:  uniform.map(str::to_string),
  }
}

fn query(name: &str) -> RosterQuery {
  RosterQuery {
    name:        name.to_string(),
    team_code:   "SK".to_string(),
    season_year: 2009,
  }
}

#[tokio::test]
async fn roster_lookup_matches_name_team_and_season() {
  let s = store().await;
  s.add_roster_entry(entry(79192, "정근우", Some("8"))).await.unwrap();
  s.add_roster_entry(RosterEntry {
    season_year: 2010,
    ..entry(79192, "정근우", Some("8"))
  })
  .await
  .unwrap();

  let found = s.lookup(query("정근우")).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].player_id, PlayerId(79192));
  assert_eq!(found[0].uniform_no.as_deref(), Some("8"));
  assert!(s.lookup(query("박경완")).await.unwrap().is_empty());
}

#[tokio::test]
async fn same_named_players_stay_unresolved() {
  let s = store().await;
  s.add_roster_entry(entry(1, "김민수", Some("11"))).await.unwrap();
  s.add_roster_entry(entry(2, "김민수", Some("27"))).await.unwrap();

  let resolver = PlayerIdentityResolver::new(s);
  let m = resolver.resolve("김민수", "SK", 2009, None).await.unwrap();
  assert_eq!(m, PlayerMatch::Ambiguous(vec![PlayerId(1), PlayerId(2)]));
  assert_eq!(
    dugout_core::roster::resolve(resolver.roster(), "김민수", "SK", 2009)
      .await
      .unwrap(),
    None
  );

  let m = resolver.resolve("김민수", "SK", 2009, Some("27")).await.unwrap();
  assert_eq!(m, PlayerMatch::Unique(PlayerId(2)));
}
