//! Box-score extraction for Dugout.
//!
//! Turns a rendered box-score page into a [`BoxScore`]. The page is read
//! into plain tables, its era is classified from structural signatures, and
//! the matching era strategy fills the record. Pure synchronous; the caller
//! supplies the HTML.
//!
//! # Quick start
//!
//! ```no_run
//! use dugout_core::FranchiseHistory;
//!
//! let history = FranchiseHistory::builtin().unwrap();
//! let html = std::fs::read_to_string("20240323HHLG0.html").unwrap();
//! if let Some(box_score) = dugout_extract::extract(&html, "20240323HHLG0", None, &history) {
//!   println!("{} ({})", box_score.game_id, box_score.era);
//! }
//! ```

pub mod era;
pub mod error;
mod headers;
pub mod lineup;
mod metadata;
pub mod numeric;
mod rows;
mod scoreboard;
pub mod table;

use chrono::{Datelike, NaiveDate};
use dugout_core::{
  FranchiseHistory, GameIdentifier,
  box_score::{BoxScore, Era, Side, SideMap, TeamLine},
};
pub use error::{Error, Result};
pub use lineup::lineup_roster;
use scraper::Html;
use tracing::{debug, warn};

use crate::{era::PageSignature, table::Page};

// ─── Public API ──────────────────────────────────────────────────────────────

/// Extract the box score on `html`, or `None` when the page holds none.
///
/// `game_date` defaults to the date encoded in `game_id`.
pub fn extract(
  html: &str,
  game_id: &str,
  game_date: Option<NaiveDate>,
  history: &FranchiseHistory,
) -> Option<BoxScore> {
  extract_document(&Html::parse_document(html), game_id, game_date, history)
}

/// Like [`extract`], but reports why nothing was extracted.
pub fn try_extract(
  html: &str,
  game_id: &str,
  game_date: Option<NaiveDate>,
  history: &FranchiseHistory,
) -> Result<BoxScore> {
  try_extract_document(&Html::parse_document(html), game_id, game_date, history)
}

/// [`extract`] over an already parsed document.
pub fn extract_document(
  doc: &Html,
  game_id: &str,
  game_date: Option<NaiveDate>,
  history: &FranchiseHistory,
) -> Option<BoxScore> {
  match try_extract_document(doc, game_id, game_date, history) {
    Ok(box_score) => Some(box_score),
    Err(e) => {
      debug!(game_id, error = %e, "no box score extracted");
      None
    }
  }
}

/// The era of a parsed page, or `None` when no known layout matches.
pub fn classify(doc: &Html) -> Result<Option<Era>> {
  let page = Page::read(doc)?;
  Ok(era::classify(&PageSignature::probe(&page)))
}

/// [`try_extract`] over an already parsed document.
///
/// All-or-nothing: a page that matches no era, or whose hitter tables cannot
/// be aligned, yields an error rather than a partial record.
pub fn try_extract_document(
  doc: &Html,
  game_id: &str,
  game_date: Option<NaiveDate>,
  history: &FranchiseHistory,
) -> Result<BoxScore> {
  let page = Page::read(doc)?;
  let era = era::classify(&PageSignature::probe(&page)).ok_or(Error::NoEraSignature)?;
  debug!(game_id, %era, "classified page");

  // Legacy pages name no teams; the game id is their only source.
  let ident = match (era, GameIdentifier::decode(game_id)) {
    (Era::Legacy, Err(e)) => return Err(e.into()),
    (_, ident) => ident.ok(),
  };
  let game_date = game_date.or_else(|| ident.as_ref().map(|i| i.game_date));
  let season = game_date.map(|d| d.year());

  let mut lineups = era::extract(era, &page)?;
  resolve_teams(&mut lineups.teams, game_id, ident.as_ref(), season, history);

  for side in Side::BOTH {
    let code = lineups.teams.get(side).resolved_code.clone();
    for row in lineups.hitters.get_mut(side) {
      row.team_code = code.clone();
    }
    for row in lineups.pitchers.get_mut(side) {
      row.team_code = code.clone();
    }
  }

  let mut box_score = BoxScore::new(game_id, game_date, era);
  box_score.metadata = metadata::read(doc)?;
  box_score.teams = lineups.teams;
  box_score.hitters = lineups.hitters;
  box_score.pitchers = lineups.pitchers;
  box_score.summary_notes = metadata::summary_notes(&page);
  Ok(box_score)
}

// ─── Team identity ───────────────────────────────────────────────────────────

/// Fill `resolved_code` and `franchise_code` for both sides: from the printed
/// team name when there is one, else from the game id segment.
fn resolve_teams(
  teams: &mut SideMap<TeamLine>,
  game_id: &str,
  ident: Option<&GameIdentifier>,
  season: Option<i32>,
  history: &FranchiseHistory,
) {
  for side in Side::BOTH {
    let line = teams.get_mut(side);
    let by_name = match (line.name.as_deref(), season) {
      (Some(name), Some(season)) => history.resolve_team(name, season).map(str::to_string),
      _ => None,
    };
    let code = by_name.or_else(|| ident.and_then(|id| id.resolve_segment(side, history)));

    if code.is_none() {
      warn!(game_id, %side, name = ?line.name, "team left unresolved");
    }
    let season = season.or_else(|| ident.map(|id| id.season_year));
    line.franchise_code = code
      .as_deref()
      .zip(season)
      .and_then(|(c, season)| history.franchise_code(c, season))
      .map(str::to_string);
    line.resolved_code = code;
  }
}


#[cfg(test)]
mod tests {
  use dugout_core::{box_score::PlayerId, validate};

  use super::{test_helpers::*, *};

  fn history() -> FranchiseHistory { FranchiseHistory::builtin().unwrap() }

  fn names(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i}")).collect()
  }

  fn modern_page(away_name: &str) -> String {
    let mut away_names = names("원정", 3);
    away_names[0] = player_link(76232, "노시환");
    page(&[
      r#"<div class="box-score-area">구장 : 잠실 관중 : 23,750 개시 : 14:00 종료 : 17:05 경기시간 : 3:05</div>"#
        .to_string(),
      scoreboard(
        (away_name, [0, 1, 0, 0, 2, 0, 0, 0, 0]),
        ("LG", [1, 0, 0, 0, 0, 0, 0, 0, 0]),
      ),
      names_table("tblAwayHitter1", &away_names),
      stats_table("tblAwayHitter3", &[(4, 2), (4, 1), (3, 0)]),
      names_table("tblHomeHitter1", &names("홈", 2)),
      stats_table("tblHomeHitter3", &[(4, 1), (4, 0)]),
      pitcher_table(Some("tblAwayPitcher"), &["류현진", "박상원"]),
      pitcher_table(Some("tblHomePitcher"), &["엔스"]),
      r#"<table id="tblEtc"><tbody><tr><th>결승타</th><td>노시환(5회 2사 1,2루서 좌중간 2루타)</td></tr><tr><th>실책</th><td>없음</td></tr></tbody></table>"#
        .to_string(),
    ])
  }

  #[test]
  fn modern_page_extracts_a_valid_box_score() {
    let history = history();
    let b = extract(&modern_page("한화"), "20240323HHLG0", None, &history).unwrap();

    assert_eq!(b.era, Era::Modern);
    assert_eq!(b.game_date, NaiveDate::from_ymd_opt(2024, 3, 23));
    assert_eq!(b.teams.away.resolved_code.as_deref(), Some("HH"));
    assert_eq!(b.teams.home.resolved_code.as_deref(), Some("LG"));
    assert_eq!(b.teams.away.score, Some(3));
    assert_eq!(b.teams.away.line_score.len(), 9);

    assert_eq!(b.hitters.away.len(), 3);
    assert_eq!(b.hitters.away[0].player_name, "노시환");
    assert_eq!(b.hitters.away[0].player_id, Some(PlayerId(76232)));
    assert_eq!(b.hitters.away[1].player_id, None);
    assert_eq!(b.hitters.away[0].team_code.as_deref(), Some("HH"));
    assert_eq!(b.pitchers.home[0].team_code.as_deref(), Some("LG"));
    assert!(b.pitchers.away[0].is_starting);

    assert_eq!(b.metadata.stadium.as_deref(), Some("잠실"));
    assert_eq!(b.metadata.duration_minutes, Some(185));
    assert_eq!(b.summary_notes.len(), 1);

    let v = validate(&b, history.canonical_codes());
    assert!(v.is_valid, "{:?}", v.errors);
    assert!(v.warnings.is_empty(), "{:?}", v.warnings);
  }

  #[test]
  fn unresolvable_scoreboard_names_fall_back_to_the_game_id() {
    let b = extract(&modern_page("???"), "20240323HHLG0", None, &history()).unwrap();
    assert_eq!(b.teams.away.name.as_deref(), Some("???"));
    assert_eq!(b.teams.away.resolved_code.as_deref(), Some("HH"));
  }

  fn legacy_page(away_names: &[String], away_stats: &[(u32, u32)]) -> String {
    page(&[
      names_table("tblAwayHitter1", away_names),
      stats_table("tblAwayHitter3", away_stats),
      names_table("tblHomeHitter1", &names("홈", 2)),
      stats_table("tblHomeHitter3", &[(4, 1), (4, 0)]),
      pitcher_table(Some("tblAwayPitcher"), &["김광현"]),
      pitcher_table(Some("tblHomePitcher"), &["류현진"]),
    ])
  }

  #[test]
  fn legacy_tables_are_zipped_by_position() {
    let mut away = names("타자", 9);
    away[2] = "김민수".to_string();
    away[6] = "김민수".to_string();
    let stats: Vec<(u32, u32)> = (1..=9).map(|i| (i, 0)).collect();

    let b = extract(&legacy_page(&away, &stats), "20090405SKHH0", None, &history()).unwrap();
    assert_eq!(b.era, Era::Legacy);
    assert_eq!(b.hitters.away.len(), 9);
    for (i, row) in b.hitters.away.iter().enumerate() {
      assert_eq!(row.player_name, away[i]);
      assert_eq!(row.stats.at_bats, Some(i as u32 + 1));
      assert_eq!(row.batting_order, Some(i as u32 + 1));
    }
    assert_eq!(b.hitters.away[2].player_name, b.hitters.away[6].player_name);
    assert_ne!(b.hitters.away[2].stats.at_bats, b.hitters.away[6].stats.at_bats);

    assert_eq!(b.teams.away.name, None);
    assert_eq!(b.teams.away.score, None);
    assert_eq!(b.teams.away.resolved_code.as_deref(), Some("SK"));
    assert_eq!(b.teams.away.franchise_code.as_deref(), Some("SSG"));
    assert_eq!(b.hitters.away[0].team_code.as_deref(), Some("SK"));
    assert_eq!(b.teams.home.resolved_code.as_deref(), Some("HH"));
  }

  #[test]
  fn legacy_length_mismatch_is_a_hard_failure() {
    let html = legacy_page(&names("타자", 9), &[(4, 0); 8]);
    assert!(extract(&html, "20090405SKHH0", None, &history()).is_none());
    assert!(matches!(
      try_extract(&html, "20090405SKHH0", None, &history()),
      Err(Error::RowMismatch {
        side: Side::Away,
        names: 9,
        stats: 8
      })
    ));
  }

  #[test]
  fn legacy_pages_need_a_decodable_game_id() {
    let html = legacy_page(&names("타자", 2), &[(4, 0), (3, 1)]);
    assert!(matches!(
      try_extract(&html, "garbage", None, &history()),
      Err(Error::GameId(_))
    ));
  }

  #[test]
  fn transitional_tables_are_found_by_headers() {
    let hitters = |names: &[&str]| {
      let rows: Vec<Vec<String>> = names
        .iter()
        .map(|n| vec![n.to_string(), "4".to_string(), "1".to_string(), "기록없음".to_string()])
        .collect();
      html_table(None, &["선수명", "타수", "득점", "비고"], &rows)
    };
    let html = page(&[
      scoreboard(
        ("삼성", [0, 0, 1, 0, 0, 0, 1, 0, 0]),
        ("롯데", [0, 0, 0, 0, 0, 0, 0, 0, 0]),
      ),
      hitters(&["양준혁", "진갑용"]),
      hitters(&["이대호"]),
      pitcher_table(None, &["배영수"]),
      pitcher_table(None, &["손민한", "임경완"]),
    ]);

    let history = history();
    let b = extract(&html, "20050710SSLT0", None, &history).unwrap();
    assert_eq!(b.era, Era::Transitional);
    assert_eq!(b.teams.away.resolved_code.as_deref(), Some("SS"));
    assert_eq!(b.teams.home.resolved_code.as_deref(), Some("LT"));
    assert_eq!(b.hitters.away.len(), 2);
    assert_eq!(b.hitters.home[0].player_name, "이대호");
    assert_eq!(b.pitchers.home.len(), 2);
    assert_eq!(
      b.hitters.away[0].extras.get("비고").map(String::as_str),
      Some("기록없음")
    );

    // The home side scored nothing yet credits a hitter with a run: a
    // warning, not an error.
    let v = validate(&b, history.canonical_codes());
    assert!(v.is_valid, "{:?}", v.errors);
    assert_eq!(v.warnings.len(), 1);
  }

  #[test]
  fn pages_without_a_layout_yield_nothing() {
    let html = "<html><body><p>우천 취소</p><table><tr><td>x</td></tr></table></body></html>";
    assert!(extract(html, "20240323HHLG0", None, &history()).is_none());
    assert!(matches!(
      try_extract(html, "20240323HHLG0", None, &history()),
      Err(Error::NoEraSignature)
    ));
    assert_eq!(classify(&Html::parse_document(html)).unwrap(), None);
  }

  #[test]
  fn explicit_game_date_wins_over_the_id() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 24);
    let b = extract(&modern_page("한화"), "20240323HHLG0", date, &history()).unwrap();
    assert_eq!(b.game_date, date);
  }

  #[test]
  fn recognised_headers_never_reach_extras() {
    let b = extract(&modern_page("한화"), "20240323HHLG0", None, &history()).unwrap();
    for row in b.hitters.away.iter().chain(&b.hitters.home) {
      assert!(row.extras.is_empty(), "{:?}", row.extras);
    }
    for row in b.pitchers.away.iter().chain(&b.pitchers.home) {
      assert!(row.extras.is_empty(), "{:?}", row.extras);
    }
  }
}
