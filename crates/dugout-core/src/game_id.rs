//! Game identifier codec.
//!
//! Wire format, bit-exact: `YYYYMMDD` + 2-char away segment + 2-char home
//! segment + 1-digit doubleheader sequence (0 for a single game), e.g.
//! `20240323HHLG0`.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  box_score::{Side, SideMap},
  franchise::FranchiseHistory,
};

const GAME_ID_LEN: usize = 13;

/// A decoded game id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIdentifier {
  pub game_id:      String,
  pub game_date:    NaiveDate,
  pub season_year:  i32,
  pub away_segment: String,
  pub home_segment: String,
  pub seq:          u8,
}

/// Decode `game_id`; see [`GameIdentifier::decode`].
pub fn decode_game_id(game_id: &str) -> Result<GameIdentifier> {
  GameIdentifier::decode(game_id)
}

fn invalid(game_id: &str, reason: impl Into<String>) -> Error {
  Error::InvalidGameId {
    game_id: game_id.to_string(),
    reason:  reason.into(),
  }
}

fn check_segment(game_id: &str, segment: &str) -> Result<()> {
  if segment.len() == 2 && segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
    Ok(())
  } else {
    Err(invalid(game_id, format!("bad team segment {segment:?}")))
  }
}

impl GameIdentifier {
  pub fn decode(game_id: &str) -> Result<Self> {
    let id = game_id.trim();
    if id.len() != GAME_ID_LEN || !id.is_ascii() {
      return Err(invalid(game_id, format!("expected {GAME_ID_LEN} ASCII characters")));
    }

    let game_date = NaiveDate::parse_from_str(&id[..8], "%Y%m%d")
      .map_err(|e| invalid(game_id, format!("bad date: {e}")))?;

    let away_segment = id[8..10].to_ascii_uppercase();
    let home_segment = id[10..12].to_ascii_uppercase();
    check_segment(game_id, &away_segment)?;
    check_segment(game_id, &home_segment)?;

    let seq = id[12..]
      .parse::<u8>()
      .map_err(|_| invalid(game_id, "doubleheader sequence is not a digit"))?;

    Ok(Self {
      game_id: format!("{}{away_segment}{home_segment}{seq}", &id[..8]),
      game_date,
      season_year: game_date.year(),
      away_segment,
      home_segment,
      seq,
    })
  }

  /// Inverse of [`Self::decode`].
  pub fn encode(game_date: NaiveDate, away: &str, home: &str, seq: u8) -> Result<String> {
    let away = away.to_ascii_uppercase();
    let home = home.to_ascii_uppercase();
    let id = format!("{}{away}{home}{seq}", game_date.format("%Y%m%d"));
    check_segment(&id, &away)?;
    check_segment(&id, &home)?;
    if seq > 9 {
      return Err(invalid(&id, "doubleheader sequence must be a single digit"));
    }
    Ok(id)
  }

  pub fn segment(&self, side: Side) -> &str {
    match side {
      Side::Away => &self.away_segment,
      Side::Home => &self.home_segment,
    }
  }

  /// Team code for one side, resolved for the game's season.
  ///
  /// Season-aware resolution is tried first; when it fails the static segment
  /// table is consulted and its answer re-resolved for the season. A table
  /// value that still does not resolve (a designator) is returned as is.
  pub fn resolve_segment(&self, side: Side, history: &FranchiseHistory) -> Option<String> {
    let segment = self.segment(side);
    if let Some(code) = history.resolve_team(segment, self.season_year) {
      return Some(code.to_string());
    }
    let mapped = history.segment_code(segment)?;
    Some(
      history
        .resolve_team(mapped, self.season_year)
        .unwrap_or(mapped)
        .to_string(),
    )
  }

  pub fn resolve_teams(&self, history: &FranchiseHistory) -> SideMap<Option<String>> {
    SideMap::from_fn(|side| self.resolve_segment(side, history))
  }

  /// URL of the game's review (box score) page under `base_url`.
  pub fn review_url(&self, base_url: &str) -> String { self.section_url(base_url, "REVIEW") }

  /// URL of the game's lineup page under `base_url`.
  pub fn lineup_url(&self, base_url: &str) -> String { self.section_url(base_url, "LINEUP") }

  fn section_url(&self, base_url: &str, section: &str) -> String {
    format!(
      "{base_url}?gameId={}&gameDate={}&section={section}",
      self.game_id,
      self.game_date.format("%Y%m%d")
    )
  }
}

impl FromStr for GameIdentifier {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::decode(s) }
}

impl fmt::Display for GameIdentifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.game_id)
  }
}
