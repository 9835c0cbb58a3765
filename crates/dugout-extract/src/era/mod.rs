//! Era classification.
//!
//! A page is first reduced to a [`PageSignature`], a handful of structural
//! facts, and the era is a pure function of that signature. Extraction code
//! never inspects markup to decide which layout it is looking at.

use dugout_core::box_score::{
  Era, PlayerBattingRow, PlayerPitchingRow, Side, SideMap, TeamLine,
};

use crate::{
  Error, Result,
  headers::{is_hitter_header_set, is_pitcher_header_set},
  rows, scoreboard,
  table::{Page, Table},
};

mod legacy;
mod modern;
mod transitional;

/// Which id-keyed table of a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
  /// Order, position and name of each hitter.
  HitterNames,
  /// Per-hitter totals, aligned row-by-row with `HitterNames`.
  HitterStats,
  Pitchers,
}

impl TableRole {
  const ALL: [TableRole; 3] = [Self::HitterNames, Self::HitterStats, Self::Pitchers];

  fn suffix(self) -> &'static str {
    match self {
      Self::HitterNames => "Hitter1",
      Self::HitterStats => "Hitter3",
      Self::Pitchers => "Pitcher",
    }
  }

  /// Element id of this table for `side`, e.g. `tblAwayHitter1`.
  pub fn id(self, side: Side) -> String {
    let side = match side {
      Side::Away => "Away",
      Side::Home => "Home",
    };
    format!("tbl{side}{}", self.suffix())
  }
}

pub(crate) fn is_id_table(t: &Table) -> bool {
  let Some(id) = t.id.as_deref() else {
    return false;
  };
  TableRole::ALL
    .iter()
    .any(|role| Side::BOTH.iter().any(|&side| role.id(side) == id))
}

fn count_id_tables(page: &Page, role: TableRole) -> usize {
  Side::BOTH
    .iter()
    .filter(|&&side| page.by_id(&role.id(side)).is_some())
    .count()
}

/// Structural facts about a page that decide its era.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSignature {
  pub id_hitter_tables:      usize,
  pub id_stat_tables:        usize,
  pub id_pitcher_tables:     usize,
  pub unified_scoreboard:    bool,
  pub split_scoreboard:      bool,
  /// Tables without a known id whose headers look like a hitter table.
  pub header_hitter_tables:  usize,
  pub header_pitcher_tables: usize,
}

impl PageSignature {
  pub fn probe(page: &Page) -> Self {
    let generic = || page.tables.iter().filter(|t| !is_id_table(t));
    Self {
      id_hitter_tables:      count_id_tables(page, TableRole::HitterNames),
      id_stat_tables:        count_id_tables(page, TableRole::HitterStats),
      id_pitcher_tables:     count_id_tables(page, TableRole::Pitchers),
      unified_scoreboard:    scoreboard::has_unified(page),
      split_scoreboard:      scoreboard::has_split(page),
      header_hitter_tables:  generic().filter(|t| is_hitter_header_set(&t.headers)).count(),
      header_pitcher_tables: generic()
        .filter(|t| is_pitcher_header_set(&t.headers))
        .count(),
    }
  }

  fn has_scoreboard(&self) -> bool { self.unified_scoreboard || self.split_scoreboard }
}

/// The era of a page, or `None` when no known layout matches.
///
/// - Id-keyed hitter and pitcher tables with a scoreboard: [`Era::Modern`].
/// - Id-keyed hitter name and stat tables without a scoreboard:
///   [`Era::Legacy`].
/// - No id-keyed tables, a scoreboard, and hitter/pitcher tables recognised
///   by their headers for both sides: [`Era::Transitional`].
pub fn classify(sig: &PageSignature) -> Option<Era> {
  if sig.id_hitter_tables == 2 {
    if sig.has_scoreboard() && sig.id_pitcher_tables == 2 {
      return Some(Era::Modern);
    }
    if !sig.has_scoreboard() && sig.id_stat_tables == 2 {
      return Some(Era::Legacy);
    }
    return None;
  }

  let no_id_tables =
    sig.id_hitter_tables == 0 && sig.id_stat_tables == 0 && sig.id_pitcher_tables == 0;
  (no_id_tables
    && sig.has_scoreboard()
    && sig.header_hitter_tables >= 2
    && sig.header_pitcher_tables >= 2)
    .then_some(Era::Transitional)
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// What an era strategy reads off the page. Team codes are resolved by the
/// caller.
#[derive(Debug, Default)]
pub(crate) struct Lineups {
  pub teams:    SideMap<TeamLine>,
  pub hitters:  SideMap<Vec<PlayerBattingRow>>,
  pub pitchers: SideMap<Vec<PlayerPitchingRow>>,
}

pub(crate) fn extract(era: Era, page: &Page) -> Result<Lineups> {
  match era {
    Era::Modern => modern::extract(page),
    Era::Legacy => legacy::extract(page),
    Era::Transitional => transitional::extract(page),
  }
}

/// Pitcher rows of the id-keyed pitcher tables; a missing table gives none.
fn id_pitchers(page: &Page) -> SideMap<Vec<PlayerPitchingRow>> {
  SideMap::from_fn(|side| {
    page
      .by_id(&TableRole::Pitchers.id(side))
      .map(|t| rows::pitchers(side, t))
      .unwrap_or_default()
  })
}

fn id_table(page: &Page, role: TableRole, side: Side) -> Result<&Table> {
  let id = role.id(side);
  page.by_id(&id).ok_or(Error::MissingTable(id))
}
