//! Static pages without element ids: player tables are found by their
//! headers and assigned to sides in document order, away first.

use dugout_core::box_score::{Side, SideMap};

use super::{Lineups, is_id_table};
use crate::{
  Error, Result,
  headers::{is_hitter_header_set, is_pitcher_header_set},
  rows, scoreboard,
  table::{Page, Table},
};

fn by_headers(page: &Page, pred: fn(&[String]) -> bool) -> Vec<&Table> {
  page
    .tables
    .iter()
    .filter(|t| !is_id_table(t) && pred(&t.headers))
    .take(2)
    .collect()
}

fn side_table<'a>(tables: &[&'a Table], side: Side, what: &str) -> Result<&'a Table> {
  let index = match side {
    Side::Away => 0,
    Side::Home => 1,
  };
  tables
    .get(index)
    .copied()
    .ok_or_else(|| Error::MissingTable(format!("{side} {what} table")))
}

pub(super) fn extract(page: &Page) -> Result<Lineups> {
  let teams =
    scoreboard::read(page).ok_or_else(|| Error::MissingTable("scoreboard".to_string()))?;
  let hitter_tables = by_headers(page, is_hitter_header_set);
  let pitcher_tables = by_headers(page, is_pitcher_header_set);

  let mut hitters = SideMap::<Vec<_>>::default();
  let mut pitchers = SideMap::<Vec<_>>::default();
  for side in Side::BOTH {
    *hitters.get_mut(side) = rows::hitters(side, side_table(&hitter_tables, side, "hitter")?);
    *pitchers.get_mut(side) =
      rows::pitchers(side, side_table(&pitcher_tables, side, "pitcher")?);
  }

  Ok(Lineups {
    teams,
    hitters,
    pitchers,
  })
}
