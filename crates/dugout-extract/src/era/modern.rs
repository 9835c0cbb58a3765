//! Id-keyed tables plus a scoreboard.

use dugout_core::box_score::{Side, SideMap};

use super::{Lineups, TableRole, id_pitchers, id_table};
use crate::{Result, rows, scoreboard, table::Page};

pub(super) fn extract(page: &Page) -> Result<Lineups> {
  let mut hitters = SideMap::<Vec<_>>::default();
  for side in Side::BOTH {
    let names = id_table(page, TableRole::HitterNames, side)?;
    // Some seasons print names and totals in one table.
    *hitters.get_mut(side) = match page.by_id(&TableRole::HitterStats.id(side)) {
      Some(stats) => rows::zipped_hitters(side, names, stats)?,
      None => rows::hitters(side, names),
    };
  }

  Ok(Lineups {
    teams: scoreboard::read(page).unwrap_or_default(),
    hitters,
    pitchers: id_pitchers(page),
  })
}
