//! Pre-2010 pages: no scoreboard, hitter names and stats in separate tables.
//!
//! Team identity comes from the game id, so `teams` is left empty here.

use dugout_core::box_score::{Side, SideMap};

use super::{Lineups, TableRole, id_pitchers, id_table};
use crate::{Result, rows, table::Page};

pub(super) fn extract(page: &Page) -> Result<Lineups> {
  let mut hitters = SideMap::<Vec<_>>::default();
  for side in Side::BOTH {
    let names = id_table(page, TableRole::HitterNames, side)?;
    let stats = id_table(page, TableRole::HitterStats, side)?;
    *hitters.get_mut(side) = rows::zipped_hitters(side, names, stats)?;
  }

  Ok(Lineups {
    hitters,
    pitchers: id_pitchers(page),
    ..Lineups::default()
  })
}
