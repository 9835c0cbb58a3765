//! Turning table rows into typed player rows.
//!
//! A row is first flattened into `(header, cell)` pairs, possibly drawn from
//! two tables zipped by index, and then every pair is routed through the
//! header dictionaries. Recognised columns become typed stats; the rest land
//! in `extras` with their raw text.

use std::collections::BTreeMap;

use dugout_core::{
  box_score::{
    Decision, PlayerBattingRow, PlayerId, PlayerPitchingRow, Side, StatKind,
  },
  innings::Outs,
};

use crate::{
  Error, Result,
  headers::{BattingColumn, PitchingColumn, batting_column, pitching_column},
  numeric::{leading_number, parse_count, parse_rate},
  table::{Cell, Table},
};

/// Name cells of team total rows.
const TOTAL_ROWS: &[&str] = &["합계", "팀합계", "TOTAL", "Total"];

/// Headers assumed for the leading columns of a names table that prints
/// none: order, position, name.
const NAME_TABLE_COLUMNS: [&str; 3] = ["타순", "포지션", "선수명"];

type Pairs<'a> = Vec<(String, &'a Cell)>;

fn labels(table: &Table) -> Vec<String> {
  let width = table
    .rows
    .iter()
    .map(Vec::len)
    .chain([table.headers.len()])
    .max()
    .unwrap_or(0);
  (0..width).map(|i| table.header(i)).collect()
}

/// Labels for a hitter names table. When no column is recognised as the name
/// column the first three columns are taken positionally.
fn name_table_labels(table: &Table) -> Vec<String> {
  let mut labels = labels(table);
  let has_name = labels
    .iter()
    .any(|h| batting_column(h) == Some(BattingColumn::Name));
  if !has_name && labels.len() >= NAME_TABLE_COLUMNS.len() {
    for (label, fallback) in labels.iter_mut().zip(NAME_TABLE_COLUMNS) {
      if batting_column(label.as_str()).is_none() {
        *label = fallback.to_string();
      }
    }
  }
  labels
}

fn pair<'a>(labels: &[String], row: &'a [Cell]) -> Pairs<'a> {
  labels.iter().cloned().zip(row.iter()).collect()
}

/// Pairs for each row of a single table.
fn single<'a>(table: &'a Table, labels: &[String]) -> Vec<Pairs<'a>> {
  table.rows.iter().map(|row| pair(labels, row)).collect()
}

/// Pairs for a names table and a stats table zipped by row index.
///
/// Rows are never matched by name; the same surname can appear twice in one
/// lineup. Tables of different lengths cannot be aligned and are an error.
fn zipped<'a>(side: Side, names: &'a Table, stats: &'a Table) -> Result<Vec<Pairs<'a>>> {
  if names.rows.len() != stats.rows.len() {
    return Err(Error::RowMismatch {
      side,
      names: names.rows.len(),
      stats: stats.rows.len(),
    });
  }
  let name_labels = name_table_labels(names);
  let stat_labels = labels(stats);
  Ok(
    names
      .rows
      .iter()
      .zip(&stats.rows)
      .map(|(n, s)| {
        let mut pairs = pair(&name_labels, n);
        pairs.extend(pair(&stat_labels, s));
        pairs
      })
      .collect(),
  )
}

/// Keep an unrecognised column. A header seen twice with different text gets
/// a numbered key, so neither value is lost.
fn keep_extra(extras: &mut BTreeMap<String, String>, header: &str, text: &str) {
  let mut key = header.to_string();
  let mut n = 2;
  while let Some(existing) = extras.get(&key) {
    if existing == text {
      return;
    }
    key = format!("{header}_{n}");
    n += 1;
  }
  extras.insert(key, text.to_string());
}

fn set_once<T>(slot: &mut Option<T>, value: Option<T>) {
  if slot.is_none() {
    *slot = value;
  }
}

fn non_empty(text: &str) -> Option<String> {
  let t = text.trim();
  (!t.is_empty()).then(|| t.to_string())
}

fn is_total_row(name: &str) -> bool { TOTAL_ROWS.contains(&name.trim()) }

/// Name and id of the player a row describes.
fn identity(name_cell: Option<&Cell>, pairs: &Pairs<'_>) -> Option<(String, Option<PlayerId>)> {
  let cell = name_cell?;
  let name = cell
    .link_text
    .clone()
    .or_else(|| non_empty(&cell.text))?;
  if is_total_row(&name) {
    return None;
  }
  let id = cell
    .player_id
    .or_else(|| pairs.iter().find_map(|(_, c)| c.player_id));
  Some((name, id))
}

// ─── Hitters ─────────────────────────────────────────────────────────────────

fn batting_row(side: Side, seq: u32, pairs: &Pairs<'_>) -> Option<PlayerBattingRow> {
  let mut row = PlayerBattingRow {
    player_id:      None,
    player_name:    String::new(),
    team_code:      None,
    team_side:      side,
    uniform_no:     None,
    batting_order:  None,
    position:       None,
    is_starter:     false,
    appearance_seq: seq,
    stats:          Default::default(),
    extras:         BTreeMap::new(),
  };
  let mut name_cell = None;

  for (header, cell) in pairs {
    let text = cell.text.as_str();
    match batting_column(header) {
      Some(BattingColumn::Name) => {
        if name_cell.is_none() {
          name_cell = Some(*cell);
        }
      }
      Some(BattingColumn::Order) => set_once(&mut row.batting_order, leading_number(text)),
      Some(BattingColumn::Position) => set_once(&mut row.position, non_empty(text)),
      Some(BattingColumn::Uniform) => set_once(&mut row.uniform_no, non_empty(text)),
      Some(BattingColumn::Stat(stat)) => match stat.kind() {
        StatKind::Count => {
          if let Some(slot) = row.stats.count_mut(stat) {
            set_once(slot, parse_count(text));
          }
        }
        StatKind::Rate => {
          if let Some(slot) = row.stats.rate_mut(stat) {
            set_once(slot, parse_rate(text));
          }
        }
        StatKind::Innings | StatKind::Decision => {}
      },
      None => keep_extra(&mut row.extras, header, text),
    }
  }

  let (name, id) = identity(name_cell, pairs)?;
  row.player_name = name;
  row.player_id = id;
  row.is_starter = row.batting_order.is_some_and(|o| o <= 9);
  Some(row)
}

fn batting_rows(side: Side, rows: Vec<Pairs<'_>>) -> Vec<PlayerBattingRow> {
  let mut out = Vec::with_capacity(rows.len());
  for pairs in &rows {
    let seq = out.len() as u32 + 1;
    if let Some(row) = batting_row(side, seq, pairs) {
      out.push(row);
    }
  }
  out
}

/// Hitter rows from one table that carries names and stats together.
pub fn hitters(side: Side, table: &Table) -> Vec<PlayerBattingRow> {
  let labels = name_table_labels(table);
  batting_rows(side, single(table, &labels))
}

/// Hitter rows from a names table and a stats table aligned by index.
pub fn zipped_hitters(
  side: Side,
  names: &Table,
  stats: &Table,
) -> Result<Vec<PlayerBattingRow>> {
  Ok(batting_rows(side, zipped(side, names, stats)?))
}

// ─── Pitchers ────────────────────────────────────────────────────────────────

fn pitching_row(side: Side, seq: u32, pairs: &Pairs<'_>) -> Option<PlayerPitchingRow> {
  let mut row = PlayerPitchingRow {
    player_id:      None,
    player_name:    String::new(),
    team_code:      None,
    team_side:      side,
    uniform_no:     None,
    is_starting:    seq == 1,
    appearance_seq: seq,
    stats:          Default::default(),
    extras:         BTreeMap::new(),
  };
  let mut name_cell = None;

  for (header, cell) in pairs {
    let text = cell.text.as_str();
    match pitching_column(header) {
      Some(PitchingColumn::Name) => {
        if name_cell.is_none() {
          name_cell = Some(*cell);
        }
      }
      Some(PitchingColumn::Uniform) => set_once(&mut row.uniform_no, non_empty(text)),
      Some(PitchingColumn::Stat(stat)) => match stat.kind() {
        StatKind::Count => {
          if let Some(slot) = row.stats.count_mut(stat) {
            set_once(slot, parse_count(text));
          }
        }
        StatKind::Rate => {
          if let Some(slot) = row.stats.rate_mut(stat) {
            set_once(slot, parse_rate(text));
          }
        }
        StatKind::Innings => set_once(&mut row.stats.outs, Outs::parse(text)),
        StatKind::Decision => set_once(&mut row.stats.decision, Decision::parse(text)),
      },
      None => keep_extra(&mut row.extras, header, text),
    }
  }

  let (name, id) = identity(name_cell, pairs)?;
  row.player_name = name;
  row.player_id = id;
  Some(row)
}

/// Pitcher rows in order of appearance; the first is the starter.
pub fn pitchers(side: Side, table: &Table) -> Vec<PlayerPitchingRow> {
  let labels = labels(table);
  let mut out = Vec::with_capacity(table.rows.len());
  for pairs in single(table, &labels) {
    let seq = out.len() as u32 + 1;
    if let Some(row) = pitching_row(side, seq, &pairs) {
      out.push(row);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_helpers::table;

  #[test]
  fn unknown_headers_are_kept_verbatim() {
    let t = table(
      None,
      &["타순", "선수명", "타수", "안타", "비고", "결승타"],
      &[&["1", "이정후", "4", "2", "교체 출전", "1"]],
    );
    let rows = hitters(Side::Home, &t);
    assert_eq!(rows.len(), 1);
    let r = &rows[0];
    assert_eq!(r.extras.get("비고").map(String::as_str), Some("교체 출전"));
    assert_eq!(r.extras.get("결승타").map(String::as_str), Some("1"));
    assert_eq!(r.extras.len(), 2);
    assert_eq!(r.stats.at_bats, Some(4));
    assert_eq!(r.stats.hits, Some(2));
    for recognised in ["타순", "선수명", "타수", "안타"] {
      assert!(!r.extras.contains_key(recognised));
    }
  }

  #[test]
  fn missing_stats_are_not_zero() {
    let t = table(None, &["선수명", "타수", "타점"], &[&["a", "-", ""]]);
    let r = &hitters(Side::Away, &t)[0];
    assert_eq!(r.stats.at_bats, None);
    assert_eq!(r.stats.rbi, None);
  }

  #[test]
  fn total_rows_are_skipped_and_sequence_counts_kept_rows() {
    let t = table(
      None,
      &["타순", "선수명", "타수"],
      &[&["1", "a", "4"], &["", "합계", "4"], &["10", "b", "1"]],
    );
    let rows = hitters(Side::Away, &t);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].player_name, "b");
    assert_eq!(rows[1].appearance_seq, 2);
    assert!(rows[0].is_starter);
    assert!(!rows[1].is_starter);
  }

  #[test]
  fn names_tables_without_headers_are_read_positionally() {
    let names = table(None, &["", "", ""], &[&["1", "二", "정근우"], &["2", "中", "김강민"]]);
    let stats = table(None, &["타수", "안타"], &[&["5", "2"], &["4", "0"]]);
    let rows = zipped_hitters(Side::Away, &names, &stats).unwrap();
    assert_eq!(rows[0].batting_order, Some(1));
    assert_eq!(rows[0].position.as_deref(), Some("二"));
    assert_eq!(rows[1].player_name, "김강민");
    assert_eq!(rows[1].stats.at_bats, Some(4));
    assert!(rows[0].extras.is_empty());
  }

  #[test]
  fn zipped_tables_must_agree_on_length() {
    let names = table(None, &["타순", "포지션", "선수명"], &[&["1", "二", "a"], &["2", "中", "b"]]);
    let stats = table(None, &["타수"], &[&["5"]]);
    let err = zipped_hitters(Side::Home, &names, &stats).unwrap_err();
    assert!(matches!(
      err,
      Error::RowMismatch {
        side: Side::Home,
        names: 2,
        stats: 1
      }
    ));
  }

  #[test]
  fn duplicate_unknown_headers_keep_both_values() {
    let t = table(None, &["선수명", "비고", "비고"], &[&["a", "x", "y"]]);
    let r = &hitters(Side::Away, &t)[0];
    assert_eq!(r.extras.get("비고").map(String::as_str), Some("x"));
    assert_eq!(r.extras.get("비고_2").map(String::as_str), Some("y"));
  }

  #[test]
  fn pitcher_rows_parse_outs_and_decisions() {
    let t = table(
      None,
      &["선수명", "등판", "결과", "이닝", "삼진", "자책", "평균자책점"],
      &[
        &["류현진", "선발", "승", "6 1/3", "8", "1", "1.42"],
        &["오승환", "9회", "세", "1", "2", "0", "0.00"],
        &["합계", "", "", "7 1/3", "10", "1", ""],
      ],
    );
    let rows = pitchers(Side::Home, &t);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].is_starting);
    assert!(!rows[1].is_starting);
    assert_eq!(rows[0].stats.outs, Some(Outs(19)));
    assert_eq!(rows[0].stats.decision, Some(Decision::W));
    assert_eq!(rows[1].stats.decision, Some(Decision::S));
    assert_eq!(rows[0].stats.era, Some(1.42));
    assert_eq!(rows[0].extras.get("등판").map(String::as_str), Some("선발"));
  }

  #[test]
  fn unrecognised_decision_text_is_none() {
    let t = table(None, &["선수명", "결과", "이닝"], &[&["a", "?", "1"]]);
    assert_eq!(pitchers(Side::Away, &t)[0].stats.decision, None);
  }
}
