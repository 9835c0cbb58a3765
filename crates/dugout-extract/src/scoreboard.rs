//! Scoreboard (line score) reading.
//!
//! Two markups exist: one table with team, inning and R/H/E columns, and the
//! same data split over three side-by-side tables (team names, innings,
//! totals). Both yield a [`TeamLine`] per side with name and numbers only;
//! codes are resolved later.

use dugout_core::box_score::{SideMap, TeamLine};

use crate::{
  numeric::parse_count,
  table::{Cell, Page, Table},
};

const TEAM: &[&str] = &["TEAM", "팀", "팀명"];
const PLAYER_COLUMNS: &[&str] = &["타수", "AB", "이닝", "IP", "선수명"];

fn is_inning_header(h: &str) -> bool {
  h.trim_end_matches('회').parse::<u32>().is_ok_and(|n| (1..=25).contains(&n))
}

fn has_totals(t: &Table) -> bool {
  t.has_header(&["R"]) && t.has_header(&["H"]) && !t.has_header(PLAYER_COLUMNS)
}

fn is_unified(t: &Table) -> bool {
  t.has_header(TEAM) && has_totals(t) && t.rows.len() >= 2
}

fn is_team_table(t: &Table) -> bool {
  t.has_header(TEAM) && !has_totals(t) && t.rows.len() >= 2
}

fn is_inning_table(t: &Table) -> bool {
  t.headers.iter().filter(|h| is_inning_header(h)).count() >= 3
    && !t.has_header(TEAM)
    && !has_totals(t)
    && t.rows.len() >= 2
}

fn is_totals_table(t: &Table) -> bool {
  has_totals(t) && !t.has_header(TEAM) && t.rows.len() >= 2
}

/// Whether the page carries a single team/R/H/E table.
pub fn has_unified(page: &Page) -> bool { page.tables.iter().any(is_unified) }

/// Whether the page carries the three-table scoreboard.
pub fn has_split(page: &Page) -> bool {
  page.tables.iter().any(is_team_table)
    && page.tables.iter().any(is_inning_table)
    && page.tables.iter().any(is_totals_table)
}

fn cell_at<'a>(row: &'a [Cell], i: Option<usize>) -> Option<&'a str> {
  i.and_then(|i| row.get(i)).map(|c| c.text.as_str())
}

fn team_name(raw: Option<&str>) -> Option<String> {
  raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn line_from(
  name: Option<&str>,
  innings: Vec<Option<u32>>,
  totals: &Table,
  row: &[Cell],
) -> TeamLine {
  TeamLine {
    name: team_name(name),
    score: cell_at(row, totals.column(&["R"])).and_then(parse_count),
    hits: cell_at(row, totals.column(&["H"])).and_then(parse_count),
    errors: cell_at(row, totals.column(&["E"])).and_then(parse_count),
    line_score: innings,
    ..TeamLine::default()
  }
}

fn innings_of(t: &Table, row: &[Cell]) -> Vec<Option<u32>> {
  t.headers
    .iter()
    .enumerate()
    .filter(|(_, h)| is_inning_header(h))
    .map(|(i, _)| row.get(i).and_then(|c| parse_count(&c.text)))
    .collect()
}

fn read_unified(t: &Table) -> SideMap<TeamLine> {
  let team_col = t.column(TEAM);
  let line = |row: &[Cell]| line_from(cell_at(row, team_col), innings_of(t, row), t, row);
  SideMap {
    away: line(t.rows[0].as_slice()),
    home: line(t.rows[1].as_slice()),
  }
}

fn read_split(team: &Table, innings: &Table, totals: &Table) -> SideMap<TeamLine> {
  let team_col = team.column(TEAM);
  let line = |i: usize| {
    line_from(
      cell_at(&team.rows[i], team_col),
      innings_of(innings, &innings.rows[i]),
      totals,
      &totals.rows[i],
    )
  };
  SideMap {
    away: line(0),
    home: line(1),
  }
}

/// Away and home lines, in that row order, or `None` without a scoreboard.
pub fn read(page: &Page) -> Option<SideMap<TeamLine>> {
  if let Some(t) = page.tables.iter().find(|t| is_unified(t)) {
    return Some(read_unified(t));
  }
  let team = page.tables.iter().find(|t| is_team_table(t))?;
  let innings = page.tables.iter().find(|t| is_inning_table(t))?;
  let totals = page.tables.iter().find(|t| is_totals_table(t))?;
  Some(read_split(team, innings, totals))
}

#[cfg(test)]
mod tests {
  use scraper::Html;

  use super::*;

  fn page(html: &str) -> Page { Page::read(&Html::parse_document(html)).unwrap() }

  #[test]
  fn unified_scoreboard() {
    let p = page(
      "<table><thead><tr><th>팀</th><th>1</th><th>2</th><th>3</th><th>R</th><th>H</th><th>E</th></tr></thead>
       <tbody><tr><td>삼성</td><td>1</td><td>0</td><td>2</td><td>3</td><td>7</td><td>0</td></tr>
              <tr><td>롯데</td><td>0</td><td>0</td><td>X</td><td>0</td><td>4</td><td>1,0</td></tr></tbody></table>",
    );
    assert!(has_unified(&p));
    let s = read(&p).unwrap();
    assert_eq!(s.away.name.as_deref(), Some("삼성"));
    assert_eq!(s.away.line_score, vec![Some(1), Some(0), Some(2)]);
    assert_eq!((s.away.score, s.away.hits, s.away.errors), (Some(3), Some(7), Some(0)));
    assert_eq!(s.home.line_score, vec![Some(0), Some(0), None]);
    assert_eq!(s.home.errors, Some(10));
  }

  #[test]
  fn split_scoreboard() {
    let p = page(
      "<table><thead><tr><th>TEAM</th></tr></thead><tbody><tr><td>한화</td></tr><tr><td>LG</td></tr></tbody></table>
       <table><thead><tr><th>1</th><th>2</th><th>3</th><th>4</th></tr></thead>
         <tbody><tr><td>0</td><td>1</td><td>0</td><td>0</td></tr><tr><td>2</td><td>0</td><td>0</td><td>-</td></tr></tbody></table>
       <table><thead><tr><th>R</th><th>H</th><th>E</th><th>B</th></tr></thead>
         <tbody><tr><td>1</td><td>5</td><td>1</td><td>3</td></tr><tr><td>2</td><td>6</td><td>0</td><td>2</td></tr></tbody></table>",
    );
    assert!(!has_unified(&p));
    assert!(has_split(&p));
    let s = read(&p).unwrap();
    assert_eq!(s.home.name.as_deref(), Some("LG"));
    assert_eq!(s.away.line_score_total(), 1);
    assert_eq!(s.home.line_score, vec![Some(2), Some(0), Some(0), None]);
    assert_eq!(s.home.score, Some(2));
  }

  #[test]
  fn player_tables_are_not_scoreboards() {
    let p = page(
      "<table><thead><tr><th>선수명</th><th>타수</th><th>R</th><th>H</th></tr></thead>
       <tbody><tr><td>a</td><td>1</td><td>0</td><td>0</td></tr><tr><td>b</td><td>1</td><td>0</td><td>0</td></tr></tbody></table>",
    );
    assert!(read(&p).is_none());
  }
}
