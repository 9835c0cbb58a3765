//! Reading HTML tables into plain header/row data.
//!
//! Every `<table>` on the page is read exactly once into a [`Table`]; era
//! detection and extraction then work on these values instead of the DOM.

use dugout_core::box_score::PlayerId;
use scraper::{ElementRef, Html, Selector};

use crate::{
  Error, Result,
  numeric::clean_text,
};

pub(crate) fn selector(css: &str) -> Result<Selector> {
  Selector::parse(css).map_err(|e| Error::InvalidSelector(format!("{css:?}: {e:?}")))
}

// ─── Cells and tables ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
  pub text:      String,
  /// Id from a `playerId=` link inside the cell.
  pub player_id: Option<PlayerId>,
  /// Text of that link.
  pub link_text: Option<String>,
}

impl Cell {
  pub fn text(text: &str) -> Self {
    Self {
      text: text.to_string(),
      ..Self::default()
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
  pub id:      Option<String>,
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<Cell>>,
}

impl Table {
  /// Header of column `i`, or `COL_{i}` when the column has none.
  pub fn header(&self, i: usize) -> String {
    match self.headers.get(i) {
      Some(h) if !h.is_empty() => h.clone(),
      _ => format!("COL_{i}"),
    }
  }

  pub fn has_header(&self, wanted: &[&str]) -> bool {
    self
      .headers
      .iter()
      .any(|h| wanted.iter().any(|w| h.eq_ignore_ascii_case(w)))
  }

  pub fn column(&self, wanted: &[&str]) -> Option<usize> {
    self
      .headers
      .iter()
      .position(|h| wanted.iter().any(|w| h.eq_ignore_ascii_case(w)))
  }
}

struct Selectors {
  header_cells: Selector,
  body_rows:    Selector,
  any_rows:     Selector,
  cells:        Selector,
  player_link:  Selector,
}

impl Selectors {
  fn new() -> Result<Self> {
    Ok(Self {
      header_cells: selector("thead th")?,
      body_rows:    selector("tbody > tr")?,
      any_rows:     selector("tr")?,
      cells:        selector("th, td")?,
      player_link:  selector("a[href*='playerId=']")?,
    })
  }

  fn read(&self, table: ElementRef<'_>) -> Table {
    let mut headers: Vec<String> = table
      .select(&self.header_cells)
      .map(|th| element_text(th))
      .collect();

    let mut rows: Vec<Vec<Cell>> = table
      .select(&self.body_rows)
      .map(|tr| self.read_row(tr))
      .collect();
    if rows.is_empty() {
      rows = table
        .select(&self.any_rows)
        .filter(|tr| !in_thead(*tr))
        .map(|tr| self.read_row(tr))
        .collect();
    }

    // Header-less tables often carry their headers as a leading row of <th>.
    if headers.is_empty()
      && let Some(first) = table.select(&self.any_rows).next()
      && first.select(&self.cells).all(|c| c.value().name() == "th")
      && first.select(&self.cells).next().is_some()
    {
      headers = first.select(&self.cells).map(element_text).collect();
      if !rows.is_empty() {
        rows.remove(0);
      }
    }

    Table {
      id: table.value().id().map(str::to_string),
      headers,
      rows,
    }
  }

  fn read_row(&self, tr: ElementRef<'_>) -> Vec<Cell> {
    tr.select(&self.cells)
      .map(|cell| {
        let link = cell.select(&self.player_link).next();
        Cell {
          text:      element_text(cell),
          player_id: link
            .and_then(|a| a.value().attr("href"))
            .and_then(player_id_from_href),
          link_text: link.map(element_text).filter(|t| !t.is_empty()),
        }
      })
      .collect()
  }
}

fn in_thead(el: ElementRef<'_>) -> bool {
  el.ancestors()
    .filter_map(ElementRef::wrap)
    .any(|a| a.value().name() == "thead")
}

pub(crate) fn element_text(el: ElementRef<'_>) -> String {
  clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Digits of the `playerId` query parameter.
pub fn player_id_from_href(href: &str) -> Option<PlayerId> {
  let (_, rest) = href.split_once("playerId=")?;
  let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
  digits.parse().ok()
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// All tables of a rendered page, in document order.
#[derive(Debug, Clone, Default)]
pub struct Page {
  pub tables: Vec<Table>,
}

impl Page {
  pub fn read(doc: &Html) -> Result<Self> {
    let selectors = Selectors::new()?;
    let table = selector("table")?;
    Ok(Self {
      tables: doc.select(&table).map(|t| selectors.read(t)).collect(),
    })
  }

  pub fn by_id(&self, id: &str) -> Option<&Table> {
    self.tables.iter().find(|t| t.id.as_deref() == Some(id))
  }
}
