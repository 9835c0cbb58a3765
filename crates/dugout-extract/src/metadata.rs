//! Game information block and the `#tblEtc` summary notes.

use dugout_core::box_score::{GameMetadata, SummaryNote};
use scraper::Html;

use crate::{
  Result,
  numeric::{clean_text, parse_count, parse_duration_minutes},
  table::{Page, element_text, selector},
};

const INFO_AREA: &str = ".box-score-area, .game-info, .score-board";
const NOTES_TABLE: &str = "tblEtc";
const EMPTY_NOTE: &str = "없음";

/// The value printed after `label :` (full-width colon accepted), up to the
/// next whitespace.
fn labeled<'a>(text: &'a str, label: &str) -> Option<&'a str> {
  text.match_indices(label).find_map(|(at, _)| {
    let rest = text[at + label.len()..].trim_start();
    let rest = rest.strip_prefix([':', '：'])?.trim_start();
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
  })
}

fn clock(raw: &str) -> Option<String> {
  let t: String = raw
    .chars()
    .take_while(|c| c.is_ascii_digit() || *c == ':')
    .collect();
  (!t.is_empty()).then_some(t)
}

fn attendance(raw: &str) -> Option<u32> {
  let digits: String = raw
    .chars()
    .take_while(|c| c.is_ascii_digit() || *c == ',')
    .collect();
  parse_count(&digits)
}

/// Parse stadium, attendance and clock fields out of the info block text.
pub fn parse_info(text: &str) -> GameMetadata {
  let text = clean_text(text);
  let game_time = labeled(&text, "경기시간").and_then(clock);
  GameMetadata {
    stadium:          labeled(&text, "구장").map(str::to_string),
    attendance:       labeled(&text, "관중").and_then(attendance),
    start_time:       labeled(&text, "개시").and_then(clock),
    end_time:         labeled(&text, "종료").and_then(clock),
    duration_minutes: game_time.as_deref().and_then(parse_duration_minutes),
  }
}

/// Metadata from the first game information block on the page.
pub fn read(doc: &Html) -> Result<GameMetadata> {
  let area = selector(INFO_AREA)?;
  Ok(
    doc
      .select(&area)
      .next()
      .map(|el| parse_info(&element_text(el)))
      .unwrap_or_default(),
  )
}

/// `(category, text)` rows of the notes table, skipping empty entries.
pub fn summary_notes(page: &Page) -> Vec<SummaryNote> {
  let Some(table) = page.by_id(NOTES_TABLE) else {
    return Vec::new();
  };
  table
    .rows
    .iter()
    .filter_map(|row| {
      let [kind, text, ..] = row.as_slice() else {
        return None;
      };
      let text = text.text.trim();
      (!text.is_empty() && text != EMPTY_NOTE).then(|| SummaryNote {
        kind: kind.text.trim().to_string(),
        text: text.to_string(),
      })
    })
    .collect()
}
