//! Cell parsing rules shared by every layout.
//!
//! A blank or "-" cell is a missing stat, never zero.

fn is_missing(s: &str) -> bool {
  matches!(s, "" | "-" | "null" | "NULL")
}

/// Integer count; thousands separators are stripped.
pub fn parse_count(raw: &str) -> Option<u32> {
  let s = raw.trim();
  if is_missing(s) {
    return None;
  }
  s.replace(',', "").parse().ok()
}

/// Decimal rate such as AVG, ERA or OPS.
pub fn parse_rate(raw: &str) -> Option<f64> {
  let s = raw.trim();
  if is_missing(s) {
    return None;
  }
  s.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leading run of digits, e.g. the batting order in "1" or "1(교체)".
pub fn leading_number(raw: &str) -> Option<u32> {
  let digits: String = raw
    .trim()
    .chars()
    .skip_while(|c| !c.is_ascii_digit())
    .take_while(char::is_ascii_digit)
    .collect();
  digits.parse().ok()
}

/// "H:MM" game time → minutes.
pub fn parse_duration_minutes(raw: &str) -> Option<u32> {
  let (hours, minutes) = raw.trim().split_once(':')?;
  let hours: u32 = hours.trim().parse().ok()?;
  let minutes: u32 = minutes.trim().parse().ok()?;
  (minutes < 60).then_some(hours * 60 + minutes)
}

/// Collapse runs of whitespace (including line breaks) to single spaces.
pub fn clean_text(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_strip_separators_and_keep_missing_apart_from_zero() {
    assert_eq!(parse_count("12,345"), Some(12_345));
    assert_eq!(parse_count(" 0 "), Some(0));
    assert_eq!(parse_count("-"), None);
    assert_eq!(parse_count(""), None);
    assert_eq!(parse_count("null"), None);
    assert_eq!(parse_count("3.5"), None);
  }

  #[test]
  fn rates_parse_as_decimals() {
    assert_eq!(parse_rate("0.333"), Some(0.333));
    assert_eq!(parse_rate(".275"), Some(0.275));
    assert_eq!(parse_rate("12.60"), Some(12.6));
    assert_eq!(parse_rate("-"), None);
    assert_eq!(parse_rate("inf"), None);
  }

  #[test]
  fn batting_order_is_the_first_number() {
    assert_eq!(leading_number("3"), Some(3));
    assert_eq!(leading_number("교체 7"), Some(7));
    assert_eq!(leading_number("二"), None);
  }

  #[test]
  fn durations_are_minutes() {
    assert_eq!(parse_duration_minutes("3:12"), Some(192));
    assert_eq!(parse_duration_minutes("0:45"), Some(45));
    assert_eq!(parse_duration_minutes("3:75"), None);
    assert_eq!(parse_duration_minutes("192"), None);
  }
}
