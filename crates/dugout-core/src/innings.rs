//! Innings pitched, stored as outs.
//!
//! Box scores print innings in base-3 fractional notation ("5 1/3") or in the
//! dotted display form ("5.1"). Neither is closed under decimal addition, so
//! everything is converted to an integer count of outs.

use std::{
  fmt,
  iter::Sum,
  ops::{Add, AddAssign},
};

use serde::{Deserialize, Serialize};

/// Integer count of outs recorded; 3 outs make one inning.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Outs(pub u32);

impl Outs {
  /// `None` when the count does not fit in a `u32`.
  pub fn from_innings(whole: u32, thirds: u32) -> Option<Self> {
    whole.checked_mul(3)?.checked_add(thirds).map(Self)
  }

  pub fn innings(self) -> u32 { self.0 / 3 }

  pub fn thirds(self) -> u32 { self.0 % 3 }

  /// Parse a printed innings-pitched value.
  ///
  /// Accepts "5 1/3", "5 2/3", "1/3", "5", "5⅓", and the dotted "5.1" / "5.2"
  /// notation. Empty and "-" cells, as well as anything else, yield `None`.
  pub fn parse(raw: &str) -> Option<Self> {
    let s = raw.trim().replace('⅓', " 1/3").replace('⅔', " 2/3");
    let mut parts = s.split_whitespace();
    let (whole, fraction) = match (parts.next()?, parts.next(), parts.next()) {
      (whole, Some(fraction), None) => (whole.parse::<u32>().ok()?, fraction),
      (only, None, _) if only.contains('/') => (0, only),
      (only, None, _) => return parse_dotted(only),
      _ => return None,
    };
    Self::from_innings(whole, parse_thirds(fraction)?)
  }

  /// The dotted display form, e.g. `5.1` for 16 outs.
  pub fn dotted(self) -> String { format!("{}.{}", self.innings(), self.thirds()) }
}

fn parse_thirds(fraction: &str) -> Option<u32> {
  let (numerator, denominator) = fraction.split_once('/')?;
  if denominator != "3" {
    return None;
  }
  numerator.parse::<u32>().ok().filter(|n| *n < 3)
}

fn parse_dotted(s: &str) -> Option<Outs> {
  match s.split_once('.') {
    None => Outs::from_innings(s.parse::<u32>().ok()?, 0),
    Some((whole, thirds)) => {
      let whole = if whole.is_empty() { 0 } else { whole.parse::<u32>().ok()? };
      let thirds = match thirds {
        "0" => 0,
        "1" => 1,
        "2" => 2,
        _ => return None,
      };
      Outs::from_innings(whole, thirds)
    }
  }
}

impl fmt::Display for Outs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.innings(), self.thirds()) {
      (whole, 0) => write!(f, "{whole}"),
      (0, thirds) => write!(f, "{thirds}/3"),
      (whole, thirds) => write!(f, "{whole} {thirds}/3"),
    }
  }
}

impl Add for Outs {
  type Output = Outs;

  fn add(self, rhs: Outs) -> Outs { Outs(self.0.saturating_add(rhs.0)) }
}

impl AddAssign for Outs {
  fn add_assign(&mut self, rhs: Outs) { *self = *self + rhs; }
}

impl Sum for Outs {
  fn sum<I: Iterator<Item = Outs>>(iter: I) -> Outs { iter.fold(Outs(0), |acc, outs| acc + outs) }
}
