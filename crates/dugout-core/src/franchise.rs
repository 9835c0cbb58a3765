//! Franchise history and the season-aware team identity resolver.
//!
//! The history is static reference data: it is validated and indexed once at
//! process start, then shared read-only between workers. A team code is never
//! resolved by the code alone; every answer is scoped to a season.

use std::{
  collections::{BTreeMap, BTreeSet, HashMap},
  fmt,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Stable identifier of a franchise across all of its names and codes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FranchiseId(pub u16);

impl fmt::Display for FranchiseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Reference data ──────────────────────────────────────────────────────────

/// One code a franchise used over a contiguous span of seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FranchiseHistoryEntry {
  pub franchise_id: FranchiseId,
  pub team_code:    String,
  pub start_season: i32,
  /// `None` while the code is still in use.
  pub end_season:   Option<i32>,
}

impl FranchiseHistoryEntry {
  /// Whether `season` falls inside this entry's interval. An open end extends
  /// to any later season.
  pub fn covers(&self, season: i32) -> bool {
    self.start_season <= season && self.end_season.is_none_or(|end| season <= end)
  }

  fn intersects(&self, other: &Self) -> bool {
    let self_end = self.end_season.unwrap_or(i32::MAX);
    let other_end = other.end_season.unwrap_or(i32::MAX);
    self.start_season <= other_end && other.start_season <= self_end
  }
}

/// The modern display code of a franchise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCode {
  pub franchise_id: FranchiseId,
  pub code:         String,
}

/// A token (full name, short name, game-id segment) mapped to a team code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAlias {
  pub token: String,
  pub code:  String,
}

/// Everything needed to build a [`FranchiseHistory`].
///
/// Loaded from configuration when an operator supplies a reference-data file,
/// otherwise [`ReferenceData::builtin`] is used. Tables are lists rather than
/// maps so that keys survive case-folding configuration loaders untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
  pub history:     Vec<FranchiseHistoryEntry>,
  pub canonical:   Vec<CanonicalCode>,
  /// Side designators that are valid team codes without being franchises
  /// (all-star game teams).
  #[serde(default)]
  pub designators: Vec<String>,
  /// Full and short team names as printed on box-score pages.
  #[serde(default)]
  pub names:       Vec<CodeAlias>,
  /// Static game-id segment table, consulted when season-aware resolution
  /// fails.
  #[serde(default)]
  pub segments:    Vec<CodeAlias>,
}

fn entry(id: u16, code: &str, start: i32, end: Option<i32>) -> FranchiseHistoryEntry {
  FranchiseHistoryEntry {
    franchise_id: FranchiseId(id),
    team_code:    code.to_string(),
    start_season: start,
    end_season:   end,
  }
}

fn aliases(pairs: &[(&str, &str)]) -> Vec<CodeAlias> {
  pairs
    .iter()
    .map(|(token, code)| CodeAlias {
      token: token.to_string(),
      code:  code.to_string(),
    })
    .collect()
}

impl ReferenceData {
  /// The league's franchise lineage from 1982 onwards.
  pub fn builtin() -> Self {
    let history = vec![
      entry(1, "SS", 1982, None),
      entry(2, "LT", 1982, None),
      entry(3, "MBC", 1982, Some(1989)),
      entry(3, "LG", 1990, None),
      entry(4, "OB", 1982, Some(1995)),
      entry(4, "DO", 1996, None),
      entry(5, "HT", 1982, Some(2000)),
      entry(5, "KIA", 2001, None),
      // Sammi was sold mid-1985; the whole 1985 season is filed under Chungbo.
      entry(6, "SM", 1982, Some(1984)),
      entry(6, "CB", 1985, Some(1987)),
      entry(6, "TP", 1988, Some(1995)),
      entry(6, "HU", 1996, Some(2007)),
      entry(6, "WO", 2008, Some(2009)),
      entry(6, "NX", 2010, Some(2018)),
      entry(6, "KI", 2019, None),
      entry(7, "BE", 1986, Some(1992)),
      entry(7, "HH", 1993, None),
      entry(8, "SL", 1990, Some(1999)),
      entry(8, "SK", 2000, Some(2020)),
      entry(8, "SSG", 2021, None),
      entry(9, "NC", 2011, None),
      entry(10, "KT", 2013, None),
    ];

    let canonical = [
      (1, "SS"),
      (2, "LT"),
      (3, "LG"),
      (4, "OB"),
      (5, "KIA"),
      (6, "WO"),
      (7, "HH"),
      (8, "SSG"),
      (9, "NC"),
      (10, "KT"),
    ]
    .into_iter()
    .map(|(id, code)| CanonicalCode {
      franchise_id: FranchiseId(id),
      code:         code.to_string(),
    })
    .collect();

    let names = aliases(&[
      ("삼성", "SS"),
      ("삼성 라이온즈", "SS"),
      ("롯데", "LT"),
      ("롯데 자이언츠", "LT"),
      ("두산", "OB"),
      ("두산 베어스", "OB"),
      ("OB베어스", "OB"),
      ("LG 트윈스", "LG"),
      ("KIA 타이거즈", "HT"),
      ("기아", "HT"),
      ("기아 타이거즈", "HT"),
      ("해태", "HT"),
      ("해태 타이거즈", "HT"),
      ("한화", "HH"),
      ("한화 이글스", "HH"),
      ("빙그레", "BE"),
      ("빙그레 이글스", "BE"),
      ("KT 위즈", "KT"),
      ("NC 다이노스", "NC"),
      ("키움", "WO"),
      ("키움 히어로즈", "WO"),
      ("넥센", "NX"),
      ("넥센 히어로즈", "NX"),
      ("우리", "WO"),
      ("우리 히어로즈", "WO"),
      ("현대", "HU"),
      ("현대 유니콘스", "HU"),
      ("태평양", "TP"),
      ("태평양 돌핀스", "TP"),
      ("청보", "CB"),
      ("청보 핀토스", "CB"),
      ("삼미", "SM"),
      ("삼미 슈퍼스타즈", "SM"),
      ("MBC 청룡", "MBC"),
      ("MBC청룡", "MBC"),
      ("SSG 랜더스", "SSG"),
      ("SK 와이번스", "SK"),
      ("쌍방울", "SL"),
      ("쌍방울 레이더스", "SL"),
      ("나눔", "EA"),
      ("드림", "WE"),
      ("동군", "EA"),
      ("서군", "WE"),
    ]);

    let segments = aliases(&[
      ("LG", "LG"),
      ("KT", "KT"),
      ("SS", "SS"),
      ("NC", "NC"),
      ("OB", "OB"),
      ("DO", "OB"),
      ("HH", "HH"),
      ("LT", "LT"),
      ("SK", "SSG"),
      ("WO", "WO"),
      ("KI", "WO"),
      ("HT", "HT"),
      ("SA", "SS"),
      ("AN", "HH"),
      ("HY", "WO"),
      ("TP", "WO"),
      ("CB", "WO"),
      ("SM", "WO"),
      ("NX", "WO"),
      ("HU", "WO"),
      ("BE", "HH"),
      ("SL", "SSG"),
      ("MB", "LG"),
      ("EA", "EA"),
      ("WE", "WE"),
    ]);

    Self {
      history,
      canonical,
      designators: vec!["EA".to_string(), "WE".to_string()],
      names,
      segments,
    }
  }
}

// ─── Canonical code set ──────────────────────────────────────────────────────

/// The closed set of codes a validated box score may carry: one modern code
/// per franchise plus the special designators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalCodes(BTreeSet<String>);

impl CanonicalCodes {
  pub fn new<I, S>(codes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(codes.into_iter().map(Into::into).collect())
  }

  pub fn contains(&self, code: &str) -> bool { self.0.contains(code) }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Validated, indexed franchise history.
#[derive(Debug, Clone)]
pub struct FranchiseHistory {
  entries:         Vec<FranchiseHistoryEntry>,
  /// Upper-cased code → entry indexes, in declaration order.
  by_code:         HashMap<String, Vec<usize>>,
  /// Franchise → entry indexes, sorted by start season.
  by_franchise:    BTreeMap<FranchiseId, Vec<usize>>,
  canonical:       BTreeMap<FranchiseId, String>,
  designators:     BTreeSet<String>,
  names:           HashMap<String, String>,
  segments:        HashMap<String, String>,
  canonical_codes: CanonicalCodes,
}

impl FranchiseHistory {
  /// Validate `data` and build the lookup indexes.
  ///
  /// Any invariant violation is a configuration error; callers are expected
  /// to abort startup on `Err`.
  pub fn load(data: ReferenceData) -> Result<Self> {
    let ReferenceData {
      history: entries,
      canonical: canonical_list,
      designators,
      names,
      segments,
    } = data;

    let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
    let mut by_franchise: BTreeMap<FranchiseId, Vec<usize>> = BTreeMap::new();
    for (i, e) in entries.iter().enumerate() {
      if let Some(end) = e.end_season
        && end < e.start_season
      {
        return Err(Error::InvertedInterval {
          franchise: e.franchise_id,
          code:      e.team_code.clone(),
          start:     e.start_season,
          end,
        });
      }
      by_code.entry(e.team_code.to_uppercase()).or_default().push(i);
      by_franchise.entry(e.franchise_id).or_default().push(i);
    }

    for (&franchise, idxs) in by_franchise.iter_mut() {
      idxs.sort_by_key(|&i| entries[i].start_season);
      check_contiguous(franchise, idxs, &entries)?;
    }
    check_codes_unambiguous(&by_code, &entries)?;

    let mut canonical = BTreeMap::new();
    for c in canonical_list {
      let Some(idxs) = by_franchise.get(&c.franchise_id) else {
        continue;
      };
      if !idxs.iter().any(|&i| entries[i].team_code == c.code) {
        return Err(Error::ForeignCanonicalCode {
          franchise: c.franchise_id,
          code:      c.code,
        });
      }
      if canonical.insert(c.franchise_id, c.code).is_some() {
        return Err(Error::DuplicateCanonical(c.franchise_id));
      }
    }
    if let Some(&missing) = by_franchise.keys().find(|f| !canonical.contains_key(*f)) {
      return Err(Error::MissingCanonicalCode(missing));
    }

    let designators: BTreeSet<String> =
      designators.into_iter().map(|d| d.to_uppercase()).collect();
    let canonical_codes =
      CanonicalCodes::new(canonical.values().cloned().chain(designators.iter().cloned()));

    Ok(Self {
      entries,
      by_code,
      by_franchise,
      canonical,
      designators,
      names: names
        .into_iter()
        .map(|a| (normalize_name(&a.token), a.code.to_uppercase()))
        .collect(),
      segments: segments
        .into_iter()
        .map(|a| (a.token.to_uppercase(), a.code.to_uppercase()))
        .collect(),
      canonical_codes,
    })
  }

  /// Shorthand for loading [`ReferenceData::builtin`].
  pub fn builtin() -> Result<Self> { Self::load(ReferenceData::builtin()) }

  pub fn entries(&self) -> &[FranchiseHistoryEntry] { &self.entries }

  pub fn canonical_codes(&self) -> &CanonicalCodes { &self.canonical_codes }

  pub fn is_designator(&self, code: &str) -> bool {
    self.designators.contains(&code.to_uppercase())
  }

  /// The code that was in use for the token's franchise in `season_year`.
  ///
  /// The token may be a historical code or a printed team name. When the
  /// token's own interval covers the season the token itself is returned,
  /// so a year-accurate legacy code is never upgraded to a later one.
  /// Designators and unknown tokens yield `None`.
  pub fn resolve_for_season(&self, raw_token: &str, season_year: i32) -> Option<&str> {
    let hits = self.code_hits(raw_token)?;

    if let Some(&own) = hits.iter().find(|&&i| self.entries[i].covers(season_year)) {
      return Some(&self.entries[own].team_code);
    }

    let franchise = self.entries[*hits.first()?].franchise_id;
    self
      .by_franchise
      .get(&franchise)?
      .iter()
      .map(|&i| &self.entries[i])
      .find(|e| e.covers(season_year))
      .map(|e| e.team_code.as_str())
  }

  /// Like [`Self::resolve_for_season`], but special designators pass through
  /// unchanged.
  pub fn resolve_team(&self, raw_token: &str, season_year: i32) -> Option<&str> {
    if let Some(code) = self.resolve_for_season(raw_token, season_year) {
      return Some(code);
    }
    let key = self.lookup_key(raw_token)?;
    self.designators.get(&key).map(String::as_str)
  }

  /// The modern code of a franchise, regardless of season.
  pub fn canonical_for_franchise(&self, franchise_id: FranchiseId) -> Option<&str> {
    self.canonical.get(&franchise_id).map(String::as_str)
  }

  /// The franchise playing as `code` in `season_year`. A code that two
  /// franchises held at different times resolves by season.
  pub fn franchise_of(&self, code: &str, season_year: i32) -> Option<FranchiseId> {
    let resolved = self.resolve_for_season(code, season_year)?;
    self
      .by_code
      .get(resolved)?
      .iter()
      .map(|&i| &self.entries[i])
      .find(|e| e.covers(season_year))
      .map(|e| e.franchise_id)
  }

  /// The canonical code of the franchise behind `code` in `season_year`; a
  /// designator maps to itself.
  pub fn franchise_code(&self, code: &str, season_year: i32) -> Option<&str> {
    match self.franchise_of(code, season_year) {
      Some(id) => self.canonical_for_franchise(id),
      None => self.designators.get(&code.trim().to_uppercase()).map(String::as_str),
    }
  }

  /// Raw value of the static game-id segment table.
  pub fn segment_code(&self, segment: &str) -> Option<&str> {
    self.segments.get(&segment.trim().to_uppercase()).map(String::as_str)
  }

  /// Map a printed team name or code to the code it should be looked up as.
  fn lookup_key(&self, raw_token: &str) -> Option<String> {
    let name = normalize_name(raw_token);
    if name.is_empty() {
      return None;
    }
    let upper = name.to_uppercase();
    if self.by_code.contains_key(&upper) || self.designators.contains(&upper) {
      return Some(upper);
    }
    Some(self.names.get(&name).cloned().unwrap_or(upper))
  }

  fn code_hits(&self, raw_token: &str) -> Option<&[usize]> {
    let key = self.lookup_key(raw_token)?;
    self.by_code.get(&key).map(Vec::as_slice)
  }
}

/// Join wrapped lines and collapse runs of whitespace.
pub fn normalize_name(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn check_contiguous(
  franchise: FranchiseId,
  idxs: &[usize],
  entries: &[FranchiseHistoryEntry],
) -> Result<()> {
  for pair in idxs.windows(2) {
    let (a, b) = (&entries[pair[0]], &entries[pair[1]]);
    let Some(a_end) = a.end_season else {
      return Err(Error::OpenIntervalNotLast {
        franchise,
        code: a.team_code.clone(),
      });
    };
    if b.start_season <= a_end {
      return Err(Error::OverlappingInterval {
        franchise,
        first: a.team_code.clone(),
        second: b.team_code.clone(),
        season: b.start_season,
      });
    }
    if b.start_season > a_end + 1 {
      return Err(Error::GapInHistory {
        franchise,
        from: a_end + 1,
        to: b.start_season - 1,
      });
    }
  }
  Ok(())
}

fn check_codes_unambiguous(
  by_code: &HashMap<String, Vec<usize>>,
  entries: &[FranchiseHistoryEntry],
) -> Result<()> {
  for (code, idxs) in by_code {
    for (n, &i) in idxs.iter().enumerate() {
      for &j in &idxs[n + 1..] {
        let (a, b) = (&entries[i], &entries[j]);
        if a.franchise_id != b.franchise_id && a.intersects(b) {
          return Err(Error::AmbiguousCode {
            code:   code.clone(),
            first:  a.franchise_id,
            second: b.franchise_id,
            season: a.start_season.max(b.start_season),
          });
        }
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const CURRENT_SEASON: i32 = 2025;

  fn history() -> FranchiseHistory { FranchiseHistory::builtin().unwrap() }

  fn data(entries: Vec<FranchiseHistoryEntry>) -> ReferenceData {
    let mut canonical: Vec<CanonicalCode> = Vec::new();
    for e in &entries {
      if !canonical.iter().any(|c| c.franchise_id == e.franchise_id) {
        canonical.push(CanonicalCode {
          franchise_id: e.franchise_id,
          code:         e.team_code.clone(),
        });
      }
    }
    ReferenceData {
      history: entries,
      canonical,
      designators: vec![],
      names: vec![],
      segments: vec![],
    }
  }

  #[test]
  fn builtin_history_loads() {
    let h = history();
    assert_eq!(h.canonical_codes().len(), 12);
    assert!(h.canonical_codes().contains("KIA"));
    assert!(h.canonical_codes().contains("EA"));
    assert!(!h.canonical_codes().contains("HT"));
  }

  #[test]
  fn every_code_resolves_to_itself_inside_its_interval() {
    let h = history();
    for e in h.entries() {
      let end = e.end_season.unwrap_or(CURRENT_SEASON);
      for season in e.start_season..=end {
        assert_eq!(
          h.resolve_for_season(&e.team_code, season),
          Some(e.team_code.as_str()),
          "{} in {season}",
          e.team_code
        );
      }
    }
  }

  #[test]
  fn sibling_codes_migrate_to_the_code_of_the_season() {
    let h = history();
    for e in h.entries() {
      let end = e.end_season.unwrap_or(CURRENT_SEASON);
      let siblings = h
        .entries()
        .iter()
        .filter(|o| o.franchise_id == e.franchise_id && o.team_code != e.team_code);
      for other in siblings {
        for season in e.start_season..=end {
          assert_eq!(
            h.resolve_for_season(&other.team_code, season),
            Some(e.team_code.as_str()),
            "{} in {season}",
            other.team_code
          );
        }
      }
    }
  }

  #[test]
  fn legacy_code_is_not_upgraded_in_its_own_era() {
    let h = history();
    assert_eq!(h.resolve_for_season("HT", 1995), Some("HT"));
    assert_eq!(h.resolve_for_season("HT", 2024), Some("KIA"));
    assert_eq!(h.resolve_for_season("KIA", 1990), Some("HT"));
  }

  #[test]
  fn resolution_is_case_and_whitespace_tolerant() {
    let h = history();
    assert_eq!(h.resolve_for_season(" hh ", 2024), Some("HH"));
    assert_eq!(h.resolve_for_season("kt", 2024), Some("KT"));
  }

  #[test]
  fn printed_names_resolve_through_the_name_table() {
    let h = history();
    assert_eq!(h.resolve_for_season("해태", 1990), Some("HT"));
    assert_eq!(h.resolve_for_season("KIA 타이거즈", 2024), Some("KIA"));
    assert_eq!(h.resolve_for_season("두산  베어스", 2024), Some("DO"));
    assert_eq!(h.resolve_for_season("키움\n히어로즈", 2024), Some("KI"));
  }

  #[test]
  fn seasons_outside_a_franchise_yield_none() {
    let h = history();
    assert_eq!(h.resolve_for_season("NC", 2005), None);
    assert_eq!(h.resolve_for_season("SL", 2001), Some("SK"));
    assert_eq!(h.resolve_for_season("ZZ", 2024), None);
    assert_eq!(h.resolve_for_season("", 2024), None);
  }

  #[test]
  fn designators_are_teams_but_not_franchises() {
    let h = history();
    assert_eq!(h.resolve_for_season("EA", 2019), None);
    assert_eq!(h.resolve_team("EA", 2019), Some("EA"));
    assert_eq!(h.resolve_team("드림", 2019), Some("WE"));
    assert_eq!(h.franchise_code("WE", 2019), Some("WE"));
  }

  #[test]
  fn franchise_code_is_the_modern_code() {
    let h = history();
    assert_eq!(h.franchise_code("MBC", 1985), Some("LG"));
    assert_eq!(h.franchise_code("KI", 2024), Some("WO"));
    assert_eq!(h.franchise_code("DO", 2024), Some("OB"));
    assert_eq!(h.franchise_code("DO", 1985), Some("OB"));
    assert_eq!(h.franchise_code("ZZ", 2024), None);
    assert_eq!(h.canonical_for_franchise(FranchiseId(5)), Some("KIA"));
    assert_eq!(h.canonical_for_franchise(FranchiseId(99)), None);
  }

  #[test]
  fn overlapping_intervals_are_rejected() {
    let r = FranchiseHistory::load(data(vec![
      entry(1, "AA", 1982, Some(1990)),
      entry(1, "BB", 1990, None),
    ]));
    assert!(matches!(r, Err(Error::OverlappingInterval { season: 1990, .. })));
  }

  #[test]
  fn gaps_are_rejected() {
    let r = FranchiseHistory::load(data(vec![
      entry(1, "AA", 1982, Some(1988)),
      entry(1, "BB", 1991, None),
    ]));
    assert!(matches!(
      r,
      Err(Error::GapInHistory { from: 1989, to: 1990, .. })
    ));
  }

  #[test]
  fn open_interval_must_be_last() {
    let r = FranchiseHistory::load(data(vec![
      entry(1, "AA", 1982, None),
      entry(1, "BB", 1991, None),
    ]));
    assert!(matches!(r, Err(Error::OpenIntervalNotLast { .. })));
  }

  #[test]
  fn inverted_intervals_are_rejected() {
    let r = FranchiseHistory::load(data(vec![entry(1, "AA", 1990, Some(1982))]));
    assert!(matches!(r, Err(Error::InvertedInterval { .. })));
  }

  #[test]
  fn a_code_shared_by_two_franchises_at_once_is_rejected() {
    let r = FranchiseHistory::load(data(vec![
      entry(1, "AA", 1982, None),
      entry(2, "AA", 2000, None),
    ]));
    assert!(matches!(r, Err(Error::AmbiguousCode { season: 2000, .. })));
  }

  #[test]
  fn a_reused_code_belongs_to_the_franchise_of_the_season() {
    let h = FranchiseHistory::load(data(vec![
      entry(1, "AA", 1982, Some(1990)),
      entry(1, "BB", 1991, None),
      entry(2, "CC", 1982, Some(1995)),
      entry(2, "AA", 1996, None),
    ]))
    .unwrap();
    assert_eq!(h.franchise_of("AA", 1985), Some(FranchiseId(1)));
    assert_eq!(h.franchise_of("AA", 2000), Some(FranchiseId(2)));
    assert_eq!(h.franchise_code("AA", 1985), Some("AA"));
    assert_eq!(h.franchise_code("AA", 2000), Some("CC"));
    assert_eq!(h.franchise_of("BB", 1985), Some(FranchiseId(1)));
  }

  #[test]
  fn every_franchise_needs_a_canonical_code() {
    let mut d = data(vec![entry(1, "AA", 1982, None), entry(2, "BB", 1982, None)]);
    d.canonical.retain(|c| c.franchise_id == FranchiseId(1));
    let r = FranchiseHistory::load(d);
    assert!(matches!(r, Err(Error::MissingCanonicalCode(FranchiseId(2)))));
  }

  #[test]
  fn reference_data_round_trips_through_json() {
    let json = serde_json::to_string(&ReferenceData::builtin()).unwrap();
    let back: ReferenceData = serde_json::from_str(&json).unwrap();
    assert!(FranchiseHistory::load(back).is_ok());
  }
}
