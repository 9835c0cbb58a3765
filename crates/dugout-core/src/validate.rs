//! Score-conservation checks run on every extracted box score before it is
//! accepted.
//!
//! Hard errors block persistence of the game; warnings are stored alongside
//! it. Every check runs regardless of the outcome of the others.

use serde::{Deserialize, Serialize};

use crate::{
  box_score::{BoxScore, Side},
  franchise::CanonicalCodes,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  pub is_valid: bool,
  pub errors:   Vec<String>,
  pub warnings: Vec<String>,
}

/// Validate `box_score` against the configured set of canonical team codes.
pub fn validate(box_score: &BoxScore, canonical: &CanonicalCodes) -> ValidationResult {
  let mut errors = Vec::new();
  let mut warnings = Vec::new();

  check_required_fields(box_score, canonical, &mut errors);
  check_lineups(box_score, &mut errors);
  for side in Side::BOTH {
    check_line_score(box_score, side, &mut warnings);
    check_hitter_runs(box_score, side, &mut warnings);
  }

  ValidationResult {
    is_valid: errors.is_empty(),
    errors,
    warnings,
  }
}

fn check_required_fields(
  box_score: &BoxScore,
  canonical: &CanonicalCodes,
  errors: &mut Vec<String>,
) {
  if box_score.game_id.trim().is_empty() {
    errors.push("Missing game_id".to_string());
  }
  if box_score.game_date.is_none() {
    errors.push("Missing game_date".to_string());
  }

  for (side, team) in box_score.teams.iter() {
    let Some(resolved) = team.resolved_code.as_deref() else {
      errors.push(format!("Missing {side} team code"));
      continue;
    };
    match team.franchise_code.as_deref() {
      None => errors.push(format!("Unresolved franchise for {side} team code '{resolved}'")),
      Some(code) if !canonical.contains(code) => errors.push(format!(
        "Invalid {side} team code: '{code}'. Must be one of [{}]",
        canonical.iter().collect::<Vec<_>>().join(", ")
      )),
      Some(_) => {}
    }
  }
}

fn check_lineups(box_score: &BoxScore, errors: &mut Vec<String>) {
  for side in Side::BOTH {
    if box_score.hitters.get(side).is_empty() {
      errors.push(format!("No hitter rows for {side}"));
    }
    if box_score.pitchers.get(side).is_empty() {
      errors.push(format!("No pitcher rows for {side}"));
    }
  }
}

fn check_line_score(box_score: &BoxScore, side: Side, warnings: &mut Vec<String>) {
  let team = box_score.teams.get(side);
  let Some(score) = team.score else { return };
  if team.line_score.is_empty() {
    return;
  }
  let computed = team.line_score_total();
  if computed != score {
    warnings.push(format!("{side} line score ({computed}) != total score ({score})"));
  }
}

/// Skipped when no hitter row carries a runs value: a missing column is not a
/// column of zeros.
fn check_hitter_runs(box_score: &BoxScore, side: Side, warnings: &mut Vec<String>) {
  let Some(score) = box_score.teams.get(side).score else { return };
  let runs: Vec<u32> = box_score
    .hitters
    .get(side)
    .iter()
    .filter_map(|h| h.stats.runs)
    .collect();
  if runs.is_empty() {
    return;
  }
  let total = runs.iter().fold(0u32, |acc, r| acc.saturating_add(*r));
  if total != score {
    warnings.push(format!("{side} hitter runs ({total}) != team score ({score})"));
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use chrono::NaiveDate;

  use super::*;
  use crate::box_score::{
    BattingStats, Era, PitchingStats, PlayerBattingRow, PlayerPitchingRow, TeamLine,
  };

  fn canonical() -> CanonicalCodes { CanonicalCodes::new(["HH", "LG", "EA", "WE"]) }

  fn hitter(side: Side, runs: Option<u32>) -> PlayerBattingRow {
    PlayerBattingRow {
      player_id:      None,
      player_name:    "타자".to_string(),
      team_code:      None,
      team_side:      side,
      uniform_no:     None,
      batting_order:  Some(1),
      position:       None,
      is_starter:     true,
      appearance_seq: 1,
      stats:          BattingStats {
        runs,
        ..BattingStats::default()
      },
      extras:         BTreeMap::new(),
    }
  }

  fn pitcher(side: Side) -> PlayerPitchingRow {
    PlayerPitchingRow {
      player_id:      None,
      player_name:    "투수".to_string(),
      team_code:      None,
      team_side:      side,
      uniform_no:     None,
      is_starting:    true,
      appearance_seq: 1,
      stats:          PitchingStats::default(),
      extras:         BTreeMap::new(),
    }
  }

  fn team(code: &str, score: u32, line_score: &[u32]) -> TeamLine {
    TeamLine {
      name:           None,
      resolved_code:  Some(code.to_string()),
      franchise_code: Some(code.to_string()),
      score:          Some(score),
      hits:           None,
      errors:         None,
      line_score:     line_score.iter().copied().map(Some).collect(),
    }
  }

  fn complete_box() -> BoxScore {
    let mut b = BoxScore::new(
      "20240323HHLG0",
      NaiveDate::from_ymd_opt(2024, 3, 23),
      Era::Modern,
    );
    b.teams.away = team("HH", 4, &[1, 0, 2, 0, 0, 1, 0, 0, 0]);
    b.teams.home = team("LG", 2, &[0, 0, 0, 2, 0, 0, 0, 0, 0]);
    for side in Side::BOTH {
      b.hitters.get_mut(side).push(hitter(side, None));
      b.pitchers.get_mut(side).push(pitcher(side));
    }
    b
  }

  #[test]
  fn a_complete_box_score_is_valid() {
    let r = validate(&complete_box(), &canonical());
    assert!(r.is_valid, "{r:?}");
    assert!(r.errors.is_empty());
    assert!(r.warnings.is_empty());
  }

  #[test]
  fn line_score_mismatch_warns_once_for_that_side() {
    let mut b = complete_box();
    b.teams.away.score = Some(5);
    let r = validate(&b, &canonical());
    assert!(r.is_valid);
    assert_eq!(r.warnings.len(), 1);
    assert!(r.warnings[0].starts_with("away line score"), "{:?}", r.warnings);
  }

  #[test]
  fn empty_line_score_is_not_checked() {
    let mut b = complete_box();
    b.teams.home.line_score.clear();
    b.teams.home.score = Some(9);
    let r = validate(&b, &canonical());
    assert!(r.warnings.is_empty());
  }

  #[test]
  fn hitter_runs_must_add_up_to_the_score() {
    let mut b = complete_box();
    b.hitters.home = vec![hitter(Side::Home, Some(1)), hitter(Side::Home, Some(0))];
    let r = validate(&b, &canonical());
    assert_eq!(r.warnings, vec!["home hitter runs (1) != team score (2)".to_string()]);

    b.hitters.home.push(hitter(Side::Home, Some(1)));
    assert!(validate(&b, &canonical()).warnings.is_empty());
  }

  #[test]
  fn oversized_run_values_warn_instead_of_overflowing() {
    let mut b = complete_box();
    b.hitters.home = vec![hitter(Side::Home, Some(u32::MAX)), hitter(Side::Home, Some(3))];
    b.teams.home.line_score = vec![Some(u32::MAX), Some(1)];
    let r = validate(&b, &canonical());
    assert!(r.is_valid);
    assert_eq!(r.warnings.len(), 2, "{:?}", r.warnings);
  }

  #[test]
  fn missing_runs_column_is_not_treated_as_zero() {
    let b = complete_box();
    assert!(b.hitters.away.iter().all(|h| h.stats.runs.is_none()));
    assert!(validate(&b, &canonical()).warnings.is_empty());
  }

  #[test]
  fn non_canonical_code_is_a_hard_error() {
    let mut b = complete_box();
    b.teams.away.franchise_code = Some("HT".to_string());
    let r = validate(&b, &canonical());
    assert!(!r.is_valid);
    assert_eq!(r.errors.len(), 1);
    assert!(r.errors[0].starts_with("Invalid away team code: 'HT'"));
  }

  #[test]
  fn unresolved_codes_are_hard_errors() {
    let mut b = complete_box();
    b.teams.home.resolved_code = None;
    b.teams.away.franchise_code = None;
    let r = validate(&b, &canonical());
    assert!(!r.is_valid);
    assert!(r.errors.contains(&"Missing home team code".to_string()));
    assert!(r.errors.iter().any(|e| e.starts_with("Unresolved franchise for away")));
  }

  #[test]
  fn empty_lineups_and_missing_fields_are_all_reported() {
    let mut b = complete_box();
    b.game_id.clear();
    b.game_date = None;
    b.hitters.home.clear();
    b.pitchers.away.clear();
    b.teams.away.score = Some(7);
    let r = validate(&b, &canonical());
    assert!(!r.is_valid);
    assert_eq!(
      r.errors,
      vec![
        "Missing game_id".to_string(),
        "Missing game_date".to_string(),
        "No pitcher rows for away".to_string(),
        "No hitter rows for home".to_string(),
      ]
    );
    assert_eq!(r.warnings.len(), 1);
  }
}
