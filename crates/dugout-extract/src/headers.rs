//! Header dictionaries: printed column header → what the column holds.
//!
//! Header vocabularies drift between seasons. Anything not listed here is
//! carried into a row's `extras` untouched.

use dugout_core::box_score::{BattingStat, PitchingStat};

use crate::numeric::clean_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattingColumn {
  Stat(BattingStat),
  Order,
  Position,
  Name,
  Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchingColumn {
  Stat(PitchingStat),
  Name,
  Uniform,
}

fn key(header: &str) -> String { clean_text(header).to_uppercase() }

fn structural(key: &str) -> Option<Structural> {
  Some(match key {
    "선수명" | "선수" | "이름" | "NAME" | "PLAYER" => Structural::Name,
    "등번호" | "배번" | "UNIFORM" => Structural::Uniform,
    _ => return None,
  })
}

enum Structural {
  Name,
  Uniform,
}

pub fn batting_column(header: &str) -> Option<BattingColumn> {
  use BattingStat as B;
  let key = key(header);
  if let Some(s) = structural(&key) {
    return Some(match s {
      Structural::Name => BattingColumn::Name,
      Structural::Uniform => BattingColumn::Uniform,
    });
  }
  let stat = match key.as_str() {
    "타순" | "타순(교체)" | "순" | "NO" | "NO." => return Some(BattingColumn::Order),
    "POS" | "포지션" | "수비위치" | "위치" => return Some(BattingColumn::Position),
    "타석" | "PA" => B::PlateAppearances,
    "타수" | "AB" => B::AtBats,
    "득점" | "R" => B::Runs,
    "안타" | "H" => B::Hits,
    "2루타" | "2B" => B::Doubles,
    "3루타" | "3B" => B::Triples,
    "홈런" | "HR" => B::HomeRuns,
    "타점" | "RBI" => B::Rbi,
    "볼넷" | "BB" => B::Walks,
    "고의4구" | "IBB" => B::IntentionalWalks,
    "사구" | "HBP" => B::HitByPitch,
    "삼진" | "SO" => B::Strikeouts,
    "도루" | "SB" => B::StolenBases,
    "도실" | "CS" => B::CaughtStealing,
    "희타" | "SAC" => B::SacrificeHits,
    "희비" | "SF" => B::SacrificeFlies,
    "병살" | "GDP" => B::GroundedIntoDoublePlay,
    "타율" | "AVG" => B::Average,
    "출루율" | "OBP" => B::OnBasePct,
    "장타율" | "SLG" => B::SluggingPct,
    "OPS" => B::Ops,
    "ISO" => B::Iso,
    "BABIP" => B::Babip,
    _ => return None,
  };
  Some(BattingColumn::Stat(stat))
}

pub fn pitching_column(header: &str) -> Option<PitchingColumn> {
  use PitchingStat as P;
  let key = key(header);
  if let Some(s) = structural(&key) {
    return Some(match s {
      Structural::Name => PitchingColumn::Name,
      Structural::Uniform => PitchingColumn::Uniform,
    });
  }
  let stat = match key.as_str() {
    "이닝" | "IP" => P::Innings,
    "타자" | "TBF" => P::BattersFaced,
    "투구수" | "NP" => P::Pitches,
    "타수" | "AB" => P::AtBatsAgainst,
    "피안타" | "H" => P::HitsAllowed,
    "실점" | "R" => P::RunsAllowed,
    "자책" | "ER" => P::EarnedRuns,
    "피홈런" | "HR" => P::HomeRunsAllowed,
    "볼넷" | "4사구" | "BB" => P::WalksAllowed,
    "삼진" | "SO" => P::Strikeouts,
    "사구" | "HBP" => P::HitBatters,
    "폭투" | "WP" => P::WildPitches,
    "보크" | "BK" => P::Balks,
    "승" | "W" => P::Wins,
    "패" | "L" => P::Losses,
    "세" | "SV" => P::Saves,
    "홀드" | "HLD" => P::Holds,
    "평균자책점" | "ERA" => P::Era,
    "WHIP" => P::Whip,
    "K/9" => P::StrikeoutsPerNine,
    "BB/9" => P::WalksPerNine,
    "K/BB" => P::StrikeoutWalkRatio,
    "결과" | "결" => P::Decision,
    _ => return None,
  };
  Some(PitchingColumn::Stat(stat))
}

/// A table of hitters: at-bats plus a name column, and no innings pitched
/// (pitcher tables print at-bats against).
pub fn is_hitter_header_set(headers: &[String]) -> bool {
  let has = |pred: fn(&str) -> bool| headers.iter().any(|h| pred(h));
  has(|h| matches!(batting_column(h), Some(BattingColumn::Stat(BattingStat::AtBats))))
    && has(|h| matches!(batting_column(h), Some(BattingColumn::Name)))
    && !has(|h| matches!(pitching_column(h), Some(PitchingColumn::Stat(PitchingStat::Innings))))
}

/// A table of pitchers: innings pitched plus strikeouts.
pub fn is_pitcher_header_set(headers: &[String]) -> bool {
  let has = |pred: fn(&str) -> bool| headers.iter().any(|h| pred(h));
  has(|h| matches!(pitching_column(h), Some(PitchingColumn::Stat(PitchingStat::Innings))))
    && has(|h| matches!(pitching_column(h), Some(PitchingColumn::Stat(PitchingStat::Strikeouts))))
}
