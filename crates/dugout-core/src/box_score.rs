//! The canonical box-score record produced by extraction.
//!
//! Every page layout the source site has used is normalised into [`BoxScore`].
//! Known stat columns land in typed fields; columns nobody recognises are kept
//! verbatim in each row's `extras` map, so nothing printed on the page is
//! silently dropped.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{game_id::GameIdentifier, innings::Outs};

// ─── Sides ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
  Away,
  Home,
}

impl Side {
  pub const BOTH: [Side; 2] = [Side::Away, Side::Home];
}

/// One value per side of a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideMap<T> {
  pub away: T,
  pub home: T,
}

impl<T> SideMap<T> {
  pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
    Self {
      away: f(Side::Away),
      home: f(Side::Home),
    }
  }

  pub fn get(&self, side: Side) -> &T {
    match side {
      Side::Away => &self.away,
      Side::Home => &self.home,
    }
  }

  pub fn get_mut(&mut self, side: Side) -> &mut T {
    match side {
      Side::Away => &mut self.away,
      Side::Home => &mut self.home,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
    Side::BOTH.into_iter().map(move |side| (side, self.get(side)))
  }

  pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> SideMap<U> {
    SideMap {
      away: f(Side::Away, self.away),
      home: f(Side::Home, self.home),
    }
  }
}

// ─── Era ─────────────────────────────────────────────────────────────────────

/// Page-layout family a box score was extracted from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Era {
  /// Id-keyed hitter/pitcher tables and an R/H/E scoreboard.
  Modern,
  /// No scoreboard; hitter names and stats in separate tables.
  Legacy,
  /// One generic results table; player tables found by their headers.
  Transitional,
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// The league's numeric player identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for PlayerId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(PlayerId) }
}

// ─── Stat vocabulary ─────────────────────────────────────────────────────────

/// How a stat column's cells are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
  /// Integer count; thousands separators stripped.
  Count,
  /// Decimal rate (AVG, ERA, OPS, ...).
  Rate,
  /// Innings pitched, stored as outs.
  Innings,
  /// Pitcher decision letter.
  Decision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BattingStat {
  PlateAppearances,
  AtBats,
  Runs,
  Hits,
  Doubles,
  Triples,
  HomeRuns,
  Rbi,
  Walks,
  IntentionalWalks,
  HitByPitch,
  Strikeouts,
  StolenBases,
  CaughtStealing,
  SacrificeHits,
  SacrificeFlies,
  GroundedIntoDoublePlay,
  Average,
  OnBasePct,
  SluggingPct,
  Ops,
  Iso,
  Babip,
}

impl BattingStat {
  pub fn kind(self) -> StatKind {
    use BattingStat::*;
    match self {
      Average | OnBasePct | SluggingPct | Ops | Iso | Babip => StatKind::Rate,
      _ => StatKind::Count,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PitchingStat {
  Innings,
  BattersFaced,
  Pitches,
  AtBatsAgainst,
  HitsAllowed,
  RunsAllowed,
  EarnedRuns,
  HomeRunsAllowed,
  WalksAllowed,
  Strikeouts,
  HitBatters,
  WildPitches,
  Balks,
  Wins,
  Losses,
  Saves,
  Holds,
  Era,
  Whip,
  StrikeoutsPerNine,
  WalksPerNine,
  StrikeoutWalkRatio,
  Decision,
}

impl PitchingStat {
  pub fn kind(self) -> StatKind {
    match self {
      Self::Innings => StatKind::Innings,
      Self::Decision => StatKind::Decision,
      Self::Era
      | Self::Whip
      | Self::StrikeoutsPerNine
      | Self::WalksPerNine
      | Self::StrikeoutWalkRatio => StatKind::Rate,
      _ => StatKind::Count,
    }
  }
}

/// Pitcher of record result.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum Decision {
  W,
  L,
  S,
  H,
}

impl Decision {
  /// Map localized result text to a decision. Unrecognised text is `None`.
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim() {
      "승" | "W" | "w" | "Win" | "WIN" => Some(Self::W),
      "패" | "L" | "l" | "Loss" | "LOSS" => Some(Self::L),
      "세" | "세이브" | "S" | "s" | "SV" | "Save" => Some(Self::S),
      "홀" | "홀드" | "H" | "h" | "HLD" | "Hold" => Some(Self::H),
      _ => None,
    }
  }
}

// ─── Typed stat records ──────────────────────────────────────────────────────

/// Batting line. `None` means the stat was absent or printed as "-", which
/// is not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingStats {
  pub plate_appearances:         Option<u32>,
  pub at_bats:                   Option<u32>,
  pub runs:                      Option<u32>,
  pub hits:                      Option<u32>,
  pub doubles:                   Option<u32>,
  pub triples:                   Option<u32>,
  pub home_runs:                 Option<u32>,
  pub rbi:                       Option<u32>,
  pub walks:                     Option<u32>,
  pub intentional_walks:         Option<u32>,
  pub hit_by_pitch:              Option<u32>,
  pub strikeouts:                Option<u32>,
  pub stolen_bases:              Option<u32>,
  pub caught_stealing:           Option<u32>,
  pub sacrifice_hits:            Option<u32>,
  pub sacrifice_flies:           Option<u32>,
  pub grounded_into_double_play: Option<u32>,
  pub average:                   Option<f64>,
  pub on_base_pct:               Option<f64>,
  pub slugging_pct:              Option<f64>,
  pub ops:                       Option<f64>,
  pub iso:                       Option<f64>,
  pub babip:                     Option<f64>,
}

impl BattingStats {
  /// Slot for a count stat; `None` if `stat` is a rate.
  pub fn count_mut(&mut self, stat: BattingStat) -> Option<&mut Option<u32>> {
    use BattingStat::*;
    Some(match stat {
      PlateAppearances => &mut self.plate_appearances,
      AtBats => &mut self.at_bats,
      Runs => &mut self.runs,
      Hits => &mut self.hits,
      Doubles => &mut self.doubles,
      Triples => &mut self.triples,
      HomeRuns => &mut self.home_runs,
      Rbi => &mut self.rbi,
      Walks => &mut self.walks,
      IntentionalWalks => &mut self.intentional_walks,
      HitByPitch => &mut self.hit_by_pitch,
      Strikeouts => &mut self.strikeouts,
      StolenBases => &mut self.stolen_bases,
      CaughtStealing => &mut self.caught_stealing,
      SacrificeHits => &mut self.sacrifice_hits,
      SacrificeFlies => &mut self.sacrifice_flies,
      GroundedIntoDoublePlay => &mut self.grounded_into_double_play,
      Average | OnBasePct | SluggingPct | Ops | Iso | Babip => return None,
    })
  }

  /// Slot for a rate stat; `None` if `stat` is a count.
  pub fn rate_mut(&mut self, stat: BattingStat) -> Option<&mut Option<f64>> {
    use BattingStat::*;
    Some(match stat {
      Average => &mut self.average,
      OnBasePct => &mut self.on_base_pct,
      SluggingPct => &mut self.slugging_pct,
      Ops => &mut self.ops,
      Iso => &mut self.iso,
      Babip => &mut self.babip,
      _ => return None,
    })
  }
}

/// Pitching line for one appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingStats {
  pub outs:                 Option<Outs>,
  pub batters_faced:        Option<u32>,
  pub pitches:              Option<u32>,
  pub at_bats_against:      Option<u32>,
  pub hits_allowed:         Option<u32>,
  pub runs_allowed:         Option<u32>,
  pub earned_runs:          Option<u32>,
  pub home_runs_allowed:    Option<u32>,
  pub walks_allowed:        Option<u32>,
  pub strikeouts:           Option<u32>,
  pub hit_batters:          Option<u32>,
  pub wild_pitches:         Option<u32>,
  pub balks:                Option<u32>,
  pub wins:                 Option<u32>,
  pub losses:               Option<u32>,
  pub saves:                Option<u32>,
  pub holds:                Option<u32>,
  pub era:                  Option<f64>,
  pub whip:                 Option<f64>,
  pub strikeouts_per_nine:  Option<f64>,
  pub walks_per_nine:       Option<f64>,
  pub strikeout_walk_ratio: Option<f64>,
  pub decision:             Option<Decision>,
}

impl PitchingStats {
  pub fn count_mut(&mut self, stat: PitchingStat) -> Option<&mut Option<u32>> {
    use PitchingStat as P;
    Some(match stat {
      P::BattersFaced => &mut self.batters_faced,
      P::Pitches => &mut self.pitches,
      P::AtBatsAgainst => &mut self.at_bats_against,
      P::HitsAllowed => &mut self.hits_allowed,
      P::RunsAllowed => &mut self.runs_allowed,
      P::EarnedRuns => &mut self.earned_runs,
      P::HomeRunsAllowed => &mut self.home_runs_allowed,
      P::WalksAllowed => &mut self.walks_allowed,
      P::Strikeouts => &mut self.strikeouts,
      P::HitBatters => &mut self.hit_batters,
      P::WildPitches => &mut self.wild_pitches,
      P::Balks => &mut self.balks,
      P::Wins => &mut self.wins,
      P::Losses => &mut self.losses,
      P::Saves => &mut self.saves,
      P::Holds => &mut self.holds,
      _ => return None,
    })
  }

  pub fn rate_mut(&mut self, stat: PitchingStat) -> Option<&mut Option<f64>> {
    use PitchingStat as P;
    Some(match stat {
      P::Era => &mut self.era,
      P::Whip => &mut self.whip,
      P::StrikeoutsPerNine => &mut self.strikeouts_per_nine,
      P::WalksPerNine => &mut self.walks_per_nine,
      P::StrikeoutWalkRatio => &mut self.strikeout_walk_ratio,
      _ => return None,
    })
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBattingRow {
  /// `None` until the page or the roster resolver supplies one.
  pub player_id:      Option<PlayerId>,
  pub player_name:    String,
  pub team_code:      Option<String>,
  pub team_side:      Side,
  pub uniform_no:     Option<String>,
  pub batting_order:  Option<u32>,
  pub position:       Option<String>,
  pub is_starter:     bool,
  /// 1-based order of appearance within the side.
  pub appearance_seq: u32,
  pub stats:          BattingStats,
  /// Unrecognised header → raw cell text.
  pub extras:         BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPitchingRow {
  pub player_id:      Option<PlayerId>,
  pub player_name:    String,
  pub team_code:      Option<String>,
  pub team_side:      Side,
  pub uniform_no:     Option<String>,
  pub is_starting:    bool,
  pub appearance_seq: u32,
  pub stats:          PitchingStats,
  pub extras:         BTreeMap<String, String>,
}

// ─── Game-level records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
  pub stadium:          Option<String>,
  pub attendance:       Option<u32>,
  pub start_time:       Option<String>,
  pub end_time:         Option<String>,
  pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamLine {
  /// Team name as printed on the page.
  pub name:           Option<String>,
  /// Code in use for the franchise in the game's season.
  pub resolved_code:  Option<String>,
  /// Modern canonical code of the franchise.
  pub franchise_code: Option<String>,
  pub score:          Option<u32>,
  pub hits:           Option<u32>,
  pub errors:         Option<u32>,
  /// Runs per inning; `None` for an unplayed half ("X" or "-").
  pub line_score:     Vec<Option<u32>>,
}

impl TeamLine {
  /// Sum of the played halves; saturates instead of overflowing.
  pub fn line_score_total(&self) -> u32 {
    self
      .line_score
      .iter()
      .flatten()
      .fold(0u32, |acc, runs| acc.saturating_add(*runs))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryNote {
  #[serde(rename = "type")]
  pub kind: String,
  pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
  pub game_id:       String,
  pub game_date:     Option<NaiveDate>,
  pub era:           Era,
  pub metadata:      GameMetadata,
  pub teams:         SideMap<TeamLine>,
  pub hitters:       SideMap<Vec<PlayerBattingRow>>,
  pub pitchers:      SideMap<Vec<PlayerPitchingRow>>,
  pub summary_notes: Vec<SummaryNote>,
}

impl BoxScore {
  /// An empty record for `game_id`, to be filled by an extractor.
  pub fn new(game_id: impl Into<String>, game_date: Option<NaiveDate>, era: Era) -> Self {
    Self {
      game_id: game_id.into(),
      game_date,
      era,
      metadata: GameMetadata::default(),
      teams: SideMap::default(),
      hitters: SideMap::default(),
      pitchers: SideMap::default(),
      summary_notes: Vec::new(),
    }
  }

  /// Season of the game, from the date or else from the game id.
  pub fn season_year(&self) -> Option<i32> {
    self
      .game_date
      .map(|d| d.year())
      .or_else(|| GameIdentifier::decode(&self.game_id).ok().map(|id| id.season_year))
  }

  /// Rows still lacking a player id, as `(side, name)` pairs.
  pub fn unidentified_players(&self) -> impl Iterator<Item = (Side, &str)> {
    let hitters = Side::BOTH.into_iter().flat_map(move |side| {
      self
        .hitters
        .get(side)
        .iter()
        .filter(|r| r.player_id.is_none())
        .map(move |r| (side, r.player_name.as_str()))
    });
    let pitchers = Side::BOTH.into_iter().flat_map(move |side| {
      self
        .pitchers
        .get(side)
        .iter()
        .filter(|r| r.player_id.is_none())
        .map(move |r| (side, r.player_name.as_str()))
    });
    hitters.chain(pitchers)
  }
}
