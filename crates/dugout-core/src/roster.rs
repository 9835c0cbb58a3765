//! Player identity fallback for rows that carry no player id.
//!
//! Legacy pages print names only. The game's own lineup page is consulted
//! first; failing that, candidates are looked up by
//! `(name, team_code, season)` in an external roster. A single candidate is
//! accepted, anything else is left `None` and reported for review. Among
//! same-named players only an exact uniform-number match may pick one.

use std::{collections::HashMap, future::Future};

use serde::{Deserialize, Serialize};

use crate::{
  box_score::{BoxScore, PlayerId, Side},
  outcome::{ReviewItem, ReviewKind},
};

// ─── Collaborator ────────────────────────────────────────────────────────────

/// Key of a roster lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterQuery {
  pub name:        String,
  pub team_code:   String,
  pub season_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCandidate {
  pub player_id:  PlayerId,
  pub uniform_no: Option<String>,
}

/// Read-only roster source, e.g. a table of season rosters.
pub trait RosterLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All roster entries matching the query. Order carries no meaning.
  fn lookup(
    &self,
    query: RosterQuery,
  ) -> impl Future<Output = Result<Vec<RosterCandidate>, Self::Error>> + Send + '_;
}

// ── Lineup page ──

/// Players linked from a game's lineup page, keyed by printed name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineupRoster {
  players: HashMap<String, Vec<RosterCandidate>>,
}

impl LineupRoster {
  /// Record a linked player. The same id under one name is kept once.
  pub fn insert(&mut self, name: &str, candidate: RosterCandidate) {
    let name = name.trim();
    if name.is_empty() {
      return;
    }
    let entries = self.players.entry(name.to_string()).or_default();
    if !entries.iter().any(|c| c.player_id == candidate.player_id) {
      entries.push(candidate);
    }
  }

  pub fn candidates(&self, name: &str) -> &[RosterCandidate] {
    self.players.get(name.trim()).map(Vec::as_slice).unwrap_or_default()
  }

  /// Number of distinct names.
  pub fn len(&self) -> usize { self.players.len() }

  pub fn is_empty(&self) -> bool { self.players.is_empty() }
}

// ─── Matching ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerMatch {
  Unique(PlayerId),
  Ambiguous(Vec<PlayerId>),
  Missing,
}

impl PlayerMatch {
  pub fn player_id(&self) -> Option<PlayerId> {
    match self {
      Self::Unique(id) => Some(*id),
      Self::Ambiguous(_) | Self::Missing => None,
    }
  }

  /// Decide among roster candidates. Duplicate ids count once.
  pub fn from_candidates(candidates: &[RosterCandidate], uniform_no: Option<&str>) -> Self {
    let mut distinct: Vec<&RosterCandidate> = Vec::new();
    for c in candidates {
      if !distinct.iter().any(|d| d.player_id == c.player_id) {
        distinct.push(c);
      }
    }

    match distinct.as_slice() {
      [] => Self::Missing,
      [only] => Self::Unique(only.player_id),
      many => {
        if let Some(uniform) = uniform_no.map(str::trim).filter(|u| !u.is_empty()) {
          let matching: Vec<_> = many
            .iter()
            .filter(|c| c.uniform_no.as_deref().map(str::trim) == Some(uniform))
            .collect();
          if let [one] = matching.as_slice() {
            return Self::Unique(one.player_id);
          }
        }
        let mut ids: Vec<PlayerId> = many.iter().map(|c| c.player_id).collect();
        ids.sort();
        Self::Ambiguous(ids)
      }
    }
  }
}

/// Look up one player and decide. Returns `None` for zero or several
/// candidates.
pub async fn resolve<R: RosterLookup>(
  roster: &R,
  player_name: &str,
  team_code: &str,
  season_year: i32,
) -> Result<Option<PlayerId>, R::Error> {
  let candidates = roster
    .lookup(RosterQuery {
      name: player_name.trim().to_string(),
      team_code: team_code.to_string(),
      season_year,
    })
    .await?;
  Ok(PlayerMatch::from_candidates(&candidates, None).player_id())
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Fills missing player ids on a box score from a roster.
pub struct PlayerIdentityResolver<R> {
  roster:  R,
  /// Former name → current roster name.
  aliases: HashMap<String, String>,
}

struct Pending {
  side:       Side,
  pitcher:    bool,
  index:      usize,
  name:       String,
  team_code:  String,
  uniform_no: Option<String>,
}

impl<R: RosterLookup> PlayerIdentityResolver<R> {
  pub fn new(roster: R) -> Self {
    Self {
      roster,
      aliases: HashMap::new(),
    }
  }

  pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = (String, String)>) -> Self {
    self.aliases.extend(aliases);
    self
  }

  pub fn roster(&self) -> &R { &self.roster }

  /// Resolve a single row.
  pub async fn resolve(
    &self,
    player_name: &str,
    team_code: &str,
    season_year: i32,
    uniform_no: Option<&str>,
  ) -> Result<PlayerMatch, R::Error> {
    let name = player_name.trim();
    let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
    let candidates = self
      .roster
      .lookup(RosterQuery {
        name: name.to_string(),
        team_code: team_code.to_string(),
        season_year,
      })
      .await?;
    Ok(PlayerMatch::from_candidates(&candidates, uniform_no))
  }

  /// Fill every missing player id in `box_score` that the lineup page or
  /// the roster identifies uniquely and return review items for the rest.
  ///
  /// A unique lineup match wins outright and also supplies a missing uniform
  /// number. Rows without a team code or season are left alone; the
  /// unresolved team is reported elsewhere.
  pub async fn resolve_box_score(
    &self,
    box_score: &mut BoxScore,
    lineup: &LineupRoster,
  ) -> Result<Vec<ReviewItem>, R::Error> {
    let Some(season) = box_score.season_year() else {
      return Ok(Vec::new());
    };

    let mut review = Vec::new();
    for row in pending_rows(box_score) {
      let on_lineup = lineup.candidates(&row.name);
      if let PlayerMatch::Unique(id) =
        PlayerMatch::from_candidates(on_lineup, row.uniform_no.as_deref())
      {
        let uniform = on_lineup
          .iter()
          .find(|c| c.player_id == id)
          .and_then(|c| c.uniform_no.clone());
        fill(box_score, &row, id, uniform);
        continue;
      }

      let found = self
        .resolve(&row.name, &row.team_code, season, row.uniform_no.as_deref())
        .await?;

      let kind = match found {
        PlayerMatch::Unique(id) => {
          fill(box_score, &row, id, None);
          continue;
        }
        PlayerMatch::Ambiguous(candidates) => ReviewKind::AmbiguousPlayer { candidates },
        PlayerMatch::Missing => ReviewKind::UnknownPlayer,
      };
      review.push(ReviewItem {
        game_id: box_score.game_id.clone(),
        side: row.side,
        subject: row.name,
        team_code: Some(row.team_code),
        season: Some(season),
        kind,
      });
    }
    Ok(review)
  }
}

/// Set the id of a pending row, and its uniform number when it had none.
fn fill(box_score: &mut BoxScore, row: &Pending, id: PlayerId, uniform: Option<String>) {
  if row.pitcher {
    let r = &mut box_score.pitchers.get_mut(row.side)[row.index];
    r.player_id = Some(id);
    if r.uniform_no.is_none() {
      r.uniform_no = uniform;
    }
  } else {
    let r = &mut box_score.hitters.get_mut(row.side)[row.index];
    r.player_id = Some(id);
    if r.uniform_no.is_none() {
      r.uniform_no = uniform;
    }
  }
}

fn pending_rows(box_score: &BoxScore) -> Vec<Pending> {
  let mut pending = Vec::new();
  for side in Side::BOTH {
    let hitters = box_score.hitters.get(side).iter().map(|r| {
      (false, r.player_id, &r.player_name, &r.team_code, &r.uniform_no)
    });
    let pitchers = box_score.pitchers.get(side).iter().map(|r| {
      (true, r.player_id, &r.player_name, &r.team_code, &r.uniform_no)
    });
    let mut counters = [0usize; 2];
    for (pitcher, id, name, team, uniform) in hitters.chain(pitchers) {
      let index = counters[usize::from(pitcher)];
      counters[usize::from(pitcher)] += 1;
      if id.is_some() || name.trim().is_empty() {
        continue;
      }
      let Some(team_code) = team.clone() else { continue };
      pending.push(Pending {
        side,
        pitcher,
        index,
        name: name.trim().to_string(),
        team_code,
        uniform_no: uniform.clone(),
      });
    }
  }
  pending
}
