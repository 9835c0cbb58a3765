//! Error types for `dugout-core`.

use thiserror::Error;

use crate::franchise::FranchiseId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("franchise {franchise}: {code} starts in {start} but ends in {end}")]
  InvertedInterval {
    franchise: FranchiseId,
    code:      String,
    start:     i32,
    end:       i32,
  },

  #[error("franchise {franchise}: {first} and {second} overlap in {season}")]
  OverlappingInterval {
    franchise: FranchiseId,
    first:     String,
    second:    String,
    season:    i32,
  },

  #[error("franchise {franchise}: no code covers seasons {from}..={to}")]
  GapInHistory {
    franchise: FranchiseId,
    from:      i32,
    to:        i32,
  },

  #[error("franchise {franchise}: open-ended interval for {code} is not the last one")]
  OpenIntervalNotLast { franchise: FranchiseId, code: String },

  #[error("code {code} belongs to franchises {first} and {second} in {season}")]
  AmbiguousCode {
    code:   String,
    first:  FranchiseId,
    second: FranchiseId,
    season: i32,
  },

  #[error("franchise {0} has no canonical code")]
  MissingCanonicalCode(FranchiseId),

  #[error("franchise {0} has more than one canonical code")]
  DuplicateCanonical(FranchiseId),

  #[error("canonical code {code} is not a code of franchise {franchise}")]
  ForeignCanonicalCode { franchise: FranchiseId, code: String },

  #[error("invalid game id {game_id:?}: {reason}")]
  InvalidGameId { game_id: String, reason: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
