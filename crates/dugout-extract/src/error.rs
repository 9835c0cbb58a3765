//! Error types for the box-score extractor.

use dugout_core::box_score::Side;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The page matches none of the known layouts; usually a game that was
  /// never played.
  #[error("no known page layout found")]
  NoEraSignature,

  #[error("{side} hitter tables disagree: {names} name rows, {stats} stat rows")]
  RowMismatch { side: Side, names: usize, stats: usize },

  #[error("required table missing: {0}")]
  MissingTable(String),

  #[error("invalid selector {0}")]
  InvalidSelector(String),

  #[error(transparent)]
  GameId(#[from] dugout_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
