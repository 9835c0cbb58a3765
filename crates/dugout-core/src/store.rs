//! The `GameSink` trait: where ingestion hands finished games.
//!
//! Implemented by storage backends (e.g. `dugout-store-sqlite`). The
//! orchestrator depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  box_score::BoxScore,
  outcome::{OutcomeRecord, ReviewItem, RunSummary},
  validate::ValidationResult,
};

/// Persistence collaborator of the ingestion pipeline.
///
/// All methods return `Send` futures so a sink can be shared across worker
/// tasks on a multi-threaded runtime.
pub trait GameSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a game that passed validation, together with its warnings.
  /// Called once per accepted game; saving the same game id again replaces
  /// the previous copy.
  fn save_game(
    &self,
    box_score: BoxScore,
    validation: ValidationResult,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Keep a game that failed validation aside for inspection.
  fn quarantine_game(
    &self,
    box_score: BoxScore,
    validation: ValidationResult,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn record_outcome(
    &self,
    outcome: OutcomeRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn flag_for_review(
    &self,
    items: Vec<ReviewItem>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn record_run(
    &self,
    summary: RunSummary,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
