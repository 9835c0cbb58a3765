//! Ingestion service for Dugout.
//!
//! Wires the extractor, the player resolver, the validator and a
//! [`GameSink`](dugout_core::store::GameSink) into a bounded worker pool that
//! fetches review pages through pooled sessions under a per-host throttle.

pub mod config;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod pool;
pub mod throttle;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use orchestrator::{BatchReport, GameOutcome, GameResult, Orchestrator, RunSettings};

use dugout_store_sqlite::SqliteStore;

/// Open (creating if needed) the SQLite store named by `config`.
pub async fn open_store(config: &IngestConfig) -> Result<SqliteStore> {
  let path = config.store_path();
  if let Some(dir) = path.parent()
    && !dir.as_os_str().is_empty()
  {
    std::fs::create_dir_all(dir).map_err(|e| Error::Store(Box::new(e)))?;
  }
  SqliteStore::open(&path)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}
