//! SQLite backend for Dugout.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteStore`] is both the
//! persistence sink of the ingestion pipeline and the roster used to resolve
//! players that pages print without an id.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RosterEntry, SqliteStore, StoredGame};

#[cfg(test)]
mod tests;
