//! Core types and trait definitions for the Dugout box-score engine.
//!
//! This crate is deliberately free of HTTP, HTML and database dependencies.
//! It holds the franchise history and team resolver, the game-id codec, the
//! canonical [`BoxScore`](box_score::BoxScore) model, the score-conservation
//! validator and the player identity resolver. Every other crate depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod box_score;
pub mod error;
pub mod franchise;
pub mod game_id;
pub mod innings;
pub mod outcome;
pub mod roster;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use franchise::FranchiseHistory;
pub use game_id::{GameIdentifier, decode_game_id};
pub use validate::{ValidationResult, validate};
