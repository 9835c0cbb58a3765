//! Runtime configuration, layered from an optional TOML file and `DUGOUT_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use dugout_core::{FranchiseHistory, franchise::ReferenceData};
use serde::Deserialize;

use crate::Result;

/// No configuration can bring the per-host delay below this.
pub const THROTTLE_FLOOR_MS: u64 = 1_000;

const MAX_WORKERS: usize = 8;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  #[serde(default = "default_base_url")]
  pub base_url:           String,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_workers")]
  pub workers:            usize,
  #[serde(default = "default_fetch_timeout")]
  pub fetch_timeout_secs: u64,
  #[serde(default = "default_user_agent")]
  pub user_agent:         String,
  #[serde(default)]
  pub throttle:           ThrottleConfig,
  #[serde(default)]
  pub retry:              RetryConfig,
  /// Fetch each game's lineup page for player ids before the roster.
  #[serde(default = "default_fetch_lineup")]
  pub fetch_lineup:       bool,
  /// Replaces the built-in franchise reference data when set.
  #[serde(default)]
  pub reference_data:     Option<PathBuf>,
  /// Former player names mapped to the name the roster uses now.
  #[serde(default)]
  pub player_aliases:     Vec<PlayerAlias>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
  pub min_delay_ms: u64,
  pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
  pub max_attempts:       u32,
  pub initial_backoff_ms: u64,
  pub backoff_factor:     f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerAlias {
  pub old_name: String,
  pub new_name: String,
}

fn default_base_url() -> String {
  "https://www.koreabaseball.com/Schedule/GameCenter/Main.aspx".to_string()
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/dugout/dugout.db") }

fn default_workers() -> usize { 3 }

fn default_fetch_timeout() -> u64 { 30 }

fn default_fetch_lineup() -> bool { true }

fn default_user_agent() -> String {
  concat!("dugout/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ThrottleConfig {
  fn default() -> Self {
    Self {
      min_delay_ms: 1_500,
      max_delay_ms: 2_500,
    }
  }
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_attempts:       3,
      initial_backoff_ms: 1_500,
      backoff_factor:     2.0,
    }
  }
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      base_url:           default_base_url(),
      store_path:         default_store_path(),
      workers:            default_workers(),
      fetch_timeout_secs: default_fetch_timeout(),
      user_agent:         default_user_agent(),
      throttle:           ThrottleConfig::default(),
      retry:              RetryConfig::default(),
      fetch_lineup:       default_fetch_lineup(),
      reference_data:     None,
      player_aliases:     Vec::new(),
    }
  }
}

impl IngestConfig {
  /// Read `path` (missing file allowed) and overlay `DUGOUT_*` variables,
  /// e.g. `DUGOUT_THROTTLE__MIN_DELAY_MS=2000`.
  pub fn load(path: &Path) -> Result<Self> {
    Self::layered(config::File::from(path).required(false), None)
  }

  /// `file` overlaid with the environment; `env` stands in for the process
  /// environment when set.
  fn layered<S>(file: S, env: Option<config::Map<String, String>>) -> Result<Self>
  where
    S: config::Source + Send + Sync + 'static,
  {
    let settings = config::Config::builder()
      .add_source(file)
      .add_source(
        config::Environment::with_prefix("DUGOUT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true)
          .source(env),
      )
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  /// Worker count clamped to `1..=8`.
  pub fn worker_count(&self) -> usize { self.workers.clamp(1, MAX_WORKERS) }

  pub fn fetch_timeout(&self) -> Duration { Duration::from_secs(self.fetch_timeout_secs.max(1)) }

  /// The configured reference data, or the built-in tables.
  pub fn reference_data(&self) -> Result<ReferenceData> {
    match &self.reference_data {
      Some(path) => load_reference_data(path),
      None => Ok(ReferenceData::builtin()),
    }
  }

  /// The franchise history, validated. Invariant violations in the reference
  /// data are reported here, before any game is touched.
  pub fn history(&self) -> Result<FranchiseHistory> {
    Ok(FranchiseHistory::load(self.reference_data()?)?)
  }

  /// `store_path` with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn aliases(&self) -> impl Iterator<Item = (String, String)> + '_ {
    self
      .player_aliases
      .iter()
      .map(|a| (a.old_name.clone(), a.new_name.clone()))
  }
}

/// Load a reference-data file; the format follows its extension.
pub fn load_reference_data(path: &Path) -> Result<ReferenceData> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path))
    .build()?;
  Ok(settings.try_deserialize()?)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

impl ThrottleConfig {
  /// `(min, max)` delay with an inverted pair swapped and both bounds lifted
  /// to [`THROTTLE_FLOOR_MS`].
  pub fn bounds(&self) -> (Duration, Duration) {
    let (lo, hi) = if self.min_delay_ms > self.max_delay_ms {
      (self.max_delay_ms, self.min_delay_ms)
    } else {
      (self.min_delay_ms, self.max_delay_ms)
    };
    (
      Duration::from_millis(lo.max(THROTTLE_FLOOR_MS)),
      Duration::from_millis(hi.max(THROTTLE_FLOOR_MS)),
    )
  }
}

impl RetryConfig {
  pub fn max_attempts(&self) -> u32 { self.max_attempts.max(1) }

  /// Delay before retrying after failed attempt number `attempt` (1-based).
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = self.backoff_factor.max(1.0);
    let exp = attempt.saturating_sub(1).min(16) as i32;
    Duration::from_millis((self.initial_backoff_ms as f64 * factor.powi(exp)) as u64)
  }
}
