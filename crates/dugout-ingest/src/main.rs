//! `dugout`: KBO box-score ingestion.
//!
//! Reads `dugout.toml` (or the path given with `--config`) layered with
//! `DUGOUT_*` environment variables.
//!
//! # Usage
//!
//! ```
//! dugout ingest 20240323HHLG0 20240323SSKT0
//! dugout ingest --from-file games.txt
//! dugout decode 20240323HHLG0
//! dugout resolve 한화 2024
//! dugout extract page.html --game-id 20240323HHLG0 --date 20240323
//! dugout roster-import roster.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dugout_core::{FranchiseHistory, GameIdentifier, roster::PlayerIdentityResolver, validate};
use dugout_ingest::{
  IngestConfig, Orchestrator, RunSettings, fetch::HttpSessionFactory, throttle::HostThrottle,
};
use dugout_store_sqlite::RosterEntry;
use serde_json::json;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "dugout", author, version, about = "KBO box-score ingestion")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "dugout.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch, extract, validate and store games.
  Ingest {
    game_ids: Vec<String>,

    /// Read further game ids from a file, one per line (`#` starts a comment).
    #[arg(long, value_name = "FILE")]
    from_file: Option<PathBuf>,
  },

  /// Print a decoded game id and its resolved teams.
  Decode { game_id: String },

  /// Resolve a team name or code for a season.
  Resolve { token: String, year: i32 },

  /// Extract and validate a saved review page, printing JSON.
  Extract {
    html_file: PathBuf,

    #[arg(long)]
    game_id: String,

    /// Game date as `YYYYMMDD`; defaults to the date in the game id.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },

  /// Load roster entries from a JSON array into the store.
  RosterImport { file: PathBuf },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|e| e.to_string())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = IngestConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Broken reference data is a configuration error; stop before any work.
  let history = config
    .history()
    .context("invalid franchise reference data")?;

  match cli.command {
    Command::Ingest {
      game_ids,
      from_file,
    } => ingest(&config, history, game_ids, from_file).await,
    Command::Decode { game_id } => decode(&config, &history, &game_id),
    Command::Resolve { token, year } => resolve(&history, &token, year),
    Command::Extract {
      html_file,
      game_id,
      date,
    } => extract(&history, &html_file, &game_id, date),
    Command::RosterImport { file } => roster_import(&config, &file).await,
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn ingest(
  config: &IngestConfig,
  history: FranchiseHistory,
  mut game_ids: Vec<String>,
  from_file: Option<PathBuf>,
) -> anyhow::Result<()> {
  if let Some(path) = from_file {
    let raw = std::fs::read_to_string(&path)
      .with_context(|| format!("reading game ids from {}", path.display()))?;
    game_ids.extend(
      raw
        .lines()
        .map(|l| l.split('#').next().unwrap_or_default().trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string),
    );
  }
  if game_ids.is_empty() {
    bail!("no game ids given");
  }

  let store = dugout_ingest::open_store(config)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.store_path()))?;

  let resolver = PlayerIdentityResolver::new(store.clone()).with_aliases(config.aliases());
  let orchestrator = Orchestrator::new(
    HttpSessionFactory::new(config.user_agent.as_str(), config.fetch_timeout()),
    HostThrottle::new(&config.throttle),
    store,
    resolver,
    Arc::new(history),
    RunSettings::from_config(config),
  );

  let report = orchestrator.run(game_ids).await;
  for r in &report.results {
    println!(
      "{}\t{}\t{}\t{}",
      r.game_id,
      r.outcome.status(),
      r.attempts,
      r.outcome.messages().join("; ")
    );
  }
  let s = &report.summary;
  println!(
    "run {}: {} games, {} accepted, {} quarantined, {} no data, {} failed (transient), {} failed",
    s.run_id, s.total, s.accepted, s.quarantined, s.no_data, s.failed_transient, s.failed
  );
  Ok(())
}

fn decode(config: &IngestConfig, history: &FranchiseHistory, game_id: &str) -> anyhow::Result<()> {
  let ident = GameIdentifier::decode(game_id)?;
  let teams = ident.resolve_teams(history);
  let out = json!({
    "game_id":      ident.game_id,
    "game_date":    ident.game_date,
    "season_year":  ident.season_year,
    "away_segment": ident.away_segment,
    "home_segment": ident.home_segment,
    "seq":          ident.seq,
    "away_team":    teams.away,
    "home_team":    teams.home,
    "review_url":   ident.review_url(&config.base_url),
  });
  println!("{}", serde_json::to_string_pretty(&out)?);
  Ok(())
}

fn resolve(history: &FranchiseHistory, token: &str, year: i32) -> anyhow::Result<()> {
  let Some(code) = history.resolve_team(token, year) else {
    bail!("{token:?} does not resolve to a team in {year}");
  };
  let franchise = history.franchise_code(code, year).unwrap_or(code);
  println!("{code}\t{franchise}");
  Ok(())
}

fn extract(
  history: &FranchiseHistory,
  html_file: &Path,
  game_id: &str,
  date: Option<NaiveDate>,
) -> anyhow::Result<()> {
  let html = std::fs::read_to_string(html_file)
    .with_context(|| format!("reading {}", html_file.display()))?;
  let box_score = dugout_extract::try_extract(&html, game_id, date, history)
    .with_context(|| format!("no box score extracted from {}", html_file.display()))?;
  let validation = validate(&box_score, history.canonical_codes());
  let out = json!({ "box_score": box_score, "validation": validation });
  println!("{}", serde_json::to_string_pretty(&out)?);
  Ok(())
}

async fn roster_import(config: &IngestConfig, file: &Path) -> anyhow::Result<()> {
  let raw =
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
  let entries: Vec<RosterEntry> =
    serde_json::from_str(&raw).context("roster file must be a JSON array of entries")?;

  let store = dugout_ingest::open_store(config)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.store_path()))?;
  let count = entries.len();
  for entry in entries {
    store
      .add_roster_entry(entry)
      .await
      .context("failed to store roster entry")?;
  }
  info!(count, "roster entries imported");
  Ok(())
}
