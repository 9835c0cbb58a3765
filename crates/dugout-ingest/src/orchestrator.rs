//! The ingestion run: a bounded worker pool draining a queue of game ids.
//!
//! Each game goes through fetch, extraction, player resolution, validation
//! and the sink in that order. Games finish out of order, and a failure in
//! one game never touches another. Retryable fetch failures go back on the
//! queue after an exponential backoff.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use dugout_core::{
  FranchiseHistory, GameIdentifier,
  box_score::{BoxScore, Side},
  outcome::{GameStatus, OutcomeRecord, ReviewItem, ReviewKind, RunSummary},
  roster::{LineupRoster, PlayerIdentityResolver, RosterLookup},
  store::GameSink,
  validate,
};
use tokio::{
  sync::{Mutex, mpsc},
  task::JoinSet,
  time::{sleep, timeout},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  config::{IngestConfig, RetryConfig},
  fetch::{FetchError, SessionFactory, host_of},
  pool::SessionPool,
  throttle::HostThrottle,
};

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RunSettings {
  pub base_url:      String,
  pub workers:       usize,
  pub fetch_timeout: Duration,
  pub retry:         RetryConfig,
  pub fetch_lineup:  bool,
}

impl RunSettings {
  pub fn from_config(config: &IngestConfig) -> Self {
    Self {
      base_url:      config.base_url.clone(),
      workers:       config.worker_count(),
      fetch_timeout: config.fetch_timeout(),
      retry:         config.retry.clone(),
      fetch_lineup:  config.fetch_lineup,
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum GameOutcome {
  Accepted { warnings: Vec<String> },
  Quarantined { errors: Vec<String> },
  NoData,
  FailedTransient { attempts: u32, error: String },
  Failed { error: String },
}

impl GameOutcome {
  pub fn status(&self) -> GameStatus {
    match self {
      Self::Accepted { .. } => GameStatus::Accepted,
      Self::Quarantined { .. } => GameStatus::Quarantined,
      Self::NoData => GameStatus::NoData,
      Self::FailedTransient { .. } => GameStatus::FailedTransient,
      Self::Failed { .. } => GameStatus::Failed,
    }
  }

  pub fn messages(&self) -> Vec<String> {
    match self {
      Self::Accepted { warnings } => warnings.clone(),
      Self::Quarantined { errors } => errors.clone(),
      Self::NoData => Vec::new(),
      Self::FailedTransient { error, .. } | Self::Failed { error } => vec![error.clone()],
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
  pub game_id:  String,
  /// Fetch attempts made; zero when the game id never decoded.
  pub attempts: u32,
  pub outcome:  GameOutcome,
}

/// Everything one [`Orchestrator::run`] produced, sorted by game id.
#[derive(Debug, Clone)]
pub struct BatchReport {
  pub summary: RunSummary,
  pub results: Vec<GameResult>,
}

impl BatchReport {
  pub fn run_id(&self) -> Uuid { self.summary.run_id }

  pub fn get(&self, game_id: &str) -> Option<&GameResult> {
    self.results.iter().find(|r| r.game_id == game_id)
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

struct Job {
  ident:   GameIdentifier,
  attempt: u32,
}

enum Attempt {
  Done(GameOutcome),
  Retry(FetchError),
}

struct Inner<F: SessionFactory, S, R> {
  pool:     SessionPool<F>,
  throttle: HostThrottle,
  sink:     S,
  resolver: PlayerIdentityResolver<R>,
  history:  Arc<FranchiseHistory>,
  settings: RunSettings,
}

pub struct Orchestrator<F: SessionFactory, S, R> {
  inner: Arc<Inner<F, S, R>>,
}

impl<F, S, R> Orchestrator<F, S, R>
where
  F: SessionFactory + 'static,
  S: GameSink + 'static,
  R: RosterLookup + 'static,
{
  pub fn new(
    factory: F,
    throttle: HostThrottle,
    sink: S,
    resolver: PlayerIdentityResolver<R>,
    history: Arc<FranchiseHistory>,
    settings: RunSettings,
  ) -> Self {
    let pool = SessionPool::new(factory, settings.workers);
    Self {
      inner: Arc::new(Inner {
        pool,
        throttle,
        sink,
        resolver,
        history,
        settings,
      }),
    }
  }

  /// Ingest `games` and return once every game reached a terminal outcome.
  ///
  /// Duplicate ids are processed once. Ids that do not decode fail without a
  /// fetch.
  pub async fn run(&self, games: impl IntoIterator<Item = String>) -> BatchReport {
    let run_id = Uuid::new_v4();
    let mut summary = RunSummary::new(run_id, Utc::now());
    let mut results = Vec::new();

    let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<GameResult>();

    let mut seen = HashSet::new();
    let mut pending = 0usize;
    for game_id in games {
      let game_id = game_id.trim().to_string();
      if game_id.is_empty() || !seen.insert(game_id.clone()) {
        continue;
      }
      match GameIdentifier::decode(&game_id) {
        Ok(ident) => {
          if job_tx.send(Job { ident, attempt: 1 }).is_ok() {
            pending += 1;
          }
        }
        Err(e) => {
          warn!(%game_id, error = %e, "skipping undecodable game id");
          let result = GameResult {
            game_id,
            attempts: 0,
            outcome: GameOutcome::Failed {
              error: e.to_string(),
            },
          };
          self.inner.record(run_id, &result).await;
          summary.count(result.outcome.status());
          results.push(result);
        }
      }
    }

    info!(%run_id, games = pending, workers = self.inner.settings.workers, "ingestion run started");

    let job_rx = Arc::new(Mutex::new(job_rx));
    let mut workers = JoinSet::new();
    for worker in 0..self.inner.settings.workers.min(pending) {
      let inner = self.inner.clone();
      let job_rx = job_rx.clone();
      let job_tx = job_tx.clone();
      let done_tx = done_tx.clone();
      workers.spawn(async move {
        inner.work(worker, run_id, job_rx, job_tx, done_tx).await;
      });
    }
    drop(done_tx);

    while pending > 0 {
      let Some(result) = done_rx.recv().await else {
        warn!(%run_id, pending, "workers stopped before the queue drained");
        break;
      };
      pending -= 1;
      summary.count(result.outcome.status());
      results.push(result);
    }
    drop(job_tx);
    workers.shutdown().await;

    summary.finished_at = Utc::now();
    if let Err(e) = self.inner.sink.record_run(summary.clone()).await {
      warn!(%run_id, error = %e, "failed to record run summary");
    }
    info!(
      %run_id,
      total = summary.total,
      accepted = summary.accepted,
      quarantined = summary.quarantined,
      no_data = summary.no_data,
      failed_transient = summary.failed_transient,
      failed = summary.failed,
      "ingestion run finished"
    );

    results.sort_by(|a, b| a.game_id.cmp(&b.game_id));
    BatchReport { summary, results }
  }
}

impl<F, S, R> Inner<F, S, R>
where
  F: SessionFactory + 'static,
  S: GameSink + 'static,
  R: RosterLookup + 'static,
{
  // ── Worker loop ──

  async fn work(
    &self,
    worker: usize,
    run_id: Uuid,
    jobs: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    requeue: mpsc::UnboundedSender<Job>,
    done: mpsc::UnboundedSender<GameResult>,
  ) {
    loop {
      let next = jobs.lock().await.recv().await;
      let Some(job) = next else { break };
      let game_id = job.ident.game_id.clone();
      debug!(worker, %game_id, attempt = job.attempt, "processing");

      let outcome = match self.attempt(&job.ident).await {
        Attempt::Done(outcome) => outcome,
        Attempt::Retry(error) if job.attempt < self.settings.retry.max_attempts() => {
          let delay = self.settings.retry.backoff(job.attempt);
          warn!(
            %game_id,
            attempt = job.attempt,
            error = %error,
            backoff_ms = delay.as_millis() as u64,
            "fetch failed, retrying"
          );
          let requeue = requeue.clone();
          tokio::spawn(async move {
            sleep(delay).await;
            let _ = requeue.send(Job {
              ident:   job.ident,
              attempt: job.attempt + 1,
            });
          });
          continue;
        }
        Attempt::Retry(error) => GameOutcome::FailedTransient {
          attempts: job.attempt,
          error:    error.to_string(),
        },
      };

      let result = GameResult {
        game_id,
        attempts: job.attempt,
        outcome,
      };
      self.record(run_id, &result).await;
      if done.send(result).is_err() {
        break;
      }
    }
  }

  async fn record(&self, run_id: Uuid, result: &GameResult) {
    let status = result.outcome.status();
    info!(game_id = %result.game_id, attempts = result.attempts, %status, "game finished");
    let record = OutcomeRecord {
      run_id,
      game_id: result.game_id.clone(),
      status,
      attempts: result.attempts,
      messages: result.outcome.messages(),
      recorded_at: Utc::now(),
    };
    if let Err(e) = self.sink.record_outcome(record).await {
      warn!(game_id = %result.game_id, error = %e, "failed to record outcome");
    }
  }

  // ── One attempt ──

  async fn attempt(&self, ident: &GameIdentifier) -> Attempt {
    let lineup = self.lineup(ident).await;
    let url = ident.review_url(&self.settings.base_url);
    match self.fetch(url).await {
      Ok(html) => Attempt::Done(self.process(ident, &html, &lineup).await),
      Err(e) if e.is_retryable() => Attempt::Retry(e),
      Err(e) => Attempt::Done(GameOutcome::Failed {
        error: e.to_string(),
      }),
    }
  }

  /// Player links from the lineup page. Best effort: any failure leaves the
  /// roster as the only source.
  async fn lineup(&self, ident: &GameIdentifier) -> LineupRoster {
    if !self.settings.fetch_lineup {
      return LineupRoster::default();
    }
    let game_id = ident.game_id.as_str();
    let html = match self.fetch(ident.lineup_url(&self.settings.base_url)).await {
      Ok(html) => html,
      Err(e) => {
        debug!(game_id, error = %e, "lineup page unavailable");
        return LineupRoster::default();
      }
    };
    match dugout_extract::lineup_roster(&html) {
      Ok(lineup) => {
        debug!(game_id, players = lineup.len(), "lineup page read");
        lineup
      }
      Err(e) => {
        warn!(game_id, error = %e, "lineup page unreadable");
        LineupRoster::default()
      }
    }
  }

  async fn fetch(&self, url: String) -> Result<String, FetchError> {
    self.throttle.wait(&host_of(&url)).await;
    let mut session = self.pool.acquire().await?;
    match timeout(self.settings.fetch_timeout, session.fetch(url)).await {
      Ok(Ok(html)) => Ok(html),
      Ok(Err(e)) => {
        if e.is_retryable() {
          session.discard();
        }
        Err(e)
      }
      Err(_) => {
        session.discard();
        Err(FetchError::Timeout)
      }
    }
  }

  /// Extraction, resolution and validation run strictly in sequence; the
  /// validator only ever sees a fully resolved box score. Review items are
  /// written only once the game itself is stored.
  async fn process(
    &self,
    ident: &GameIdentifier,
    html: &str,
    lineup: &LineupRoster,
  ) -> GameOutcome {
    let game_id = ident.game_id.as_str();
    let mut box_score =
      match dugout_extract::try_extract(html, game_id, Some(ident.game_date), &self.history) {
        Ok(b) => b,
        Err(dugout_extract::Error::NoEraSignature) => {
          info!(game_id, "no box score on page");
          return GameOutcome::NoData;
        }
        Err(e) => {
          warn!(game_id, error = %e, "extraction failed");
          return GameOutcome::Failed {
            error: e.to_string(),
          };
        }
      };

    let mut review = unresolved_teams(&box_score, ident);
    match self.resolver.resolve_box_score(&mut box_score, lineup).await {
      Ok(items) => review.extend(items),
      Err(e) => {
        return GameOutcome::Failed {
          error: format!("roster lookup failed: {e}"),
        };
      }
    }

    let validation = validate(&box_score, self.history.canonical_codes());
    for warning in &validation.warnings {
      warn!(game_id, %warning, "validation warning");
    }

    let outcome = if validation.is_valid {
      let warnings = validation.warnings.clone();
      let era = box_score.era;
      if let Err(e) = self.sink.save_game(box_score, validation).await {
        return GameOutcome::Failed {
          error: format!("store error: {e}"),
        };
      }
      info!(game_id, %era, warnings = warnings.len(), "accepted");
      GameOutcome::Accepted { warnings }
    } else {
      let errors = validation.errors.clone();
      warn!(game_id, ?errors, "quarantined");
      if let Err(e) = self.sink.quarantine_game(box_score, validation).await {
        return GameOutcome::Failed {
          error: format!("store error: {e}"),
        };
      }
      GameOutcome::Quarantined { errors }
    };

    if !review.is_empty() {
      for item in &review {
        warn!(game_id, side = %item.side, subject = %item.subject, kind = ?item.kind, "flagged for review");
      }
      if let Err(e) = self.sink.flag_for_review(review).await {
        return GameOutcome::Failed {
          error: format!("store error: {e}"),
        };
      }
    }
    outcome
  }
}

/// Review items for sides whose team could not be resolved.
fn unresolved_teams(box_score: &BoxScore, ident: &GameIdentifier) -> Vec<ReviewItem> {
  Side::BOTH
    .into_iter()
    .filter(|side| box_score.teams.get(*side).resolved_code.is_none())
    .map(|side| {
      let token = box_score
        .teams
        .get(side)
        .name
        .clone()
        .unwrap_or_else(|| ident.segment(side).to_string());
      ReviewItem {
        game_id: box_score.game_id.clone(),
        side,
        subject: token.clone(),
        team_code: None,
        season: Some(ident.season_year),
        kind: ReviewKind::UnresolvedTeam { token },
      }
    })
    .collect()
}
