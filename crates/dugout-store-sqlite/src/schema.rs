//! SQL schema for the Dugout SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per accepted game; saving again replaces it.
CREATE TABLE IF NOT EXISTS games (
    game_id        TEXT PRIMARY KEY,
    game_date      TEXT,            -- YYYY-MM-DD
    era            TEXT NOT NULL,   -- 'modern' | 'legacy' | 'transitional'
    away_code      TEXT,
    home_code      TEXT,
    away_score     INTEGER,
    home_score     INTEGER,
    box_score_json TEXT NOT NULL,
    warnings_json  TEXT NOT NULL DEFAULT '[]',
    saved_at       TEXT NOT NULL    -- RFC 3339 UTC
);

-- Games that failed validation. A game leaves this table once accepted.
CREATE TABLE IF NOT EXISTS quarantine (
    game_id        TEXT PRIMARY KEY,
    box_score_json TEXT NOT NULL,
    errors_json    TEXT NOT NULL,
    warnings_json  TEXT NOT NULL DEFAULT '[]',
    quarantined_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ingest_runs (
    run_id           TEXT PRIMARY KEY,
    started_at       TEXT NOT NULL,
    finished_at      TEXT NOT NULL,
    total            INTEGER NOT NULL,
    accepted         INTEGER NOT NULL,
    quarantined      INTEGER NOT NULL,
    no_data          INTEGER NOT NULL,
    failed_transient INTEGER NOT NULL,
    failed           INTEGER NOT NULL
);

-- Append-only log of terminal per-game outcomes.
CREATE TABLE IF NOT EXISTS ingest_outcomes (
    outcome_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id        TEXT NOT NULL,
    game_id       TEXT NOT NULL,
    status        TEXT NOT NULL,
    attempts      INTEGER NOT NULL,
    messages_json TEXT NOT NULL DEFAULT '[]',
    recorded_at   TEXT NOT NULL
);

-- Unresolved teams and players, for offline review.
CREATE TABLE IF NOT EXISTS review_items (
    review_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id    TEXT NOT NULL,
    side       TEXT NOT NULL,
    subject    TEXT NOT NULL,
    kind       TEXT NOT NULL,
    item_json  TEXT NOT NULL,   -- the full review item
    flagged_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS roster (
    player_id   INTEGER NOT NULL,
    name        TEXT NOT NULL,
    team_code   TEXT NOT NULL,
    season_year INTEGER NOT NULL,
    uniform_no  TEXT,
    PRIMARY KEY (player_id, team_code, season_year)
);

CREATE INDEX IF NOT EXISTS games_date_idx       ON games(game_date);
CREATE INDEX IF NOT EXISTS outcomes_run_idx     ON ingest_outcomes(run_id);
CREATE INDEX IF NOT EXISTS outcomes_game_idx    ON ingest_outcomes(game_id);
CREATE INDEX IF NOT EXISTS review_game_idx      ON review_items(game_id);
CREATE INDEX IF NOT EXISTS roster_lookup_idx    ON roster(name, team_code, season_year);

PRAGMA user_version = 1;
";
