//! SQL schema for the Tally SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The facts table is append-only: no UPDATE or DELETE is ever issued
/// against it. The primary key mirrors the natural key of a presence fact,
/// so a duplicate insert would fail loudly even if the ledger's existence
/// check were bypassed. The statistics table is a derived cache, overwritten
/// row-by-row via upsert.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS facts (
    date         TEXT NOT NULL,    -- ISO 8601 calendar date
    group_id     TEXT NOT NULL,
    user_id      TEXT NOT NULL,
    display_name TEXT NOT NULL,    -- frozen at first sight
    present      INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (date, group_id, user_id)
);

CREATE TABLE IF NOT EXISTS statistics (
    user_id                   TEXT PRIMARY KEY,
    display_name              TEXT NOT NULL,
    last_attended_date        TEXT NOT NULL,
    consecutive_business_days INTEGER NOT NULL,
    total_attended_days       INTEGER NOT NULL,
    updated_at                TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS facts_user_idx ON facts(user_id, date);
CREATE INDEX IF NOT EXISTS facts_date_idx ON facts(date);

PRAGMA user_version = 1;
";
