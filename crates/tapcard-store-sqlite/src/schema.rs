//! SQL schema for the tapcard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS cards (
    id          INTEGER PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    company     TEXT,
    job_title   TEXT,
    email       TEXT,
    phone       TEXT,
    website     TEXT,
    card_code   TEXT NOT NULL UNIQUE,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,      -- ISO 8601 UTC
    theme       TEXT NOT NULL DEFAULT 'gradient-blue'
);

PRAGMA user_version = 1;
";
