//! SQL schema for the portal SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per collection. Each write replaces the whole document.
CREATE TABLE IF NOT EXISTS slots (
    name        TEXT PRIMARY KEY,   -- 'users' | 'attendance' | 'leaves' | ...
    value_json  TEXT NOT NULL,      -- the whole collection; not validated here
    updated_at  TEXT NOT NULL       -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
