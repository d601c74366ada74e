//! SQL schema for the Kin SQLite ledger.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id    TEXT PRIMARY KEY,  -- upstream entity id, e.g. 'Q9682'
    name         TEXT NOT NULL,
    birth_date   TEXT,              -- ISO 8601 calendar date or NULL
    death_date   TEXT,
    bio          TEXT,
    gender       TEXT NOT NULL DEFAULT 'unknown',
    image_url    TEXT,
    birth_place  TEXT,
    occupations  TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    last_updated TEXT NOT NULL      -- RFC 3339 UTC; set on every merge
);

-- Edges are insert-only and deduplicated on insert; no UPDATE or DELETE is
-- ever issued against this table. rowid order is the ledger's insertion
-- order, which the neighborhood traversal depends on.
CREATE TABLE IF NOT EXISTS edges (
    edge_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL REFERENCES people(person_id),
    target_id TEXT NOT NULL REFERENCES people(person_id),
    kind      TEXT NOT NULL,        -- 'parent' | 'spouse' | 'sibling'
    UNIQUE (source_id, target_id, kind)
);

CREATE INDEX IF NOT EXISTS edges_source_idx ON edges(source_id);
CREATE INDEX IF NOT EXISTS edges_target_idx ON edges(target_id);

PRAGMA user_version = 1;
";
