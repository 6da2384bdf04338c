//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `handle` and `email` carry UNIQUE constraints. The resolver's prefix
/// scan is advisory only — the constraint is what actually arbitrates a
/// create/create race, and the account manager retries with the next
/// candidate when it loses.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id TEXT PRIMARY KEY,
    handle      TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    roles       TEXT NOT NULL,   -- ordered comma-joined role names
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- At most one contact record per identity; the row is always replaced
-- whole, never patched field by field.
CREATE TABLE IF NOT EXISTS contact_details (
    owner_id      TEXT PRIMARY KEY REFERENCES identities(identity_id),
    address_line1 TEXT,
    address_line2 TEXT,
    city          TEXT,
    postcode      TEXT,
    country       TEXT
);

CREATE INDEX IF NOT EXISTS identities_handle_idx ON identities(handle);

PRAGMA user_version = 1;
";
