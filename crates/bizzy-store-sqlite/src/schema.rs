//! SQL schema for the BizzyCard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The UNIQUE constraints are load-bearing: one card per user, one
/// share token, one platform per card, one contact per
/// (owner, source user).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id               TEXT PRIMARY KEY,
    subject               TEXT NOT NULL UNIQUE,  -- identity-provider subject id
    email                 TEXT NOT NULL,
    phone_number          TEXT,
    onboarding_completed  INTEGER NOT NULL DEFAULT 0,
    created_at            TEXT NOT NULL,         -- ISO 8601 UTC
    updated_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cards (
    card_id           TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL UNIQUE REFERENCES users(user_id),
    share_token       TEXT NOT NULL UNIQUE,
    name              TEXT NOT NULL,
    email             TEXT NOT NULL,             -- trimmed, lower-cased
    title             TEXT,
    phone_number      TEXT,
    company           TEXT,
    role              TEXT,
    bio               TEXT,
    tags              TEXT NOT NULL DEFAULT '[]',
    profile_photo_id  TEXT,
    resume_file_id    TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS social_links (
    link_id     TEXT PRIMARY KEY,
    card_id     TEXT NOT NULL REFERENCES cards(card_id),
    platform    TEXT NOT NULL,
    url         TEXT NOT NULL,
    position    INTEGER NOT NULL,                -- display order
    created_at  TEXT NOT NULL,
    UNIQUE (card_id, platform)
);

-- No FK on source_card_id: a deleted source card tombstones the
-- contact in list views instead of blocking card deletion.
CREATE TABLE IF NOT EXISTS contacts (
    contact_id      TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL REFERENCES users(user_id),
    source_card_id  TEXT NOT NULL,
    source_user_id  TEXT NOT NULL,
    accepted_at     TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    tags            TEXT NOT NULL DEFAULT '[]',
    UNIQUE (owner_id, source_user_id)
);

CREATE TABLE IF NOT EXISTS meeting_metadata (
    metadata_id  TEXT PRIMARY KEY,
    contact_id   TEXT NOT NULL UNIQUE REFERENCES contacts(contact_id),
    date         TEXT NOT NULL,
    location     TEXT,
    notes        TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    file_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    media_type  TEXT NOT NULL,
    size_bytes  INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_email_idx     ON users(email);
CREATE INDEX IF NOT EXISTS users_phone_idx     ON users(phone_number);
CREATE INDEX IF NOT EXISTS links_card_idx      ON social_links(card_id);
CREATE INDEX IF NOT EXISTS contacts_owner_idx  ON contacts(owner_id);

PRAGMA user_version = 1;
";
