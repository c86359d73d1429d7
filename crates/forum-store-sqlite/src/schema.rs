//! SQL schema for the forum SQLite store.
//!
//! Executed once at connection startup; `PRAGMA user_version` records the
//! schema revision.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    username  TEXT NOT NULL UNIQUE,
    password  TEXT NOT NULL          -- argon2 PHC string, never plaintext
);

CREATE TABLE IF NOT EXISTS categories (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name  TEXT NOT NULL UNIQUE,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS threads (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    content      TEXT NOT NULL,
    author_id    INTEGER NOT NULL,
    author_name  TEXT NOT NULL,
    upvotes      INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at   TEXT NOT NULL,
    is_solved    INTEGER NOT NULL DEFAULT 0
);

-- One row per thread. Must be removed before its thread.
CREATE TABLE IF NOT EXISTS threads_categories (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id    INTEGER NOT NULL REFERENCES threads(id),
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- No foreign key on thread_id: replies are not removed with their thread.
CREATE TABLE IF NOT EXISTS replies (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id    INTEGER NOT NULL,
    content      TEXT NOT NULL,
    author_id    INTEGER NOT NULL,
    author_name  TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    is_answer    INTEGER NOT NULL DEFAULT 0
);

-- No UNIQUE (user_id, thread_id): duplicate stars are possible.
CREATE TABLE IF NOT EXISTS starred_threads (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,
    thread_id   INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS threads_author_idx      ON threads(author_id);
CREATE INDEX IF NOT EXISTS threads_categories_idx  ON threads_categories(thread_id);
CREATE INDEX IF NOT EXISTS threads_by_category_idx ON threads_categories(category_id);
CREATE INDEX IF NOT EXISTS replies_thread_idx      ON replies(thread_id);
CREATE INDEX IF NOT EXISTS starred_user_idx        ON starred_threads(user_id);

PRAGMA user_version = 1;
";
