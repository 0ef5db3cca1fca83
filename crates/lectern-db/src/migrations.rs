//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;

use lectern_core::{Error, Result};

/// V1: initial schema -- creates all core tables and indexes.
const V1_INITIAL: &str = r#"
-- Users and auth
CREATE TABLE users (
    id            TEXT PRIMARY KEY,
    username      TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'student',
    created_at    TEXT NOT NULL
);

CREATE TABLE auth_tokens (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id),
    token      TEXT UNIQUE NOT NULL,
    expires_at TEXT NOT NULL
);

-- Catalog: courses, chapters, lectures
CREATE TABLE courses (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    price_cents INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE chapters (
    id        TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    title     TEXT NOT NULL,
    position  INTEGER NOT NULL
);

CREATE TABLE lectures (
    id            TEXT PRIMARY KEY,
    chapter_id    TEXT NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    position      INTEGER NOT NULL,
    kind          TEXT NOT NULL DEFAULT 'file',
    duration_secs REAL,
    free_preview  INTEGER NOT NULL DEFAULT 0,
    file_path     TEXT,
    hls_status    TEXT NOT NULL DEFAULT 'none',
    hls_error     TEXT,
    created_at    TEXT NOT NULL
);

-- Entitlements: orders and refunds
CREATE TABLE orders (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id),
    course_id  TEXT NOT NULL REFERENCES courses(id),
    status     TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE TABLE refunds (
    id          TEXT PRIMARY KEY,
    order_id    TEXT NOT NULL REFERENCES orders(id),
    status      TEXT NOT NULL DEFAULT 'requested',
    approved_at TEXT
);

-- Watch progress
CREATE TABLE watch_progress (
    user_id    TEXT NOT NULL REFERENCES users(id),
    lecture_id TEXT NOT NULL REFERENCES lectures(id) ON DELETE CASCADE,
    percent    REAL NOT NULL DEFAULT 0.0,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, lecture_id)
);

-- Runtime feature flags and settings
CREATE TABLE settings (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Indexes
CREATE INDEX idx_chapters_course   ON chapters(course_id);
CREATE INDEX idx_lectures_chapter  ON lectures(chapter_id);
CREATE INDEX idx_orders_user       ON orders(user_id, course_id);
CREATE INDEX idx_refunds_order     ON refunds(order_id);
CREATE INDEX idx_progress_user     ON watch_progress(user_id);
"#;

/// V2: seed the anonymous user used when auth is disabled.
///
/// The auth middleware returns this well-known UUID for unauthenticated
/// requests.  Without a corresponding row in `users`, any INSERT into
/// `watch_progress` violates the FK constraint.
const V2_ANONYMOUS_USER: &str = r#"
INSERT OR IGNORE INTO users (id, username, password_hash, role, created_at)
VALUES ('00000000-0000-0000-0000-000000000000', 'anonymous', '!disabled', 'student', datetime('now'));
"#;

/// V3: seed the sequential-watching enforcement flag.
///
/// The flag is read through `queries::settings::get_flag` with a default of
/// `true`; seeding the row makes the switch visible and editable in place.
const V3_PROGRESS_FLAG: &str = r#"
INSERT OR IGNORE INTO settings (key, value) VALUES ('video_progress_enforcement', 'true');
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, V1_INITIAL),
    (2, V2_ANONYMOUS_USER),
    (3, V3_PROGRESS_FLAG),
];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}
