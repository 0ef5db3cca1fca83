//! Runtime feature flags.
//!
//! Thin read-through accessor over the settings table. Flags can be flipped
//! in place without a restart; a missing row or failed lookup falls back to
//! the supplied default.

use rusqlite::Connection;

use lectern_db::queries::settings;

/// Gates the sequential-watching enforcement in the stream handler.
pub const VIDEO_PROGRESS_ENFORCEMENT: &str = "video_progress_enforcement";

/// Read a boolean flag, falling back to `default` on absence or error.
pub fn is_enabled(conn: &Connection, flag: &str, default: bool) -> bool {
    settings::get_flag(conn, flag, default).unwrap_or_else(|e| {
        tracing::warn!(flag, error = %e, "Flag lookup failed; using default");
        default
    })
}
