//! Sequential-watching gate.
//!
//! When progress enforcement is on, a lecture only unlocks once the lecture
//! immediately before it in curriculum order has been watched past the
//! completion threshold.

use rusqlite::Connection;

use lectern_core::{Result, UserId};
use lectern_db::models::Lecture;
use lectern_db::queries::{lectures, progress};

/// Watched percentage of the predecessor required to unlock a lecture.
pub const COMPLETION_THRESHOLD_PCT: f64 = 85.0;

/// May `user_id` start `lecture`, given their progress on its predecessor?
///
/// The first lecture of a course is always unlocked. The threshold is
/// boundary-inclusive: exactly 85% passes.
pub fn can_access_next_lesson(
    conn: &Connection,
    user_id: UserId,
    lecture: &Lecture,
) -> Result<bool> {
    let Some(previous) = lectures::preceding_lecture(conn, lecture.id)? else {
        return Ok(true);
    };

    let watched = progress::percent_watched(conn, user_id, previous.id)?.unwrap_or(0.0);
    Ok(watched >= COMPLETION_THRESHOLD_PCT)
}
