//! Watch-progress operations.

use chrono::Utc;
use rusqlite::Connection;

use lectern_core::{Error, LectureId, Result, UserId};

use crate::models::WatchProgress;

const COLS: &str = "user_id, lecture_id, percent, updated_at";

/// Insert or update the watched percentage for a (user, lecture) pair.
///
/// Progress never moves backwards: a report below the stored value leaves
/// the row unchanged, so seeking back in the player cannot re-lock the next
/// lecture.
pub fn upsert_progress(
    conn: &Connection,
    user_id: UserId,
    lecture_id: LectureId,
    percent: f64,
) -> Result<WatchProgress> {
    let now = Utc::now().to_rfc3339();
    let percent = percent.clamp(0.0, 100.0);

    conn.execute(
        "INSERT INTO watch_progress (user_id, lecture_id, percent, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, lecture_id) DO UPDATE SET
            percent = MAX(percent, excluded.percent),
            updated_at = excluded.updated_at",
        rusqlite::params![user_id.to_string(), lecture_id.to_string(), percent, &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_progress(conn, user_id, lecture_id).map(|opt| opt.expect("just upserted"))
}

/// Get the progress record for a (user, lecture) pair.
pub fn get_progress(
    conn: &Connection,
    user_id: UserId,
    lecture_id: LectureId,
) -> Result<Option<WatchProgress>> {
    let q = format!("SELECT {COLS} FROM watch_progress WHERE user_id = ?1 AND lecture_id = ?2");
    let result = conn.query_row(
        &q,
        rusqlite::params![user_id.to_string(), lecture_id.to_string()],
        WatchProgress::from_row,
    );
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Watched percentage for a (user, lecture) pair; `None` when never watched.
pub fn percent_watched(
    conn: &Connection,
    user_id: UserId,
    lecture_id: LectureId,
) -> Result<Option<f64>> {
    Ok(get_progress(conn, user_id, lecture_id)?.map(|p| p.percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::{courses, lectures, users};

    fn fixture(conn: &Connection) -> (UserId, LectureId) {
        let user = users::create_user(conn, "watcher", "hash", "student").unwrap();
        let course = courses::create_course(conn, "Course", 0).unwrap();
        let chapter = courses::create_chapter(conn, course.id, "Ch", 1).unwrap();
        let lecture = lectures::create_lecture(
            conn,
            &lectures::NewLecture::ready(chapter.id, "Lecture", 1),
        )
        .unwrap();
        (user.id, lecture.id)
    }

    #[test]
    fn upsert_and_read() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (user, lecture) = fixture(&conn);

        assert!(percent_watched(&conn, user, lecture).unwrap().is_none());

        upsert_progress(&conn, user, lecture, 42.5).unwrap();
        assert_eq!(percent_watched(&conn, user, lecture).unwrap(), Some(42.5));
    }

    #[test]
    fn progress_never_regresses() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (user, lecture) = fixture(&conn);

        upsert_progress(&conn, user, lecture, 90.0).unwrap();
        upsert_progress(&conn, user, lecture, 10.0).unwrap();
        assert_eq!(percent_watched(&conn, user, lecture).unwrap(), Some(90.0));
    }

    #[test]
    fn percent_is_clamped() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (user, lecture) = fixture(&conn);

        let p = upsert_progress(&conn, user, lecture, 250.0).unwrap();
        assert_eq!(p.percent, 100.0);

        let q = upsert_progress(&conn, user, lecture, -5.0).unwrap();
        assert_eq!(q.percent, 100.0); // clamped to 0, then MAX with stored 100
    }
}
