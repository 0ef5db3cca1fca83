//! Lecture operations, including curriculum-order traversal.

use chrono::Utc;
use rusqlite::Connection;

use lectern_core::{ChapterId, Error, HlsStatus, LectureId, LectureKind, Result};

use crate::models::Lecture;

const COLS: &str = "id, chapter_id, title, position, kind, duration_secs, free_preview, \
                    file_path, hls_status, hls_error, created_at";

/// Parameters for [`create_lecture`].
///
/// Kept as a struct so test fixtures can spell out only what they care about.
#[derive(Debug, Clone)]
pub struct NewLecture<'a> {
    pub chapter_id: ChapterId,
    pub title: &'a str,
    pub position: i64,
    pub kind: LectureKind,
    pub duration_secs: Option<f64>,
    pub free_preview: bool,
    pub file_path: Option<&'a str>,
    pub hls_status: HlsStatus,
    pub hls_error: Option<&'a str>,
}

impl<'a> NewLecture<'a> {
    /// A ready-to-stream file lecture; the common case in fixtures.
    pub fn ready(chapter_id: ChapterId, title: &'a str, position: i64) -> Self {
        Self {
            chapter_id,
            title,
            position,
            kind: LectureKind::File,
            duration_secs: Some(600.0),
            free_preview: false,
            file_path: None,
            hls_status: HlsStatus::Ready,
            hls_error: None,
        }
    }
}

/// Insert a lecture row.
pub fn create_lecture(conn: &Connection, new: &NewLecture) -> Result<Lecture> {
    let id = LectureId::new();
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO lectures
         (id, chapter_id, title, position, kind, duration_secs, free_preview,
          file_path, hls_status, hls_error, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            id.to_string(),
            new.chapter_id.to_string(),
            new.title,
            new.position,
            new.kind.to_string(),
            new.duration_secs,
            new.free_preview as i64,
            new.file_path,
            new.hls_status.to_string(),
            new.hls_error,
            &now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_lecture(conn, id).map(|opt| opt.expect("just inserted"))
}

/// Look up a lecture by ID.
pub fn get_lecture(conn: &Connection, lecture_id: LectureId) -> Result<Option<Lecture>> {
    let q = format!("SELECT {COLS} FROM lectures WHERE id = ?1");
    let result = conn.query_row(&q, [lecture_id.to_string()], Lecture::from_row);
    match result {
        Ok(l) => Ok(Some(l)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Find the lecture immediately preceding `lecture_id` in curriculum order
/// within the same course.
///
/// Curriculum order is (chapter.position, lecture.position); the predecessor
/// may live at the end of the previous chapter. Returns `None` for the first
/// lecture of a course.
pub fn preceding_lecture(conn: &Connection, lecture_id: LectureId) -> Result<Option<Lecture>> {
    let q = "SELECT l.id, l.chapter_id, l.title, l.position, l.kind, l.duration_secs,
                    l.free_preview, l.file_path, l.hls_status, l.hls_error, l.created_at
             FROM lectures l
             JOIN chapters ch ON ch.id = l.chapter_id
             JOIN lectures target ON target.id = ?1
             JOIN chapters target_ch ON target_ch.id = target.chapter_id
             WHERE ch.course_id = target_ch.course_id
               AND (ch.position < target_ch.position
                    OR (ch.position = target_ch.position AND l.position < target.position))
             ORDER BY ch.position DESC, l.position DESC
             LIMIT 1";
    let result = conn.query_row(q, [lecture_id.to_string()], Lecture::from_row);
    match result {
        Ok(l) => Ok(Some(l)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::courses;

    fn fixture(conn: &Connection) -> (ChapterId, ChapterId) {
        let course = courses::create_course(conn, "Course", 1000).unwrap();
        let ch1 = courses::create_chapter(conn, course.id, "Chapter 1", 1).unwrap();
        let ch2 = courses::create_chapter(conn, course.id, "Chapter 2", 2).unwrap();
        (ch1.id, ch2.id)
    }

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (ch1, _) = fixture(&conn);

        let lecture = create_lecture(
            &conn,
            &NewLecture {
                free_preview: true,
                file_path: Some("/media/intro.mp4"),
                ..NewLecture::ready(ch1, "Intro", 1)
            },
        )
        .unwrap();

        let found = get_lecture(&conn, lecture.id).unwrap().unwrap();
        assert_eq!(found.title, "Intro");
        assert!(found.free_preview);
        assert_eq!(found.hls_status, HlsStatus::Ready);
        assert_eq!(found.kind, LectureKind::File);
        assert_eq!(found.file_path.as_deref(), Some("/media/intro.mp4"));
    }

    #[test]
    fn first_lecture_has_no_predecessor() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (ch1, _) = fixture(&conn);

        let first = create_lecture(&conn, &NewLecture::ready(ch1, "First", 1)).unwrap();
        assert!(preceding_lecture(&conn, first.id).unwrap().is_none());
    }

    #[test]
    fn predecessor_within_chapter() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (ch1, _) = fixture(&conn);

        let first = create_lecture(&conn, &NewLecture::ready(ch1, "First", 1)).unwrap();
        let second = create_lecture(&conn, &NewLecture::ready(ch1, "Second", 2)).unwrap();

        let pred = preceding_lecture(&conn, second.id).unwrap().unwrap();
        assert_eq!(pred.id, first.id);
    }

    #[test]
    fn predecessor_crosses_chapter_boundary() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (ch1, ch2) = fixture(&conn);

        create_lecture(&conn, &NewLecture::ready(ch1, "1.1", 1)).unwrap();
        let last_of_ch1 = create_lecture(&conn, &NewLecture::ready(ch1, "1.2", 2)).unwrap();
        let first_of_ch2 = create_lecture(&conn, &NewLecture::ready(ch2, "2.1", 1)).unwrap();

        let pred = preceding_lecture(&conn, first_of_ch2.id).unwrap().unwrap();
        assert_eq!(pred.id, last_of_ch1.id);
    }

    #[test]
    fn predecessor_ignores_other_courses() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (ch1, _) = fixture(&conn);

        // An unrelated course with an earlier chapter position.
        let other = courses::create_course(&conn, "Other", 0).unwrap();
        let other_ch = courses::create_chapter(&conn, other.id, "X", 0).unwrap();
        create_lecture(&conn, &NewLecture::ready(other_ch.id, "noise", 1)).unwrap();

        let first = create_lecture(&conn, &NewLecture::ready(ch1, "First", 1)).unwrap();
        assert!(preceding_lecture(&conn, first.id).unwrap().is_none());
    }
}
