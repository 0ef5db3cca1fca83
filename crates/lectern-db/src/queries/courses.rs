//! Course and chapter operations.

use chrono::Utc;
use rusqlite::Connection;

use lectern_core::{ChapterId, CourseId, Error, Result};

use crate::models::{Chapter, Course};

const COURSE_COLS: &str = "id, title, price_cents, created_at";
const CHAPTER_COLS: &str = "id, course_id, title, position";

/// Create a course. A `price_cents` of zero marks the course as free.
pub fn create_course(conn: &Connection, title: &str, price_cents: i64) -> Result<Course> {
    let id = CourseId::new();
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO courses (id, title, price_cents, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), title, price_cents, &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Course {
        id,
        title: title.to_string(),
        price_cents,
        created_at: now,
    })
}

/// Look up a course by ID.
pub fn get_course(conn: &Connection, course_id: CourseId) -> Result<Option<Course>> {
    let q = format!("SELECT {COURSE_COLS} FROM courses WHERE id = ?1");
    let result = conn.query_row(&q, [course_id.to_string()], Course::from_row);
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Resolve the course owning a chapter.
pub fn course_for_chapter(conn: &Connection, chapter_id: ChapterId) -> Result<Option<Course>> {
    let q = "SELECT c.id, c.title, c.price_cents, c.created_at
             FROM courses c
             JOIN chapters ch ON ch.course_id = c.id
             WHERE ch.id = ?1";
    let result = conn.query_row(q, [chapter_id.to_string()], Course::from_row);
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Create a chapter within a course at the given position.
pub fn create_chapter(
    conn: &Connection,
    course_id: CourseId,
    title: &str,
    position: i64,
) -> Result<Chapter> {
    let id = ChapterId::new();

    conn.execute(
        "INSERT INTO chapters (id, course_id, title, position) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), course_id.to_string(), title, position],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Chapter {
        id,
        course_id,
        title: title.to_string(),
        position,
    })
}

/// Look up a chapter by ID.
pub fn get_chapter(conn: &Connection, chapter_id: ChapterId) -> Result<Option<Chapter>> {
    let q = format!("SELECT {CHAPTER_COLS} FROM chapters WHERE id = ?1");
    let result = conn.query_row(&q, [chapter_id.to_string()], Chapter::from_row);
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn create_course_and_chapter() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let course = create_course(&conn, "Rust for Beginners", 4900).unwrap();
        assert!(!course.is_free());

        let chapter = create_chapter(&conn, course.id, "Getting Started", 1).unwrap();
        let found = get_chapter(&conn, chapter.id).unwrap().unwrap();
        assert_eq!(found.course_id, course.id);
    }

    #[test]
    fn free_course_flag() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let course = create_course(&conn, "Intro", 0).unwrap();
        assert!(course.is_free());
    }

    #[test]
    fn resolve_course_for_chapter() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let course = create_course(&conn, "Advanced Rust", 9900).unwrap();
        let chapter = create_chapter(&conn, course.id, "Lifetimes", 1).unwrap();

        let resolved = course_for_chapter(&conn, chapter.id).unwrap().unwrap();
        assert_eq!(resolved.id, course.id);
        assert_eq!(resolved.title, "Advanced Rust");
    }

    #[test]
    fn missing_chapter_resolves_to_none() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(course_for_chapter(&conn, ChapterId::new()).unwrap().is_none());
    }
}
