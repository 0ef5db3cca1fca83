//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use lectern_core::{
    ChapterId, CourseId, HlsStatus, LectureId, LectureKind, OrderId, RefundId, SessionId, UserId,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// AuthToken
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AuthToken {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: String,
}

impl AuthToken {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            user_id: parse_id(row, 1)?,
            token: row.get(2)?,
            expires_at: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    /// Price in minor currency units; zero marks a free course.
    pub price_cents: i64,
    pub created_at: String,
}

impl Course {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            title: row.get(1)?,
            price_cents: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    /// A free course is accessible to any authenticated user.
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: ChapterId,
    pub course_id: CourseId,
    pub title: String,
    pub position: i64,
}

impl Chapter {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            course_id: parse_id(row, 1)?,
            title: row.get(2)?,
            position: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Lecture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Lecture {
    pub id: LectureId,
    pub chapter_id: ChapterId,
    pub title: String,
    /// Order within the chapter.
    pub position: i64,
    pub kind: LectureKind,
    pub duration_secs: Option<f64>,
    pub free_preview: bool,
    /// Source media file; present for `kind = file`.
    pub file_path: Option<String>,
    pub hls_status: HlsStatus,
    /// Diagnostic text from the transcode pipeline when `hls_status = failed`.
    pub hls_error: Option<String>,
    pub created_at: String,
}

impl Lecture {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let kind: String = row.get(4)?;
        let hls_status: String = row.get(8)?;
        Ok(Self {
            id: parse_id(row, 0)?,
            chapter_id: parse_id(row, 1)?,
            title: row.get(2)?,
            position: row.get(3)?,
            kind: LectureKind::parse(&kind),
            duration_secs: row.get(5)?,
            free_preview: row.get::<_, i64>(6)? != 0,
            file_path: row.get(7)?,
            hls_status: HlsStatus::parse(&hls_status),
            hls_error: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: String,
    pub created_at: String,
}

impl Order {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            user_id: parse_id(row, 1)?,
            course_id: parse_id(row, 2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Refund
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Refund {
    pub id: RefundId,
    pub order_id: OrderId,
    pub status: String,
    pub approved_at: Option<String>,
}

impl Refund {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            order_id: parse_id(row, 1)?,
            status: row.get(2)?,
            approved_at: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// WatchProgress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WatchProgress {
    pub user_id: UserId,
    pub lecture_id: LectureId,
    /// Watched portion of the lecture, 0.0 to 100.0.
    pub percent: f64,
    pub updated_at: String,
}

impl WatchProgress {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: parse_id(row, 0)?,
            lecture_id: parse_id(row, 1)?,
            percent: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}
