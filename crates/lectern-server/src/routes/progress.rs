//! Watch-progress route handlers.
//!
//! Players report the watched percentage here; the sequential-watching gate
//! reads the same records when deciding whether the next lecture unlocks.

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use lectern_core::{Error, LectureId, UserId};
use lectern_db::pool;
use lectern_db::queries::{lectures, progress};

use crate::context::AppContext;
use crate::envelope::Envelope;
use crate::error::AppError;

/// Progress report payload.
#[derive(Debug, Deserialize)]
pub struct ReportProgressRequest {
    /// Watched portion of the lecture, 0 to 100.
    pub percent: f64,
}

/// POST /api/lectures/{lecture_id}/progress
pub async fn report_progress(
    State(ctx): State<AppContext>,
    Extension(user_id): Extension<UserId>,
    Path(lecture_id): Path<String>,
    Json(req): Json<ReportProgressRequest>,
) -> Result<Json<Envelope>, AppError> {
    let lecture_id: LectureId = lecture_id
        .parse()
        .map_err(|_| Error::Validation("Invalid lecture ID".into()))?;

    if !req.percent.is_finite() || !(0.0..=100.0).contains(&req.percent) {
        return Err(Error::Validation("percent must be between 0 and 100".into()).into());
    }

    let conn = pool::get_conn(&ctx.db)?;
    lectures::get_lecture(&conn, lecture_id)?
        .ok_or_else(|| Error::not_found("Lecture not found"))?;

    let record = progress::upsert_progress(&conn, user_id, lecture_id, req.percent)?;

    Ok(Json(Envelope::ok(
        "Progress saved",
        json!({
            "lecture_id": record.lecture_id,
            "percent": record.percent,
            "updated_at": record.updated_at,
        }),
    )))
}

/// GET /api/lectures/{lecture_id}/progress
pub async fn get_progress(
    State(ctx): State<AppContext>,
    Extension(user_id): Extension<UserId>,
    Path(lecture_id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let lecture_id: LectureId = lecture_id
        .parse()
        .map_err(|_| Error::Validation("Invalid lecture ID".into()))?;

    let conn = pool::get_conn(&ctx.db)?;
    lectures::get_lecture(&conn, lecture_id)?
        .ok_or_else(|| Error::not_found("Lecture not found"))?;

    let record = progress::get_progress(&conn, user_id, lecture_id)?;

    Ok(Json(Envelope::ok(
        "OK",
        json!({
            "lecture_id": lecture_id,
            "percent": record.as_ref().map(|r| r.percent).unwrap_or(0.0),
            "updated_at": record.map(|r| r.updated_at),
        }),
    )))
}
