//! Stream initiation and direct-file fallback.
//!
//! `start_stream` runs the full authorization ladder for a lecture and, on
//! success, answers with a manifest URL carrying a freshly minted access
//! token. The ladder is ordered deliberately: transcode state is reported
//! before any entitlement question, free previews bypass both gates, and
//! the sequential-watching gate only runs when its feature flag is on.

use axum::extract::{Extension, Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;
use serde_json::json;

use lectern_core::{Error, HlsStatus, LectureId, LectureKind, UserId};
use lectern_db::models::Lecture;
use lectern_db::pool;
use lectern_db::queries::lectures;

use crate::context::AppContext;
use crate::envelope::Envelope;
use crate::error::AppError;
use crate::routes::streaming;
use crate::{flags, progress_gate};

/// GET /api/stream/{lecture_id}
///
/// Authorize the caller for a lecture and mint a stream token.
pub async fn start_stream(
    State(ctx): State<AppContext>,
    Extension(user_id): Extension<UserId>,
    Path(lecture_id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let lecture_id: LectureId = lecture_id
        .parse()
        .map_err(|_| Error::Validation("Invalid lecture ID".into()))?;

    let conn = pool::get_conn(&ctx.db)?;
    let lecture = lectures::get_lecture(&conn, lecture_id)?
        .ok_or_else(|| Error::not_found("Lecture not found"))?;

    ensure_streamable(&ctx, &lecture)?;

    if !lecture.free_preview {
        if !ctx.access.can_access_lecture(user_id, &lecture) {
            return Err(Error::Forbidden("Subscription required.".into()).into());
        }

        if flags::is_enabled(&conn, flags::VIDEO_PROGRESS_ENFORCEMENT, true) {
            let unlocked = progress_gate::can_access_next_lesson(&conn, user_id, &lecture)
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        user_id = %user_id,
                        lecture_id = %lecture.id,
                        error = %e,
                        "Progress lookup failed; denying access"
                    );
                    false
                });
            if !unlocked {
                return Err(Error::Forbidden(
                    "You must watch at least 85% of the previous lecture before continuing."
                        .into(),
                )
                .into());
            }
        }
    }

    let token = ctx.tokens.issue(lecture.id, user_id, lecture.free_preview);
    let manifest_url = format!(
        "{}/api/hls/{}/master.m3u8",
        ctx.config.public_base_url(),
        token
    );

    tracing::info!(
        user_id = %user_id,
        lecture_id = %lecture.id,
        free_preview = lecture.free_preview,
        "Stream authorized"
    );

    Ok(Json(Envelope::ok(
        "Stream ready",
        json!({
            "manifest_url": manifest_url,
            "type": "hls",
            "lecture_id": lecture.id,
            "lecture_title": lecture.title,
            "duration": lecture.duration_secs,
            "expires_in_seconds": ctx.tokens.ttl_secs(),
            "is_free_preview": lecture.free_preview,
        }),
    )))
}

/// GET /api/stream/{lecture_id}/direct
///
/// Serve the lecture's source file with Range support. This is the fallback
/// target offered when HLS is unavailable because the encoder was missing;
/// it runs the same entitlement check as `start_stream`.
pub async fn direct_stream(
    State(ctx): State<AppContext>,
    Extension(user_id): Extension<UserId>,
    Path(lecture_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let lecture_id: LectureId = lecture_id
        .parse()
        .map_err(|_| Error::Validation("Invalid lecture ID".into()))?;

    let conn = pool::get_conn(&ctx.db)?;
    let lecture = lectures::get_lecture(&conn, lecture_id)?
        .ok_or_else(|| Error::not_found("Lecture not found"))?;

    let file_path = match (lecture.kind, lecture.file_path.as_deref()) {
        (LectureKind::File, Some(path)) => path.to_string(),
        _ => return Err(Error::not_found("No downloadable file for this lecture").into()),
    };

    if !lecture.free_preview && !ctx.access.can_access_lecture(user_id, &lecture) {
        return Err(Error::Forbidden("Subscription required.".into()).into());
    }

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_owned());

    Ok(streaming::serve_file_streaming(
        std::path::Path::new(&file_path),
        range_header.as_deref(),
    )
    .await?)
}

/// Reject lectures whose HLS artifacts cannot be served right now, with a
/// message matching the transcode state.
fn ensure_streamable(ctx: &AppContext, lecture: &Lecture) -> Result<(), Error> {
    match lecture.hls_status {
        HlsStatus::Ready => Ok(()),
        HlsStatus::Pending => Err(Error::unavailable(
            "Video is queued for processing. Please try again shortly.",
        )),
        HlsStatus::Processing => Err(Error::unavailable(
            "Video is still being processed. Please try again shortly.",
        )),
        HlsStatus::None => Err(Error::unavailable(
            "Video has not been prepared for streaming.",
        )),
        HlsStatus::Failed => {
            let error_text = lecture.hls_error.as_deref().unwrap_or("");
            if encoder_unavailable(error_text) {
                // The encoder itself was missing rather than the encode
                // failing; plain-file lectures can fall back to a direct
                // download.
                let fallback_url = (lecture.kind == LectureKind::File
                    && lecture.file_path.is_some())
                .then(|| {
                    format!(
                        "{}/api/stream/{}/direct",
                        ctx.config.public_base_url(),
                        lecture.id
                    )
                });
                Err(Error::ContentUnavailable {
                    message: "Streaming is temporarily unavailable for this video.".into(),
                    fallback_url,
                })
            } else {
                Err(Error::unavailable(
                    "Video processing failed. Please contact support.",
                ))
            }
        }
    }
}

/// Does the transcode error text indicate a missing encoder rather than a
/// genuine encode failure?
fn encoder_unavailable(error_text: &str) -> bool {
    let lower = error_text.to_ascii_lowercase();
    (lower.contains("ffmpeg") && lower.contains("not found"))
        || lower.contains("encoder unavailable")
}
