//! Token-gated playlist and segment serving.
//!
//! These endpoints are unauthenticated at the HTTP layer; the stream token
//! in the path is the credential. Each request runs the origin guard, then
//! resolves the token, re-checks the bound lecture, and serves from the
//! lecture's artifact directory. Playlists are rewritten so every child
//! reference routes back through this endpoint with the same token; segment
//! bytes are streamed with bounded memory.
//!
//! Responses are never cacheable by intermediaries: a cached segment would
//! outlive the token check.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use lectern_core::{Error, HlsStatus};
use lectern_db::pool;
use lectern_db::queries::lectures;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::streaming::hls_content_type;
use crate::{manifest, origin};

/// Default entry point of a lecture's artifact set.
pub const MASTER_PLAYLIST: &str = "master.m3u8";

const CHUNK_SIZE: usize = 64 * 1024;
const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// GET /api/hls/{token}
pub async fn serve_master(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve(&ctx, &token, MASTER_PLAYLIST, &headers).await
}

/// GET /api/hls/{token}/{*path}
pub async fn serve_file(
    State(ctx): State<AppContext>,
    Path((token, path)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve(&ctx, &token, &path, &headers).await
}

async fn serve(
    ctx: &AppContext,
    token: &str,
    sub_path: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let origin_header = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let referer_header = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    // One generic rejection for every origin failure mode.
    if !origin::validate_origin(
        &ctx.config.streaming.allowed_origins,
        origin_header,
        referer_header,
    ) {
        return Err(Error::Forbidden("Access denied".into()).into());
    }

    let record = ctx
        .tokens
        .resolve(token)
        .ok_or_else(|| Error::Forbidden("Access token expired or invalid.".into()))?;

    // Re-check the lecture: artifacts may have been rotated or the lecture
    // deleted since the token was minted.
    let conn = pool::get_conn(&ctx.db)?;
    let lecture = lectures::get_lecture(&conn, record.lecture_id)?
        .filter(|l| l.hls_status == HlsStatus::Ready)
        .ok_or_else(|| Error::not_found("Video not found or not available"))?;

    let clean = sanitize_sub_path(sub_path);
    let clean = if clean.is_empty() {
        MASTER_PLAYLIST.to_string()
    } else {
        clean
    };

    let file_path = ctx
        .config
        .streaming
        .hls_root
        .join(lecture.id.to_string())
        .join(&clean);

    let metadata = tokio::fs::metadata(&file_path)
        .await
        .map_err(|_| Error::not_found("File not found."))?;
    if !metadata.is_file() {
        return Err(Error::not_found("File not found.").into());
    }

    let content_type = hls_content_type(&clean);
    let cors_origin = origin_header.unwrap_or("*").to_string();

    if clean.ends_with(".m3u8") {
        let text = tokio::fs::read_to_string(&file_path)
            .await
            .map_err(|_| Error::not_found("File not found."))?;

        let base = format!("{}/api/hls/{}", ctx.config.public_base_url(), token);
        let rewritten = manifest::rewrite_playlist(&text, &base);

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, NO_CACHE)
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, cors_origin)
            .body(Body::from(rewritten))
            .map_err(|e| Error::Internal(format!("Response build failed: {e}")).into())
    } else {
        let file = tokio::fs::File::open(&file_path)
            .await
            .map_err(|_| Error::not_found("File not found."))?;

        let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, metadata.len().to_string())
            .header(header::CACHE_CONTROL, NO_CACHE)
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, cors_origin)
            .body(Body::from_stream(stream))
            .map_err(|e| Error::Internal(format!("Response build failed: {e}")).into())
    }
}

/// Strip traversal sequences from a requested sub-path.
///
/// Removing every `..` and backslash before the path is joined onto the
/// lecture directory makes escaping that directory impossible no matter
/// what string the client supplies; a mangled path simply fails the file
/// lookup with 404.
fn sanitize_sub_path(raw: &str) -> String {
    raw.replace('\\', "")
        .replace("..", "")
        .trim_start_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_traversal() {
        assert_eq!(sanitize_sub_path("../../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_sub_path("..\\..\\win.ini"), "win.ini");
        assert_eq!(sanitize_sub_path("a/../b.ts"), "a//b.ts");
    }

    #[test]
    fn sanitize_keeps_normal_paths() {
        assert_eq!(sanitize_sub_path("master.m3u8"), "master.m3u8");
        assert_eq!(sanitize_sub_path("v0/segment_001.ts"), "v0/segment_001.ts");
    }

    #[test]
    fn sanitize_strips_leading_slash() {
        assert_eq!(sanitize_sub_path("/etc/passwd"), "etc/passwd");
    }

    #[test]
    fn pure_traversal_collapses_to_empty() {
        assert_eq!(sanitize_sub_path(".."), "");
        assert_eq!(sanitize_sub_path("../.."), "");
        assert_eq!(sanitize_sub_path("\\..\\"), "");
    }
}
