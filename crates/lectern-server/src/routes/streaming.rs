//! Shared streaming helpers: range parsing, content-type mapping, and
//! chunked file serving via `ReaderStream`.
//!
//! File bodies are streamed in 64 KiB chunks so memory stays bounded
//! regardless of file size, and the copy loop ends as soon as the client
//! disconnects (the stream is dropped with the connection).

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use lectern_core::Error;

const CHUNK_SIZE: usize = 64 * 1024;

/// Parse a `Range: bytes=START-END` header value.
///
/// Returns `(start, Option<end>)` where `end` is `None` for open-ended
/// ranges like `bytes=500-`.
pub fn parse_range_header(value: &str) -> Option<(u64, Option<u64>)> {
    let bytes_prefix = value.strip_prefix("bytes=")?;
    let mut parts = bytes_prefix.splitn(2, '-');
    let start_str = parts.next()?.trim();
    let end_str = parts.next()?.trim();

    let start: u64 = start_str.parse().ok()?;
    let end: Option<u64> = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse().ok()?)
    };

    Some((start, end))
}

/// MIME type for playlist/segment serving. Only `.m3u8` and `.ts` get
/// protocol types; everything else is opaque binary.
pub fn hls_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("ts") => "video/mp2t",
        _ => "application/octet-stream",
    }
}

/// MIME type for direct source-file serving, from the file extension.
pub fn media_content_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "ts" => "video/mp2t",
        _ => "application/octet-stream",
    }
}

/// Serve a file using chunked streaming via `ReaderStream`.
///
/// Supports Range requests; out-of-bounds ranges answer 416 with the
/// current file size.
pub async fn serve_file_streaming(
    file_path: &std::path::Path,
    range_header: Option<&str>,
) -> Result<Response, Error> {
    let metadata = tokio::fs::metadata(file_path)
        .await
        .map_err(|_| Error::not_found("File not found."))?;

    let file_size = metadata.len();
    let content_type = media_content_type(&file_path.to_string_lossy());

    let range = range_header.and_then(parse_range_header);

    match range {
        Some((start, end_opt)) => {
            let last = file_size.saturating_sub(1);
            let end = end_opt.unwrap_or(last).min(last);
            if start > end || start >= file_size {
                return Ok((
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(
                        header::CONTENT_RANGE.as_str(),
                        format!("bytes */{file_size}"),
                    )],
                    Body::empty(),
                )
                    .into_response());
            }

            let length = end - start + 1;

            let mut file = tokio::fs::File::open(file_path)
                .await
                .map_err(|_| Error::not_found("File not found."))?;
            file.seek(std::io::SeekFrom::Start(start))
                .await
                .map_err(|e| Error::Internal(format!("Seek failed: {e}")))?;

            // Take limits reads to exactly `length` bytes.
            let limited = file.take(length);
            let stream = ReaderStream::with_capacity(limited, CHUNK_SIZE);
            let body = Body::from_stream(stream);

            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE.as_str(), content_type.to_string()),
                    (
                        header::CONTENT_RANGE.as_str(),
                        format!("bytes {start}-{end}/{file_size}"),
                    ),
                    (header::CONTENT_LENGTH.as_str(), length.to_string()),
                    (header::ACCEPT_RANGES.as_str(), "bytes".to_string()),
                ],
                body,
            )
                .into_response())
        }
        None => {
            let file = tokio::fs::File::open(file_path)
                .await
                .map_err(|_| Error::not_found("File not found."))?;

            let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);
            let body = Body::from_stream(stream);

            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE.as_str(), content_type.to_string()),
                    (header::CONTENT_LENGTH.as_str(), file_size.to_string()),
                    (header::ACCEPT_RANGES.as_str(), "bytes".to_string()),
                ],
                body,
            )
                .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_full() {
        let (start, end) = parse_range_header("bytes=0-999").unwrap();
        assert_eq!(start, 0);
        assert_eq!(end, Some(999));
    }

    #[test]
    fn parse_range_open_end() {
        let (start, end) = parse_range_header("bytes=500-").unwrap();
        assert_eq!(start, 500);
        assert_eq!(end, None);
    }

    #[test]
    fn parse_range_invalid() {
        assert!(parse_range_header("invalid").is_none());
        assert!(parse_range_header("bytes=abc-def").is_none());
    }

    #[test]
    fn hls_content_types() {
        assert_eq!(hls_content_type("master.m3u8"), "application/vnd.apple.mpegurl");
        assert_eq!(hls_content_type("720p.m3u8"), "application/vnd.apple.mpegurl");
        assert_eq!(hls_content_type("segment_000.ts"), "video/mp2t");
        assert_eq!(hls_content_type("key.bin"), "application/octet-stream");
        assert_eq!(hls_content_type("noextension"), "application/octet-stream");
    }

    #[test]
    fn media_content_types() {
        assert_eq!(media_content_type("lecture.mp4"), "video/mp4");
        assert_eq!(media_content_type("lecture.mkv"), "video/x-matroska");
        assert_eq!(media_content_type("lecture.webm"), "video/webm");
        assert_eq!(media_content_type("file.xyz"), "application/octet-stream");
    }

    #[tokio::test]
    async fn serve_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![7u8; 1024]).unwrap();

        let resp = serve_file_streaming(&path, None).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_LENGTH).unwrap(),
            "1024"
        );
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "video/mp4");
    }

    #[tokio::test]
    async fn serve_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![7u8; 2048]).unwrap();

        let resp = serve_file_streaming(&path, Some("bytes=100-199"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            resp.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 100-199/2048"
        );
        assert_eq!(resp.headers().get(header::CONTENT_LENGTH).unwrap(), "100");
    }

    #[tokio::test]
    async fn out_of_bounds_range_is_416() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![7u8; 100]).unwrap();

        let resp = serve_file_streaming(&path, Some("bytes=500-"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = serve_file_streaming(std::path::Path::new("/no/such/file.mp4"), None)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 404);
    }
}
