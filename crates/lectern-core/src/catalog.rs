//! Catalog-domain enums for lecture transcode state and asset kind.
//!
//! All enums serialize in lowercase and implement `Display` manually for a
//! consistent string representation in the database and API responses.
//! Parsing from database text uses `parse` with an explicit catch-all arm so
//! that a status value added by a newer writer can never be mistaken for a
//! servable state by an older reader.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// HlsStatus
// ---------------------------------------------------------------------------

/// Transcode state of a lecture's HLS artifact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HlsStatus {
    /// No HLS processing has been requested for this lecture.
    None,
    /// Queued for transcoding.
    Pending,
    /// Transcode currently running.
    Processing,
    /// Manifest and segments exist on disk and may be served.
    Ready,
    /// Transcode failed; see the lecture's error text.
    Failed,
}

impl HlsStatus {
    /// Parse a database string. Unknown values collapse to [`HlsStatus::None`]
    /// so they are never treated as servable.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            "none" => Self::None,
            _ => Self::None,
        }
    }
}

impl fmt::Display for HlsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// LectureKind
// ---------------------------------------------------------------------------

/// Kind of asset backing a lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LectureKind {
    /// An uploaded media file on local storage.
    File,
    /// An embed/external link; no local file exists.
    ExternalUrl,
}

impl LectureKind {
    /// Parse a database string. Unknown kinds collapse to
    /// [`LectureKind::ExternalUrl`], which never qualifies for the
    /// direct-file fallback.
    pub fn parse(s: &str) -> Self {
        match s {
            "file" => Self::File,
            "external_url" => Self::ExternalUrl,
            _ => Self::ExternalUrl,
        }
    }
}

impl fmt::Display for LectureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::ExternalUrl => write!(f, "external_url"),
        }
    }
}
