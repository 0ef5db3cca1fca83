//! Unified error type for the lectern application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`]. Expected negative outcomes (missing entitlement,
//! expired token) are ordinary return values at the call sites, not errors;
//! this type is for conditions that map to an HTTP failure response.

/// Unified error type covering all failure modes in lectern.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{0}")]
    NotFound(String),

    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller lacks permission for the requested action.
    #[error("{0}")]
    Forbidden(String),

    /// Request data failed validation.
    #[error("{0}")]
    Validation(String),

    /// The content exists but cannot be served in its current state
    /// (video not yet transcoded, transcode failed, etc.).
    #[error("{message}")]
    ContentUnavailable {
        /// Human-readable explanation of why the content is unavailable.
        message: String,
        /// Direct-download URL the client may fall back to, when the
        /// underlying asset is a plain file.
        fallback_url: Option<String>,
    },

    /// A conflicting resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,
            Error::Validation(_) => 400,
            Error::ContentUnavailable { .. } => 422,
            Error::Conflict(_) => 409,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::ContentUnavailable`] without a
    /// fallback URL.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Error::ContentUnavailable {
            message: message.into(),
            fallback_url: None,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("Video not found or not available");
        assert_eq!(err.to_string(), "Video not found or not available");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn unauthorized_display() {
        let err = Error::Unauthorized("Authentication required".into());
        assert_eq!(err.to_string(), "Authentication required");
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn forbidden_display() {
        let err = Error::Forbidden("Subscription required.".into());
        assert_eq!(err.to_string(), "Subscription required.");
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("Invalid lecture ID".into());
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn content_unavailable_carries_fallback() {
        let err = Error::ContentUnavailable {
            message: "Streaming is temporarily unavailable for this video.".into(),
            fallback_url: Some("http://localhost/api/stream/abc/direct".into()),
        };
        assert_eq!(err.http_status(), 422);
        assert_eq!(
            err.to_string(),
            "Streaming is temporarily unavailable for this video."
        );
    }

    #[test]
    fn database_display() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);

        fn err_fn() -> Result<i32> {
            Err(Error::Internal("boom".into()))
        }
        assert!(err_fn().is_err());
    }
}
