//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`lectern_core::Error`] (via the
//! [`AppError`] wrapper) so route handlers can return
//! `Result<T, AppError>` directly. Every error becomes the uniform
//! envelope; 5xx causes are logged and replaced with a stable,
//! non-leaking client message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::envelope::Envelope;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: lectern_core::Error,
}

impl AppError {
    pub fn new(inner: lectern_core::Error) -> Self {
        Self { inner }
    }
}

impl From<lectern_core::Error> for AppError {
    fn from(e: lectern_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let (message, data) = match &self.inner {
            lectern_core::Error::ContentUnavailable {
                message,
                fallback_url,
            } => (
                message.clone(),
                fallback_url
                    .as_ref()
                    .map(|url| json!({ "fallback_url": url })),
            ),
            lectern_core::Error::Database { .. }
            | lectern_core::Error::Io { .. }
            | lectern_core::Error::Internal(_) => ("Internal server error".to_string(), None),
            other => (other.to_string(), None),
        };

        (status, axum::Json(Envelope::failure(message, data))).into_response()
    }
}
