//! Uniform JSON response envelope.
//!
//! Every JSON endpoint answers with `{status, message, data}`; the HTTP
//! status code carries the semantic category. File bodies from the
//! playlist/segment endpoints are the one exception, since native HLS
//! players expect the raw protocol.

use serde::Serialize;

/// Uniform success/failure JSON shape.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Successful response with a data payload.
    pub fn ok(message: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: serde_json::to_value(data).ok(),
        }
    }

    /// Successful response without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
        }
    }

    /// Failed response; `data` carries optional structured hints.
    pub fn failure(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data,
        }
    }
}
