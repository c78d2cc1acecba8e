use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Common part of every JSON response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub status: String,
    pub message: String,
}

impl Envelope {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_u16(),
            status: code.canonical_reason().unwrap_or_default().to_string(),
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }
}
