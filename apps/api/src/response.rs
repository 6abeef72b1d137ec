//! Success envelope.
//!
//! Every successful response has the shape
//! `{ "error": false, "status": "success", "message": ..., <payload fields> }`.
//! Payloads are plain structs whose fields are flattened into the envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub error: bool,
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload for responses that carry nothing but the message.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> Success<T> {
    pub fn new(message: impl Into<String>, payload: T) -> Self {
        Success {
            error: false,
            status: "success",
            message: message.into(),
            payload,
        }
    }

    /// Same envelope with a non-200 status (e.g. 201 for creates).
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

impl Success<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Success::new(message, Empty {})
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
