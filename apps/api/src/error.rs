//! API error types with HTTP response mapping.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────────────────┬──────────────────────────────┐
//! │ Error                                    │ Status                       │
//! ├──────────────────────────────────────────┼──────────────────────────────┤
//! │ ValidationError, DeliveryExceeds*,       │ 400 Bad Request              │
//! │ InvalidReportType, ForeignKeyViolation   │                              │
//! │ DuplicateMemo, UniqueViolation,          │ 409 Conflict                 │
//! │ OrderNotPending, OrderClosed,            │                              │
//! │ SaleReturned, InUse                      │                              │
//! │ NotFound                                 │ 404 Not Found                │
//! │ anything else                            │ 500, details only logged     │
//! └──────────────────────────────────────────┴──────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use branchbook_core::{CoreError, ValidationError};
use branchbook_db::DbError;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// JSON body of a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub status: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: true,
            status: "error",
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_)
        | CoreError::DeliveryExceedsDue { .. }
        | CoreError::DeliveryExceedsItems { .. }
        | CoreError::InvalidReportType(_) => StatusCode::BAD_REQUEST,
        CoreError::DuplicateMemo
        | CoreError::InUse { .. }
        | CoreError::OrderNotPending { .. }
        | CoreError::OrderClosed { .. }
        | CoreError::SaleReturned { .. } => StatusCode::CONFLICT,
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        tracing::warn!(error = %err, "request rejected");
        ApiError::new(core_status(&err), err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                tracing::warn!(error = %err, "request references a missing row");
                ApiError::bad_request("Referenced record does not exist")
            }
            other => {
                tracing::error!(error = %other, "internal server error");
                ApiError::internal()
            }
        }
    }
}
