//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::response::Success;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Pong {
    pub database: &'static str,
}

/// GET /ping
///
/// 200 while the database answers, 503 otherwise. No branch header needed.
pub async fn ping(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Success<Pong>>) {
    if state.db.health_check().await {
        Success::new("pong", Pong { database: "ok" }).with_status(StatusCode::OK)
    } else {
        Success::new("pong", Pong { database: "unavailable" })
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
    }
}
