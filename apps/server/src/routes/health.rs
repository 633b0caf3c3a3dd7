//! # Health Check

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// 200 when the database answers, 503 otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let database = state.db.health_check().await;

    if database {
        (StatusCode::OK, Json(HealthStatus { status: "ok", database }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable",
                database,
            }),
        )
    }
}
