use crate::model::{HealthResponse, HealthStatus, PingResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use jiff::Timestamp;
use tracing::warn;

/// Reports `200` while the store answers and `503` once it does not.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.shortener().check_store().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::new(HealthStatus::Up))),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new(HealthStatus::Down)),
            )
        }
    }
}

pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        service: env!("CARGO_PKG_NAME"),
        timestamp: Timestamp::now(),
    })
}
