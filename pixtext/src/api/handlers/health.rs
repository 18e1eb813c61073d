use axum::extract::State;
use axum::Json;

use crate::api::dto::{HealthResponse, IndexResponse};
use crate::api::AppState;
use crate::ocr::EngineState;

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "OCR API Running".to_string(),
        status: "active".to_string(),
        engine: state.engine.name().to_string(),
    })
}

/// `GET /health`
///
/// Never triggers engine construction; a failed engine reports `degraded`
/// while the service itself stays up.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.engine.state() {
        EngineState::Failed(_) => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.engine.status(),
    })
}
