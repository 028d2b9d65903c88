use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::SecondsFormat;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::method_not_allowed;
use crate::models::api::HealthResponse;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(health).fallback(method_not_allowed))
}

/// GET /api/health - Liveness only; backends are not contacted.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: state.settings.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
