//! Health check endpoint

use super::AppState;
use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a vision model API key is configured
    pub model_configured: bool,
    /// Vision model id, when configured
    pub model: Option<String>,
}

async fn health(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_configured: state.service.is_configured(),
        model: state.service.model_name().map(str::to_string),
    })
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}
