//! HTTP API for PlantGuard
//!
//! Provides:
//! - `POST /analyze-plant`: leaf image diagnosis
//! - `POST /validate-email`: disposable email domain check
//! - `GET /health`: liveness and configuration status
//!
//! The two POST endpoints are also mounted under `/functions/v1/` so existing
//! clients keep working. Every route answers CORS preflight requests.

pub mod analyze;
pub mod email;
pub mod error;
pub mod health;

use axum::http::{header, HeaderName, Method};
use axum::{Extension, Router};
use plantguard_core::{AnalysisService, EmailDomainChecker};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use analyze::analyze_routes;
pub use email::email_routes;
pub use error::ApiError;
pub use health::health_routes;

/// Shared, immutable state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
    pub email: Arc<EmailDomainChecker>,
    /// Cancelled on shutdown; in-flight analyses watch a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        service: AnalysisService,
        email: EmailDomainChecker,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service: Arc::new(service),
            email: Arc::new(email),
            shutdown,
        }
    }
}

/// CORS policy: any origin, the headers browser clients send
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Create the router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(analyze_routes())
        .merge(email_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
