//! Disposable email check endpoint

use super::{ApiError, AppState};
use axum::body::Bytes;
use axum::routing::post;
use axum::{Extension, Json, Router};
use plantguard_core::validate_email;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCheckResponse {
    pub is_temporary: bool,
}

/// Body: `{ "email": "..." }` → `{ "isTemporary": bool }`
async fn validate_email_domain(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<EmailCheckResponse>, ApiError> {
    let request: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected email check with invalid JSON");
        ApiError::invalid_json()
    })?;

    let email = validate_email(request.get("email").and_then(Value::as_str))?;
    Ok(Json(EmailCheckResponse {
        is_temporary: state.email.is_temporary(email),
    }))
}

pub fn email_routes() -> Router {
    Router::new()
        .route("/validate-email", post(validate_email_domain))
        .route("/functions/v1/validate-email", post(validate_email_domain))
}
