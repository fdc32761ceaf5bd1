//! Plant analysis endpoint

use super::{ApiError, AppState};
use axum::body::Bytes;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::Value;
use tracing::{error, warn};

/// Analyze a leaf image.
///
/// Body: `{ "imageBase64": "<data URL or bare base64>" }`. On success the
/// model's JSON object is returned as-is.
async fn analyze_plant(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected analysis request with invalid JSON");
        ApiError::invalid_json()
    })?;
    let image = request.get("imageBase64").and_then(Value::as_str);

    match state
        .service
        .analyze_with_cancel(image, state.shutdown.child_token())
        .await
    {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            if !e.is_client_error() {
                error!(error = %e, "Analysis request failed");
            }
            Err(e.into())
        }
    }
}

pub fn analyze_routes() -> Router {
    Router::new()
        .route("/analyze-plant", post(analyze_plant))
        .route("/functions/v1/analyze-plant", post(analyze_plant))
}
