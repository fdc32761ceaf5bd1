//! API error responses
//!
//! Every failure is returned as `{ "error": ..., "details"?: ... }`. Upstream
//! failures are reported generically; their detail only goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plantguard_core::Error;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// An error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            details: None,
        }
    }

    pub fn invalid_json() -> Self {
        Self::bad_request("Invalid JSON body")
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::BadRequest(msg) => Self::bad_request(msg),
            Error::InvalidImage(msg) => Self::bad_request(msg),
            Error::NotConfigured(msg) => Self::internal(msg),
            Error::Upstream(_) | Error::Timeout(_) | Error::Cancelled => {
                Self::internal("Failed to analyze image")
            }
            Error::InvalidUpstreamResponse(_) => Self::internal("Invalid response from Gemini API"),
            Error::Parse { details, .. } => {
                Self::internal("Failed to parse analysis result").with_details(details)
            }
            Error::Validation { details, .. } => {
                Self::internal("Analysis result failed validation").with_details(details)
            }
            Error::NotAPlant(_)
            | Error::AnalysisUnavailable(_)
            | Error::MalformedResponse(_)
            | Error::InvalidTransition { .. }
            | Error::Io(_) => Self::internal("Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
