//! Error types for plantguard-core
//!
//! This module provides the error taxonomy of the analysis pipeline and
//! user-facing formatting for it.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Caller sent an incomplete or malformed request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Required configuration (e.g. the model API key) is missing
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The vision model call failed
    #[error("upstream error: {0}")]
    Upstream(#[source] plantguard_llm::Error),

    /// The vision model answered with an unexpected structure
    #[error("invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    /// No JSON object could be recovered from the model's reply
    #[error("failed to parse analysis result: {reason}")]
    Parse {
        /// Why parsing failed
        reason: String,
        /// Raw model text, kept for offline debugging
        details: String,
    },

    /// The recovered JSON does not match the analysis schema
    #[error("analysis result failed validation: {reason}")]
    Validation {
        /// Which rule was violated
        reason: String,
        /// Raw model text, kept for offline debugging
        details: String,
    },

    /// The image does not show a plant leaf
    #[error("not a plant: {0}")]
    NotAPlant(String),

    /// The analysis endpoint could not be reached or answered with an error
    #[error("analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// The analysis endpoint answered with an incomplete diagnosis
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    /// The supplied image could not be encoded or decoded
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The deadline elapsed before the analysis finished
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// The analysis was cancelled
    #[error("analysis cancelled")]
    Cancelled,

    /// Session transition not allowed from the current state
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// Current state name
        state: &'static str,
        /// Attempted action
        action: &'static str,
    },

    /// I/O error (reading image files)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<plantguard_llm::Error> for Error {
    fn from(err: plantguard_llm::Error) -> Self {
        match err {
            plantguard_llm::Error::NotConfigured(msg) => Self::NotConfigured(msg),
            plantguard_llm::Error::InvalidResponse(msg) => Self::InvalidUpstreamResponse(msg),
            plantguard_llm::Error::Timeout(ms) => Self::Timeout(ms),
            other => Self::Upstream(other),
        }
    }
}

impl Error {
    /// Whether the error was caused by the caller's input
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadRequest(_) | Self::InvalidImage(_))
    }

    /// Raw model text attached to parse/validation failures
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Parse { details, .. } | Self::Validation { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::BadRequest(msg) => msg.clone(),
            Error::NotAPlant(msg) => msg.clone(),
            Error::InvalidImage(msg) => format!("The image could not be read: {}", msg),
            Error::Timeout(_) => "The analysis took too long. Please try again.".to_string(),
            Error::Cancelled => "The analysis was cancelled.".to_string(),
            Error::InvalidTransition { state, action } => {
                format!("Cannot {} while {}.", action, state)
            }
            Error::Io(e) => format!("Could not read the file: {}", e),
            Error::NotConfigured(_)
            | Error::Upstream(_)
            | Error::InvalidUpstreamResponse(_)
            | Error::Parse { .. }
            | Error::Validation { .. }
            | Error::AnalysisUnavailable(_)
            | Error::MalformedResponse(_) => {
                "Plant analysis is currently unavailable. Please try again later.".to_string()
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::NotConfigured(_) => {
                Some("Set GEMINI_API_KEY in the server environment.".to_string())
            }
            Error::NotAPlant(_) => {
                Some("Upload a clear, well-lit photo of a single plant leaf.".to_string())
            }
            Error::InvalidImage(_) => Some("Use a JPG, PNG or WebP image.".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_mapping() {
        let err: Error = plantguard_llm::Error::NotConfigured("key".to_string()).into();
        assert!(matches!(err, Error::NotConfigured(_)));

        let err: Error = plantguard_llm::Error::InvalidResponse("x".to_string()).into();
        assert!(matches!(err, Error::InvalidUpstreamResponse(_)));

        let err: Error = plantguard_llm::Error::Timeout(1500).into();
        assert!(matches!(err, Error::Timeout(1500)));

        let err: Error = plantguard_llm::Error::RateLimit.into();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = Error::Parse {
            reason: "no JSON".to_string(),
            details: "raw model text".to_string(),
        };
        assert!(!err.user_message().contains("raw model text"));
        assert_eq!(err.details(), Some("raw model text"));
    }

    #[test]
    fn test_not_a_plant_message_passthrough() {
        let err = Error::NotAPlant("Please upload a leaf".to_string());
        assert_eq!(err.user_message(), "Please upload a leaf");
        assert!(err.suggestion().is_some());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            state: "analyzing",
            action: "upload",
        };
        assert_eq!(err.to_string(), "cannot upload while analyzing");
    }
}
