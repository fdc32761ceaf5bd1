//! Error types for plantguard-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// API error (non-2xx response from the provider)
    #[error("api error: {0}")]
    Api(String),

    /// Server error (5xx from the provider)
    #[error("server error: {0}")]
    ServerError(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether the error was produced by the remote provider rejecting the call
    /// (as opposed to a transport or decoding failure on our side).
    #[must_use]
    pub fn is_upstream_rejection(&self) -> bool {
        matches!(self, Self::Api(_) | Self::ServerError(_) | Self::RateLimit)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
