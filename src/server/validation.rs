//! Production configuration validation
//!
//! Security checks for production deployments.

use super::config::AppConfig;
use super::loader::environment_name;
use tracing::warn;

/// Warn about risky settings when running with `PLANTGUARD_ENV=production`
pub fn validate_production_config(config: &AppConfig, model_configured: bool) {
    if environment_name().to_lowercase() != "production" {
        return;
    }

    if config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    if !model_configured {
        warn!(
            "GEMINI_API_KEY is not set. Every analysis request will fail with \
             'Gemini API key not configured'."
        );
    }

    if config.analysis.timeout_secs > config.gemini.timeout_secs {
        warn!(
            analysis_timeout = config.analysis.timeout_secs,
            http_timeout = config.gemini.timeout_secs,
            "Analysis deadline is longer than the Gemini HTTP timeout"
        );
    }
}
