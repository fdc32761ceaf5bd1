//! Error sanitising for Gemini API responses
//!
//! Gemini reports failures as `{"error": {"code", "message", "status"}}` with
//! `status` a google.rpc code name. Callers get a fixed message per status;
//! the upstream message is only logged.

use crate::util::truncate_safe;

/// Longest upstream message passed on when the status is not recognised
const MAX_ERROR_LEN: usize = 300;

const AUTH_MESSAGE: &str =
    "Gemini authentication failed. Check the GEMINI_API_KEY configuration.";

/// Gemini answers a malformed key with INVALID_ARGUMENT, so the message is
/// checked as well as the status.
fn mentions_credentials(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["api key", "api_key", "apikey", "key=", "credential"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Map a Gemini error status and message to a caller-safe message
pub(crate) fn sanitize_api_error(status: Option<&str>, message: &str) -> String {
    if mentions_credentials(message) {
        return AUTH_MESSAGE.to_string();
    }

    let fixed = match status.unwrap_or_default() {
        "UNAUTHENTICATED" | "PERMISSION_DENIED" => AUTH_MESSAGE,
        "INVALID_ARGUMENT" => {
            "Gemini rejected the request. The image may be unsupported, corrupt or too large."
        }
        "RESOURCE_EXHAUSTED" => "Gemini quota exhausted. Please try again later.",
        "NOT_FOUND" => "The configured Gemini model was not found.",
        "FAILED_PRECONDITION" => "The Gemini API is not available for this project or region.",
        "INTERNAL" | "UNAVAILABLE" | "DEADLINE_EXCEEDED" => {
            "Gemini is temporarily unavailable. Please try again later."
        }
        _ if message.len() > MAX_ERROR_LEN => {
            return format!("{}...(truncated)", truncate_safe(message, MAX_ERROR_LEN));
        }
        _ => return message.to_string(),
    };
    fixed.to_string()
}
