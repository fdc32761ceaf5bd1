//! JSON recovery from free-text model output
//!
//! Models asked for JSON frequently wrap it in prose or code fences. The
//! extraction here is greedy: it spans from the first `{` to the last `}` in
//! the text. A reply carrying two separate objects, or stray braces in the
//! surrounding narration, therefore fails to parse rather than silently
//! yielding the wrong object.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref JSON_OBJECT: Regex =
        Regex::new(r"\{[\s\S]*\}").expect("JSON_OBJECT is a compile-time constant");
}

/// Failure to recover a JSON object from model output
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No `{...}` span in the text
    #[error("no JSON found in response")]
    NoJson,

    /// A span was found but is not valid JSON
    #[error("invalid JSON in response: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Return the greedy `{...}` span of `text`, if any.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

/// Extract and parse the JSON object embedded in `text`.
pub fn parse_embedded_json(text: &str) -> Result<Value, ExtractError> {
    let span = extract_json_object(text).ok_or(ExtractError::NoJson)?;
    Ok(serde_json::from_str(span)?)
}
