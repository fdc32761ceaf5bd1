//! PlantGuard LLM - Vision Model Abstraction
//!
//! This crate provides the vision-language model integration for PlantGuard:
//! - Vision: `VisionModel` trait, request/response types and generation settings
//! - Gemini: Google Gemini `generateContent` provider (API key auth)
//! - Extract: recovery of the JSON object embedded in free-text model output
//! - Util: key masking and safe truncation for log output

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod gemini;
pub mod util;
pub mod vision;

pub use error::{Error, Result};
pub use extract::{extract_json_object, parse_embedded_json, ExtractError};
pub use gemini::{GeminiConfig, GeminiProvider, DEFAULT_MODEL, MODELS};
pub use vision::{GenerationSettings, InlineImage, VisionModel, VisionRequest, VisionResponse};
