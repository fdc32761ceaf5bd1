//! Vision model abstraction
//!
//! A `VisionModel` accepts one image plus a text instruction and returns the
//! model's free-text reply. Providers implement this trait; the analysis
//! pipeline only ever talks to `Arc<dyn VisionModel>`.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Generation settings sent with every request.
///
/// The defaults keep sampling close to deterministic so that the reply format
/// stays stable across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Sampling temperature
    pub temperature: f32,
    /// Top-K sampling
    pub top_k: u32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Maximum tokens in the reply
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_k: 32,
            top_p: 1.0,
            max_output_tokens: 2048,
        }
    }
}

/// An image passed inline with the request (base64 payload, no data URL prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl InlineImage {
    /// Create a new inline image
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A single-turn vision request
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Instruction text
    pub prompt: String,
    /// Image to analyze
    pub image: InlineImage,
    /// Generation settings
    pub settings: GenerationSettings,
}

impl VisionRequest {
    /// Create a request with default generation settings
    #[must_use]
    pub fn new(prompt: impl Into<String>, image: InlineImage) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            settings: GenerationSettings::default(),
        }
    }

    /// Override the generation settings
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Reply from a vision model
#[derive(Debug, Clone, PartialEq)]
pub struct VisionResponse {
    /// Free-text reply
    pub text: String,
    /// Model that produced the reply
    pub model: String,
    /// Finish reason reported by the provider
    pub finish_reason: Option<String>,
}

/// Vision-language model provider trait
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model used for requests
    fn model(&self) -> &str;

    /// Send one image plus instruction and return the text reply
    async fn generate(&self, request: VisionRequest) -> Result<VisionResponse>;
}
