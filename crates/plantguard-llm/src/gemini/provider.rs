//! Gemini provider implementation

use super::config::GeminiConfig;
use super::security::sanitize_api_error;
use super::types::*;
use crate::error::{Error, Result};
use crate::util::truncate_safe;
use crate::vision::{VisionModel, VisionRequest, VisionResponse};
use reqwest::Client;
use tracing::{debug, error, instrument, warn};

/// Upper bound on how much of an upstream error body goes into the log
const MAX_LOGGED_BODY: usize = 4096;

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    pub(crate) config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// Get the provider configuration
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Single attempt to send request to Gemini API. There is no retry: every
    /// failure is terminal for the request.
    pub(crate) async fn send_request(
        &self,
        model: &str,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse> {
        // SECURITY: the key travels in a header, never in the URL
        debug!("Sending request to Gemini model: {}", model);

        let response = self
            .client
            .post(self.config.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            // Raw body is for operators only; callers get a sanitized message
            error!(
                status = %status,
                body = %truncate_safe(&body, MAX_LOGGED_BODY),
                "Gemini API error"
            );

            let detail = match serde_json::from_str::<GeminiError>(&body) {
                Ok(GeminiError { error: e }) => format!(
                    "{} {}: {}",
                    e.code,
                    e.status,
                    sanitize_api_error(Some(&e.status), &e.message)
                ),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };

            if status.as_u16() == 429 {
                return Err(Error::RateLimit);
            }
            if status.is_server_error() {
                return Err(Error::ServerError(detail));
            }
            return Err(Error::Api(detail));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Gemini response is not valid JSON");
            Error::InvalidResponse(format!(
                "{}: {}",
                e,
                truncate_safe(&body, MAX_LOGGED_BODY)
            ))
        })
    }

    pub(crate) fn build_request(request: &VisionRequest) -> GeminiRequest {
        let settings = &request.settings;
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart::Text {
                        text: request.prompt.clone(),
                    },
                    GeminiPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: settings.temperature,
                top_k: settings.top_k,
                top_p: settings.top_p,
                max_output_tokens: settings.max_output_tokens,
            }),
        }
    }
}

#[async_trait::async_trait]
impl VisionModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(
        skip(self, request),
        fields(
            model = %self.config.default_model,
            mime_type = %request.image.mime_type,
            image_len = request.image.data.len()
        )
    )]
    async fn generate(&self, request: VisionRequest) -> Result<VisionResponse> {
        let model = self.config.default_model.clone();
        let gemini_request = Self::build_request(&request);
        let response = self.send_request(&model, &gemini_request).await?;

        let (text, finish_reason) = response.first_text().ok_or_else(|| {
            warn!(
                candidates = response.candidates.len(),
                "Gemini response has no candidate text"
            );
            Error::InvalidResponse("missing candidate content".to_string())
        })?;

        debug!(
            reply_len = text.len(),
            finish_reason = finish_reason.unwrap_or("unknown"),
            "Gemini reply received"
        );

        Ok(VisionResponse {
            text: text.to_string(),
            model,
            finish_reason: finish_reason.map(str::to_string),
        })
    }
}
