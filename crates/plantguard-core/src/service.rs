//! Analysis service
//!
//! The proxy pipeline that sits between callers and the vision model. One
//! request runs through these stages:
//!
//! ```text
//! received -> validated -> model-called -> parsed -> responded
//! ```
//!
//! and leaves early with a typed [`Error`] when validation, configuration,
//! the upstream call or parsing fails. The service holds no mutable state and
//! is shared across requests behind an `Arc`.

use crate::diagnosis::AnalysisOutcome;
use crate::error::{Error, Result};
use crate::image::{split_data_url_prefix, DEFAULT_IMAGE_MIME};
use crate::prompt::ANALYSIS_PROMPT;
use plantguard_llm::{parse_embedded_json, GenerationSettings, InlineImage, VisionModel, VisionRequest};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Pipeline stage, logged as each one is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    /// Request accepted
    Received,
    /// Input checked and model configured
    Validated,
    /// Model replied
    ModelCalled,
    /// Reply parsed and checked against the schema
    Parsed,
    /// Result handed back
    Responded,
}

impl AnalysisStage {
    /// Stage name as it appears in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::ModelCalled => "model-called",
            Self::Parsed => "parsed",
            Self::Responded => "responded",
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default deadline for one model call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Proxy between analysis requests and the vision model
#[derive(Clone)]
pub struct AnalysisService {
    model: Option<Arc<dyn VisionModel>>,
    settings: GenerationSettings,
    timeout: Duration,
}

impl AnalysisService {
    /// Create a service. `None` means no API key was configured; every
    /// request then fails with [`Error::NotConfigured`].
    #[must_use]
    pub fn new(model: Option<Arc<dyn VisionModel>>) -> Self {
        Self {
            model,
            settings: GenerationSettings::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the generation settings
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the per-call deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a vision model is configured
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Configured model id, if any
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model())
    }

    /// Analyze `image_base64` (data URL or bare base64).
    ///
    /// On success returns the model's JSON object unmodified; it has already
    /// been checked against the analysis schema.
    pub async fn analyze(&self, image_base64: Option<&str>) -> Result<Value> {
        self.analyze_with_cancel(image_base64, CancellationToken::new())
            .await
    }

    /// Same as [`analyze`](Self::analyze), abandoning the model call when
    /// `cancel` fires
    pub async fn analyze_with_cancel(
        &self,
        image_base64: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Value> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analyze_plant", %request_id);
        self.run(image_base64, cancel).instrument(span).await
    }

    async fn run(&self, image_base64: Option<&str>, cancel: CancellationToken) -> Result<Value> {
        debug!(stage = %AnalysisStage::Received, "Analysis request");

        let image = match image_base64 {
            Some(s) if !s.is_empty() => s,
            _ => {
                info!("Rejected request without image data");
                return Err(Error::BadRequest("Image data is required".to_string()));
            }
        };

        let model = self.model.as_ref().ok_or_else(|| {
            error!("Vision model API key is not configured");
            Error::NotConfigured("Gemini API key not configured".to_string())
        })?;

        let (declared_mime, payload) = split_data_url_prefix(image);
        let mime_type = declared_mime.unwrap_or(DEFAULT_IMAGE_MIME);
        info!(
            stage = %AnalysisStage::Validated,
            mime_type = %mime_type,
            payload_len = payload.len(),
            "Calling vision model"
        );

        let request = VisionRequest::new(ANALYSIS_PROMPT, InlineImage::new(mime_type, payload))
            .with_settings(self.settings.clone());

        let reply = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Analysis cancelled before the model replied");
                return Err(Error::Cancelled);
            }
            reply = tokio::time::timeout(self.timeout, model.generate(request)) => reply,
        };

        let response = match reply {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                if e.is_upstream_rejection() {
                    error!(error = %e, "Vision model rejected the request");
                } else {
                    error!(error = %e, "Vision model call failed");
                }
                return Err(e.into());
            }
            Err(_) => {
                let ms = self.timeout.as_millis() as u64;
                error!(timeout_ms = ms, "Vision model call timed out");
                return Err(Error::Timeout(ms));
            }
        };
        debug!(
            stage = %AnalysisStage::ModelCalled,
            finish_reason = ?response.finish_reason,
            text_len = response.text.len(),
            "Model replied"
        );

        let value = parse_embedded_json(&response.text).map_err(|e| {
            warn!(error = %e, "Could not parse model reply");
            Error::Parse {
                reason: e.to_string(),
                details: response.text.clone(),
            }
        })?;

        let outcome = AnalysisOutcome::from_value(&value).map_err(|e| {
            warn!(error = %e, "Model reply failed schema validation");
            Error::Validation {
                reason: e.0,
                details: response.text.clone(),
            }
        })?;
        match outcome {
            AnalysisOutcome::Diagnosed(ref d) => info!(
                stage = %AnalysisStage::Parsed,
                plant = %d.plant_name,
                disease = %d.disease,
                severity = %d.severity,
                "Analysis complete"
            ),
            AnalysisOutcome::NotAPlant { .. } => {
                info!(stage = %AnalysisStage::Parsed, "Image is not a plant")
            }
        }

        debug!(stage = %AnalysisStage::Responded, "Returning analysis");
        Ok(value)
    }
}

#[cfg(test)]
mod tests;
