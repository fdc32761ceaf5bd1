//! Analysis client
//!
//! Calls the analysis endpoint with one encoded image and turns the reply into
//! a [`Diagnosis`]. The client either returns a complete diagnosis or a typed
//! error; it never hands out a partially-filled one.

use crate::diagnosis::{AnalysisOutcome, Diagnosis};
use crate::error::{Error, Result};
use crate::image::canonicalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Body of an analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Base64 image, usually a data URL
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
}

/// Transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be reached
    #[error("connection failed: {0}")]
    Connect(String),

    /// The endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The response body is not JSON
    #[error("undecodable response: {0}")]
    Decode(String),
}

/// Carries an [`AnalysisRequest`] to the analysis service
#[async_trait::async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Send the request and return the decoded JSON reply
    async fn invoke(&self, request: &AnalysisRequest) -> std::result::Result<Value, TransportError>;
}

/// HTTP transport posting JSON to the analysis endpoint
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::AnalysisUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Send `authorization: Bearer <key>` and `apikey: <key>` with every request
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl AnalysisTransport for HttpTransport {
    async fn invoke(&self, request: &AnalysisRequest) -> std::result::Result<Value, TransportError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder
                .header("authorization", format!("Bearer {}", key))
                .header("apikey", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Client for the analysis endpoint
#[derive(Clone)]
pub struct AnalysisClient {
    transport: Arc<dyn AnalysisTransport>,
    timeout: Option<Duration>,
}

impl AnalysisClient {
    /// Create a client over `transport` with no deadline
    #[must_use]
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Fail with [`Error::Timeout`] when the call takes longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Analyze an encoded image (data URL or bare base64)
    pub async fn analyze(&self, image: &str) -> Result<Diagnosis> {
        self.analyze_with_cancel(image, &CancellationToken::new())
            .await
    }

    /// Analyze an encoded image, giving up when `cancel` fires
    #[instrument(skip(self, image, cancel), fields(image_len = image.len()))]
    pub async fn analyze_with_cancel(
        &self,
        image: &str,
        cancel: &CancellationToken,
    ) -> Result<Diagnosis> {
        let request = AnalysisRequest {
            image_base64: canonicalize(image)?,
        };

        let call = self.transport.invoke(&request);
        let reply = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Analysis cancelled by caller");
                return Err(Error::Cancelled);
            }
            reply = with_deadline(self.timeout, call) => reply?,
        };

        let value = reply.map_err(|e| {
            warn!(error = %e, "Analysis transport failed");
            Error::AnalysisUnavailable(e.to_string())
        })?;

        match AnalysisOutcome::from_value(&value) {
            Ok(AnalysisOutcome::Diagnosed(diagnosis)) => {
                debug!(
                    plant = %diagnosis.plant_name,
                    disease = %diagnosis.disease,
                    severity = %diagnosis.severity,
                    "Diagnosis received"
                );
                Ok(diagnosis)
            }
            Ok(AnalysisOutcome::NotAPlant { message }) => {
                info!("Image rejected as not a plant");
                Err(Error::NotAPlant(message))
            }
            Err(e) => {
                warn!(error = %e, "Analysis response failed validation");
                Err(Error::MalformedResponse(e.0))
            }
        }
    }
}

async fn with_deadline<F, T>(timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: std::future::Future<Output = T>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit.as_millis() as u64)),
        None => Ok(fut.await),
    }
}
