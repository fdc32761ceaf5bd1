//! `plantguard analyze`: one-shot diagnosis of a local image

use crate::api::ApiError;
use crate::server::{build_service, AppConfig};
use anyhow::{bail, Context, Result};
use plantguard_core::{
    render_report, shutdown_signal, AnalysisClient, AnalysisRequest, AnalysisService,
    AnalysisSession, AnalysisTransport, HttpTransport, ImageEncoder, SessionState,
    TransportError,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs the analysis pipeline in-process instead of over HTTP
struct LocalTransport {
    service: AnalysisService,
}

#[async_trait::async_trait]
impl AnalysisTransport for LocalTransport {
    async fn invoke(&self, request: &AnalysisRequest) -> std::result::Result<Value, TransportError> {
        self.service
            .analyze(Some(&request.image_base64))
            .await
            .map_err(|e| {
                let api = ApiError::from(e);
                TransportError::Status {
                    status: api.status.as_u16(),
                    body: api.error,
                }
            })
    }
}

pub async fn run(path: &Path, endpoint: Option<String>, config: &AppConfig) -> Result<()> {
    let encoder = match config.analysis.max_image_bytes {
        0 => ImageEncoder::new(),
        max => ImageEncoder::new().with_max_bytes(max),
    };
    let encoded = encoder
        .encode_file(path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let transport: Arc<dyn AnalysisTransport> = match endpoint {
        Some(url) => {
            debug!(endpoint = %url, "Using remote analysis endpoint");
            let mut transport = HttpTransport::new(url)?;
            if let Ok(key) = std::env::var("PLANTGUARD_ENDPOINT_KEY") {
                transport = transport.with_api_key(key);
            }
            Arc::new(transport)
        }
        None => Arc::new(LocalTransport {
            service: build_service(config),
        }),
    };
    let client = AnalysisClient::new(transport).with_timeout(config.analysis.timeout());

    let mut session = AnalysisSession::new();
    session.upload(encoded)?;
    let image = session.begin_analysis()?;

    println!("🔬 Analyzing {}...\n", path.display());
    let cancel = CancellationToken::new();
    let signal = tokio::spawn(shutdown_signal(cancel.clone()));
    let outcome = client.analyze_with_cancel(&image.to_data_url(), &cancel).await;
    signal.abort();

    match session.complete(outcome)? {
        SessionState::ResultReady { diagnosis, .. } => {
            print!("{}", render_report(diagnosis));
            Ok(())
        }
        SessionState::Idle {
            notice: Some(notice),
        } => {
            println!("🌿 {}", notice);
            Ok(())
        }
        SessionState::Failed { message, .. } => bail!("{}", message),
        other => bail!("Unexpected session state: {}", other.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantguard_llm::{VisionModel, VisionRequest, VisionResponse};

    struct CannedModel;

    #[async_trait::async_trait]
    impl VisionModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned"
        }

        async fn generate(
            &self,
            _request: VisionRequest,
        ) -> plantguard_llm::Result<VisionResponse> {
            Ok(VisionResponse {
                text: r#"{"isPlant": false, "message": "X"}"#.to_string(),
                model: "canned".to_string(),
                finish_reason: None,
            })
        }
    }

    #[tokio::test]
    async fn test_local_transport_passes_reply_through() {
        let transport = LocalTransport {
            service: AnalysisService::new(Some(Arc::new(CannedModel))),
        };
        let reply = transport
            .invoke(&AnalysisRequest {
                image_base64: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reply["message"], "X");
    }

    #[tokio::test]
    async fn test_local_transport_maps_errors_to_status() {
        let transport = LocalTransport {
            service: AnalysisService::new(None),
        };
        let err = transport
            .invoke(&AnalysisRequest {
                image_base64: "abc".to_string(),
            })
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Gemini API key not configured");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
