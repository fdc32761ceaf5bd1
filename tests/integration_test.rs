//! Integration tests for PlantGuard
//!
//! These tests run the pipeline across crates:
//! - plantguard-llm: Gemini provider against an in-process HTTP stub
//! - plantguard-core: analysis service, analysis client, session, report

use axum::http::HeaderMap;
use axum::Json;
use mockall::mock;
use plantguard_core::{
    render_report, AnalysisClient, AnalysisRequest, AnalysisService, AnalysisSession,
    AnalysisTransport, Error, ImageEncoder, SessionState, Severity, TransportError,
};
use plantguard_llm::{GeminiConfig, GeminiProvider, VisionModel, VisionRequest, VisionResponse};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

const TOMATO_REPLY: &str = "```json\n{\"isPlant\": true, \"plantName\": \"Tomato\", \"disease\": \"Early Blight\", \"confidence\": 94, \"severity\": \"moderate\", \"description\": \"Dark concentric rings\", \"treatments\": [{\"type\": \"organic\", \"name\": \"Copper Soap\", \"description\": \"Copper formulation\", \"application\": \"Spray weekly\"}, {\"type\": \"chemical\", \"name\": \"Chlorothalonil\", \"description\": \"Protectant fungicide\", \"application\": \"Every 7-10 days\"}]}\n```";

// ============================================================================
// Helpers
// ============================================================================

/// Hands requests straight to an in-process analysis service
struct ServiceTransport(AnalysisService);

#[async_trait::async_trait]
impl AnalysisTransport for ServiceTransport {
    async fn invoke(&self, request: &AnalysisRequest) -> Result<Value, TransportError> {
        self.0
            .analyze(Some(&request.image_base64))
            .await
            .map_err(|e| TransportError::Status {
                status: 500,
                body: e.to_string(),
            })
    }
}

#[derive(Default)]
struct Captured {
    api_key: Option<String>,
    body: Option<Value>,
}

/// Start a stub `generateContent` endpoint that always replies with `text`
async fn spawn_gemini_stub(text: &'static str) -> (String, Arc<Mutex<Captured>>) {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let sink = captured.clone();

    let app = axum::Router::new().fallback(move |headers: HeaderMap, Json(body): Json<Value>| {
        let sink = sink.clone();
        async move {
            {
                let mut c = sink.lock().unwrap();
                c.api_key = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                c.body = Some(body);
            }
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }]
            }))
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), captured)
}

// ============================================================================
// End-to-end pipeline
// ============================================================================

#[tokio::test]
async fn test_gemini_stub_to_report() {
    let (base_url, captured) = spawn_gemini_stub(TOMATO_REPLY).await;
    let provider = GeminiProvider::new(
        GeminiConfig::new("integration-key").with_base_url(base_url),
    )
    .unwrap();
    let service = AnalysisService::new(Some(Arc::new(provider)));
    let client = AnalysisClient::new(Arc::new(ServiceTransport(service)));

    let image = ImageEncoder::new().encode_bytes(JPEG, None).unwrap();
    assert_eq!(image.mime_type, "image/jpeg");

    let mut session = AnalysisSession::new();
    session.upload(image.clone()).unwrap();
    let sending = session.begin_analysis().unwrap();
    let outcome = client.analyze(&sending.to_data_url()).await;
    let state = session.complete(outcome).unwrap();

    let diagnosis = match state {
        SessionState::ResultReady { diagnosis, .. } => diagnosis,
        other => panic!("expected a result, got {other:?}"),
    };
    assert_eq!(diagnosis.plant_name, "Tomato");
    assert_eq!(diagnosis.severity, Severity::Moderate);
    assert_eq!(diagnosis.treatments.len(), 2);

    let report = render_report(diagnosis);
    // Copper Soap resolves to the copper instructions
    assert!(report.contains("Every 14 days, maximum 4 applications per season"));
    assert!(report.contains("Important Note"));

    let captured = captured.lock().unwrap();
    assert_eq!(captured.api_key.as_deref(), Some("integration-key"));
    let body = captured.body.as_ref().unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[1]["inlineData"]["data"], image.data.as_str());
    assert_eq!(body["generationConfig"]["topK"], 32);
}

#[tokio::test]
async fn test_not_a_plant_resets_session() {
    let (base_url, _) =
        spawn_gemini_stub(r#"{"isPlant": false, "message": "Please upload a clear image of a plant leaf for disease analysis."}"#)
            .await;
    let provider = GeminiProvider::new(GeminiConfig::new("k").with_base_url(base_url)).unwrap();
    let client = AnalysisClient::new(Arc::new(ServiceTransport(AnalysisService::new(Some(
        Arc::new(provider),
    )))));

    let mut session = AnalysisSession::new();
    session
        .upload(ImageEncoder::new().encode_bytes(JPEG, None).unwrap())
        .unwrap();
    let image = session.begin_analysis().unwrap();
    let outcome = client.analyze(&image.to_data_url()).await;
    assert!(matches!(outcome, Err(Error::NotAPlant(_))));

    let state = session.complete(outcome).unwrap();
    match state {
        SessionState::Idle { notice: Some(n) } => assert!(n.starts_with("Please upload")),
        other => panic!("expected Idle with notice, got {other:?}"),
    }
}

// ============================================================================
// Mocked model
// ============================================================================

mock! {
    Model {}

    #[async_trait::async_trait]
    impl VisionModel for Model {
        fn name(&self) -> &str;
        fn model(&self) -> &str;
        async fn generate(&self, request: VisionRequest) -> plantguard_llm::Result<VisionResponse>;
    }
}

#[tokio::test]
async fn test_unconfigured_service_surfaces_as_unavailable() {
    let client = AnalysisClient::new(Arc::new(ServiceTransport(AnalysisService::new(None))));
    let err = assert_err!(client.analyze("data:image/jpeg;base64,/9j/4AAQ").await);
    assert!(matches!(err, Error::AnalysisUnavailable(ref m) if m.contains("not configured")));
}

#[tokio::test]
async fn test_repeated_analysis_is_stable() {
    let mut model = MockModel::new();
    model.expect_generate().times(2).returning(|_| {
        Ok(VisionResponse {
            text: TOMATO_REPLY.to_string(),
            model: "mock".to_string(),
            finish_reason: None,
        })
    });
    let client = AnalysisClient::new(Arc::new(ServiceTransport(AnalysisService::new(Some(
        Arc::new(model),
    )))));

    let first = assert_ok!(client.analyze("/9j/4AAQ").await);
    let second = assert_ok!(client.analyze("/9j/4AAQ").await);
    assert_eq!(first, second);
}
