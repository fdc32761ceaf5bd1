use super::*;
use mockall::mock;
use plantguard_llm::VisionResponse;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

mock! {
    Model {}

    #[async_trait::async_trait]
    impl VisionModel for Model {
        fn name(&self) -> &str;
        fn model(&self) -> &str;
        async fn generate(&self, request: VisionRequest) -> plantguard_llm::Result<VisionResponse>;
    }
}

fn reply(text: &str) -> VisionResponse {
    VisionResponse {
        text: text.to_string(),
        model: "stub".to_string(),
        finish_reason: Some("STOP".to_string()),
    }
}

fn service_replying(text: &'static str) -> AnalysisService {
    let mut model = MockModel::new();
    model
        .expect_generate()
        .returning(move |_| Ok(reply(text)));
    AnalysisService::new(Some(Arc::new(model)))
}

const DIAGNOSIS: &str = r#"{"isPlant": true, "plantName": "Tomato", "disease": "Early Blight", "confidence": 94, "severity": "moderate", "description": "Concentric rings", "treatments": [{"type": "organic", "name": "Neem Oil Spray", "description": "d", "application": "a"}]}"#;

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let mut model = MockModel::new();
    model.expect_generate().times(0);
    let service = AnalysisService::new(Some(Arc::new(model)));

    for input in [None, Some("")] {
        let err = assert_err!(service.analyze(input).await);
        assert!(matches!(err, Error::BadRequest(ref m) if m == "Image data is required"));
    }
}

#[tokio::test]
async fn test_missing_image_checked_before_configuration() {
    let service = AnalysisService::new(None);
    let err = assert_err!(service.analyze(None).await);
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn test_unconfigured_model() {
    let service = AnalysisService::new(None);
    assert!(!service.is_configured());
    let err = assert_err!(service.analyze(Some("abc")).await);
    assert!(matches!(err, Error::NotConfigured(ref m) if m == "Gemini API key not configured"));
}

#[tokio::test]
async fn test_prose_wrapped_json_is_extracted() {
    let service = service_replying(
        "Sure, here is the diagnosis:\n```json\n{\"isPlant\": false, \"message\": \"Please upload a leaf.\"}\n```\nHope this helps.",
    );
    let value = assert_ok!(service.analyze(Some("abc")).await);
    assert_eq!(value, json!({"isPlant": false, "message": "Please upload a leaf."}));
}

#[tokio::test]
async fn test_success_returns_object_unmodified() {
    let service = service_replying(DIAGNOSIS);
    let value = assert_ok!(service.analyze(Some("data:image/jpeg;base64,abc")).await);
    let expected: Value = serde_json::from_str(DIAGNOSIS).unwrap();
    assert_eq!(value, expected);
}

#[tokio::test]
async fn test_deterministic_model_is_idempotent() {
    let service = service_replying(DIAGNOSIS);
    let first = service.analyze(Some("abc")).await.unwrap();
    let second = service.analyze(Some("abc")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_request_strips_prefix_and_keeps_mime() {
    let mut model = MockModel::new();
    model
        .expect_generate()
        .withf(|req| {
            req.image.data == "iVBORw0KGgo="
                && req.image.mime_type == "image/png"
                && req.prompt == ANALYSIS_PROMPT
                && req.settings == GenerationSettings::default()
        })
        .times(1)
        .returning(|_| Ok(reply(DIAGNOSIS)));

    let service = AnalysisService::new(Some(Arc::new(model)));
    assert_ok!(
        service
            .analyze(Some("data:image/png;base64,iVBORw0KGgo="))
            .await
    );
}

#[tokio::test]
async fn test_bare_base64_defaults_to_jpeg() {
    let mut model = MockModel::new();
    model
        .expect_generate()
        .withf(|req| req.image.mime_type == "image/jpeg" && req.image.data == "/9j/4AAQ")
        .times(1)
        .returning(|_| Ok(reply(DIAGNOSIS)));

    let service = AnalysisService::new(Some(Arc::new(model)));
    assert_ok!(service.analyze(Some("/9j/4AAQ")).await);
}

#[tokio::test]
async fn test_unrecognised_prefix_sent_unchanged_as_jpeg() {
    for input in [
        "data:image/svg+xml;base64,PHN2Zz4=",
        "data:image/jpeg;name=a.jpg;base64,/9j/4AAQ",
    ] {
        let mut model = MockModel::new();
        model
            .expect_generate()
            .withf(move |req| req.image.mime_type == "image/jpeg" && req.image.data == input)
            .times(1)
            .returning(|_| Ok(reply(DIAGNOSIS)));

        let service = AnalysisService::new(Some(Arc::new(model)));
        assert_ok!(service.analyze(Some(input)).await);
    }
}

#[tokio::test]
async fn test_custom_settings_forwarded() {
    let settings = GenerationSettings {
        temperature: 0.4,
        top_k: 16,
        top_p: 0.9,
        max_output_tokens: 1024,
    };
    let expected = settings.clone();

    let mut model = MockModel::new();
    model
        .expect_generate()
        .withf(move |req| req.settings == expected)
        .times(1)
        .returning(|_| Ok(reply(DIAGNOSIS)));

    let service = AnalysisService::new(Some(Arc::new(model))).with_settings(settings);
    assert_ok!(service.analyze(Some("abc")).await);
}

#[tokio::test]
async fn test_no_json_is_parse_error_with_raw_text() {
    let service = service_replying("I cannot help with that.");
    let err = assert_err!(service.analyze(Some("abc")).await);
    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(err.details(), Some("I cannot help with that."));
}

#[tokio::test]
async fn test_two_objects_fail_to_parse() {
    let service = service_replying(r#"{"isPlant": false, "message": "a"} and {"isPlant": false}"#);
    let err = assert_err!(service.analyze(Some("abc")).await);
    assert!(matches!(err, Error::Parse { .. }));
}

#[tokio::test]
async fn test_schema_violation_is_validation_error() {
    let service = service_replying(
        r#"{"isPlant": true, "plantName": "Tomato", "disease": "Blight", "confidence": 140, "severity": "moderate"}"#,
    );
    let err = assert_err!(service.analyze(Some("abc")).await);
    match err {
        Error::Validation { ref reason, ref details } => {
            assert!(reason.contains("confidence"));
            assert!(details.contains("Tomato"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_failure_maps_to_upstream() {
    let mut model = MockModel::new();
    model
        .expect_generate()
        .returning(|_| Err(plantguard_llm::Error::ServerError("503".to_string())));

    let service = AnalysisService::new(Some(Arc::new(model)));
    let err = assert_err!(service.analyze(Some("abc")).await);
    assert!(matches!(err, Error::Upstream(_)));
}

#[tokio::test]
async fn test_invalid_candidates_map_to_invalid_upstream_response() {
    let mut model = MockModel::new();
    model
        .expect_generate()
        .returning(|_| Err(plantguard_llm::Error::InvalidResponse("no candidates".to_string())));

    let service = AnalysisService::new(Some(Arc::new(model)));
    let err = assert_err!(service.analyze(Some("abc")).await);
    assert!(matches!(err, Error::InvalidUpstreamResponse(_)));
}

struct SlowModel;

#[async_trait::async_trait]
impl VisionModel for SlowModel {
    fn name(&self) -> &str {
        "slow"
    }

    fn model(&self) -> &str {
        "slow-1"
    }

    async fn generate(&self, _request: VisionRequest) -> plantguard_llm::Result<VisionResponse> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(reply("{}"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_elapses() {
    let service =
        AnalysisService::new(Some(Arc::new(SlowModel))).with_timeout(Duration::from_secs(2));
    let err = assert_err!(service.analyze(Some("abc")).await);
    assert!(matches!(err, Error::Timeout(2000)));
}

#[tokio::test]
async fn test_cancelled_call() {
    let service = AnalysisService::new(Some(Arc::new(SlowModel)));
    let token = CancellationToken::new();
    token.cancel();
    let err = assert_err!(service.analyze_with_cancel(Some("abc"), token).await);
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn test_model_name() {
    let service = AnalysisService::new(Some(Arc::new(SlowModel)));
    assert_eq!(service.model_name(), Some("slow-1"));
    assert_eq!(AnalysisService::new(None).model_name(), None);
}

#[test]
fn test_stage_names() {
    assert_eq!(AnalysisStage::ModelCalled.to_string(), "model-called");
    assert_eq!(AnalysisStage::Responded.as_str(), "responded");
}
