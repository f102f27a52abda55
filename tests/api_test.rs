use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use skald::application::ports::{TranscriptionEngine, TranscriptionError};
use skald::domain::AudioClip;
use skald::presentation::{
    create_router, AppState, ServerSettings, Settings, TranscriptionSettings, UploadSettings,
};

struct FixedTranscriptEngine {
    transcript: String,
    called: Arc<AtomicBool>,
}

#[async_trait]
impl TranscriptionEngine for FixedTranscriptEngine {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String, TranscriptionError> {
        self.called.store(true, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

struct FailingEngine {
    message: String,
    called: Arc<AtomicBool>,
}

#[async_trait]
impl TranscriptionEngine for FailingEngine {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String, TranscriptionError> {
        self.called.store(true, Ordering::SeqCst);
        Err(TranscriptionError::TranscriptionFailed(self.message.clone()))
    }
}

fn test_settings(max_upload_mb: usize) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        transcription: TranscriptionSettings {
            api_key: "test-key".to_string(),
            base_url: "http://localhost".to_string(),
            model: "whisper-large-v3".to_string(),
            language: "en".to_string(),
        },
        upload: UploadSettings { max_upload_mb },
    }
}

fn test_router<E: TranscriptionEngine + 'static>(engine: E, max_upload_mb: usize) -> axum::Router {
    create_router(AppState {
        engine: Arc::new(engine),
        settings: test_settings(max_upload_mb),
    })
}

const BOUNDARY: &str = "------------------------testboundary";

fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn given_an_audio_field_when_transcribing_then_returns_transcript_json() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "hello world".to_string(),
            called: Arc::clone(&called),
        },
        20,
    );

    let body = multipart_body("audio", "clip.wav", "audio/wav", b"fake wav bytes");
    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "hello world");
    assert!(json.get("error").is_none());
    assert!(called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_an_empty_transcript_when_transcribing_then_empty_text_is_not_an_error() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FixedTranscriptEngine {
            transcript: String::new(),
            called,
        },
        20,
    );

    let body = multipart_body("audio", "silence.wav", "audio/wav", b"silent bytes");
    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn given_no_audio_field_when_transcribing_then_400_and_engine_never_invoked() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "unused".to_string(),
            called: Arc::clone(&called),
        },
        20,
    );

    let body = multipart_body("file", "clip.wav", "audio/wav", b"wrong field name");
    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "No file uploaded");
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_an_empty_multipart_body_when_transcribing_then_400_and_engine_never_invoked() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "unused".to_string(),
            called: Arc::clone(&called),
        },
        20,
    );

    let body = format!("--{}--\r\n", BOUNDARY).into_bytes();
    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "No file uploaded");
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_extra_fields_when_transcribing_then_the_audio_field_is_still_found() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "found it".to_string(),
            called,
        },
        20,
    );

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n");
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"audio\"; filename=\"clip.mp3\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: audio/mpeg\r\n\r\nmp3 bytes\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "found it");
}

#[tokio::test]
async fn given_a_failing_engine_when_transcribing_then_500_with_derived_message() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FailingEngine {
            message: "Invalid API key".to_string(),
            called: Arc::clone(&called),
        },
        20,
    );

    let body = multipart_body("audio", "clip.wav", "audio/wav", b"fake wav bytes");
    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("Invalid API key"));
    assert!(json.get("text").is_none());
    assert!(called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_a_body_over_the_cap_when_transcribing_then_rejected_before_the_handler() {
    let called = Arc::new(AtomicBool::new(false));
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "unused".to_string(),
            called: Arc::clone(&called),
        },
        1,
    );

    let oversized = vec![0u8; 2 * 1024 * 1024];
    let body = multipart_body("audio", "big.wav", "audio/wav", &oversized);
    let response = router.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_a_running_service_when_probing_health_then_reports_healthy() {
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "unused".to_string(),
            called: Arc::new(AtomicBool::new(false)),
        },
        20,
    );

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn given_any_request_when_handled_then_a_request_id_is_echoed() {
    let router = test_router(
        FixedTranscriptEngine {
            transcript: "unused".to_string(),
            called: Arc::new(AtomicBool::new(false)),
        },
        20,
    );

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header("x-request-id", "test-correlation-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "test-correlation-id"
    );
}
