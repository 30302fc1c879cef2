//! End-to-end submission tests
//! Runs the controller against the mock service and against a local axum
//! server to check the multipart wire format and error handling.
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use std::sync::Arc;
use submission::*;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn video() -> MediaFile {
    MediaFile::new("clip.mp4", "video/mp4", b"fake mp4 payload".to_vec())
}

fn image(name: &str) -> MediaFile {
    MediaFile::new(name, "image/png", format!("png:{}", name).into_bytes())
}

fn ready_controller() -> SubmissionController {
    let mut controller = SubmissionController::new();
    controller.set_video(video());
    controller.set_prompt("Create a motivational video about John");
    controller
}

// ---- stub processing server ----

/// One multipart field as the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Received {
    requests: usize,
    content_type: Option<String>,
    authorization: bool,
    parts: Vec<ReceivedPart>,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    received: Arc<Mutex<Received>>,
}

struct StubServer {
    base_url: String,
    received: Arc<Mutex<Received>>,
}

async fn process_stub(
    State(stub): State<StubState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            data,
        });
    }

    {
        let mut received = stub.received.lock();
        received.requests += 1;
        received.content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        received.authorization = headers.contains_key(header::AUTHORIZATION);
        received.parts = parts;
    }

    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body,
    )
}

async fn stub_server(status: StatusCode, body: &'static str) -> StubServer {
    let received = Arc::new(Mutex::new(Received::default()));
    let app = Router::new()
        .route("/api/process", post(process_stub))
        .with_state(StubState {
            status,
            body,
            received: received.clone(),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubServer {
        base_url: format!("http://{}", addr),
        received,
    }
}

fn http_service(base_url: &str) -> HttpProcessingService {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpProcessingService::with_client(&ServiceConfig::new(base_url), client).unwrap()
}

// ---- HTTP ----

#[tokio::test]
async fn test_http_success_and_wire_format() {
    init_tracing();
    let server = stub_server(
        StatusCode::OK,
        r#"{"status":"done","video_url":"/files/out.mp4","script":"Keep going"}"#,
    )
    .await;
    let service = http_service(&server.base_url);

    let mut controller = ready_controller();
    controller.set_references(vec![image("a.png"), image("b.png"), image("c.png")]);

    let state = controller.submit(&service).await.clone();
    assert_eq!(
        state,
        SubmissionState::Succeeded(GeneratedVideo {
            url: format!("{}/files/out.mp4", server.base_url),
            script: Some("Keep going".to_string()),
        })
    );

    let received = server.received.lock();
    assert_eq!(received.requests, 1);
    assert!(received
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    assert!(!received.authorization);

    let fields: Vec<(&str, Option<&str>)> = received
        .parts
        .iter()
        .map(|p| (p.name.as_str(), p.file_name.as_deref()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("video", Some("clip.mp4")),
            ("prompt", None),
            ("references", Some("a.png")),
            ("references", Some("b.png")),
            ("references", Some("c.png")),
        ]
    );

    assert_eq!(received.parts[0].data, b"fake mp4 payload");
    assert_eq!(
        received.parts[1].data,
        b"Create a motivational video about John"
    );
    assert_eq!(received.parts[4].data, b"png:c.png");
}

#[tokio::test]
async fn test_http_without_references_sends_two_parts() {
    let server = stub_server(StatusCode::OK, r#"{"video_url":"/files/out.mp4"}"#).await;
    let service = http_service(&server.base_url);

    let mut controller = ready_controller();
    controller.submit(&service).await;

    let names: Vec<String> = server
        .received
        .lock()
        .parts
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["video", "prompt"]);
    assert_eq!(
        controller.presentation().video_url,
        Some(format!("{}/files/out.mp4", server.base_url))
    );
}

#[tokio::test]
async fn test_http_error_detail_is_shown() {
    init_tracing();
    let server = stub_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"bad prompt"}"#,
    )
    .await;
    let service = http_service(&server.base_url);

    let mut controller = ready_controller();
    controller.submit(&service).await;
    assert_eq!(server.received.lock().requests, 1);

    assert_eq!(
        controller.state(),
        &SubmissionState::Failed("bad prompt".to_string())
    );
    let shown = controller.presentation();
    assert_eq!(shown.message.as_deref(), Some("bad prompt"));
    assert!(shown.video_url.is_none());
}

#[tokio::test]
async fn test_http_error_without_body_uses_status_text() {
    let server = stub_server(StatusCode::NOT_FOUND, "").await;
    let service = http_service(&server.base_url);

    let mut controller = ready_controller();
    controller.submit(&service).await;
    assert_eq!(server.received.lock().requests, 1);

    assert_eq!(
        controller.state(),
        &SubmissionState::Failed("Request failed with status code 404".to_string())
    );
}

#[tokio::test]
async fn test_http_success_missing_video_url_fails() {
    let server = stub_server(StatusCode::OK, r#"{"status":"done"}"#).await;
    let service = http_service(&server.base_url);

    let mut controller = ready_controller();
    controller.submit(&service).await;
    assert_eq!(server.received.lock().requests, 1);

    assert!(matches!(controller.state(), SubmissionState::Failed(_)));
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn test_http_transport_failure_uses_transport_text() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = http_service(&format!("http://{}", addr));
    let mut controller = ready_controller();
    controller.submit(&service).await;

    match controller.state() {
        SubmissionState::Failed(message) => {
            assert!(!message.is_empty());
            assert_ne!(message, GENERIC_FAILURE_MESSAGE);
        }
        other => panic!("expected Failed, got {:?}", other),
    }

    // Still resubmittable
    assert!(controller.begin_submit().is_some());
}

// ---- mock service ----

#[tokio::test]
async fn test_validation_gating_never_calls_service() {
    let service = MockProcessingService::succeeding("http://127.0.0.1:8000", "/x.mp4");

    for prompt in ["", "a prompt"] {
        for references in [Vec::new(), vec![image("a.png"), image("b.png")]] {
            let mut controller = SubmissionController::new();
            controller.set_prompt(prompt);
            controller.set_references(references);
            controller.submit(&service).await;
            assert_eq!(
                controller.state(),
                &SubmissionState::Invalid(ValidationError::MissingVideo)
            );
        }
    }

    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_double_submit_dispatches_once() {
    let service = Arc::new(MockProcessingService::succeeding(
        "http://127.0.0.1:8000",
        "/files/out.mp4",
    ));
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut controller = ready_controller();

    for _ in 0..2 {
        if let Some(pending) = controller.begin_submit() {
            let service = service.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let completion = pending.dispatch(service.as_ref()).await;
                let _ = tx.send(completion);
            });
        }
    }
    assert!(controller.presentation().busy);

    let completion = rx.recv().await.unwrap();
    assert!(controller.complete(completion));
    assert_eq!(service.call_count(), 1);
    assert_eq!(
        controller.presentation().video_url.as_deref(),
        Some("http://127.0.0.1:8000/files/out.mp4")
    );
}

#[tokio::test]
async fn test_new_attempt_clears_previous_result() {
    let service = MockProcessingService::succeeding("http://127.0.0.1:8000", "/files/out.mp4");
    let mut controller = ready_controller();

    controller.submit(&service).await;
    assert!(controller.presentation().video_url.is_some());

    service.set_behavior(MockBehavior::Fail(SubmissionError::transport("Network Error")));
    let pending = controller.begin_submit().unwrap();

    let shown = controller.presentation();
    assert!(shown.busy);
    assert!(shown.video_url.is_none());
    assert!(shown.message.is_none());

    let completion = pending.dispatch(&service).await;
    controller.complete(completion);

    let shown = controller.presentation();
    assert_eq!(shown.message.as_deref(), Some("Network Error"));
    assert!(shown.video_url.is_none());

    // Failed is resubmittable, and a later success replaces the error
    service.set_behavior(MockBehavior::default());
    controller.submit(&service).await;
    let shown = controller.presentation();
    assert!(shown.message.is_none());
    assert_eq!(
        shown.video_url.as_deref(),
        Some("http://127.0.0.1:8000/static/uploads/mock.mp4")
    );
    assert_eq!(service.call_count(), 3);
}

#[tokio::test]
async fn test_reference_order_reaches_service() {
    let service = MockProcessingService::succeeding("http://127.0.0.1:8000", "/x.mp4");
    let mut controller = ready_controller();
    controller.set_references(vec![image("a.png"), image("b.png"), image("c.png")]);

    controller.submit(&service).await;

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let names: Vec<_> = requests[0]
        .references
        .iter()
        .map(|r| r.file_name().to_string())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
}

#[tokio::test]
async fn test_late_response_after_reset_is_ignored() {
    let service = MockProcessingService::succeeding("http://127.0.0.1:8000", "/old.mp4");
    let mut controller = ready_controller();

    let old = controller.begin_submit().unwrap();
    controller.reset();

    service.set_behavior(MockBehavior::Succeed {
        video_path: "/new.mp4".to_string(),
        script: None,
    });
    let current = controller.begin_submit().unwrap();

    let late = old.dispatch(&service).await;
    assert!(!controller.complete(late));
    assert!(controller.is_submitting());

    let fresh = current.dispatch(&service).await;
    assert!(controller.complete(fresh));
    assert_eq!(
        controller.presentation().video_url.as_deref(),
        Some("http://127.0.0.1:8000/new.mp4")
    );
}
