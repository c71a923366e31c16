//! Integration tests for PostHog delivery.

use async_trait::async_trait;
use posthog_relay::{
    track_event, EventRequest, MutationCtx, PostHog, RunMutationCtx, ScheduledCall, Scheduler,
    TrackEventArgs,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn args(host: &str, user_id: &str, event: &str) -> TrackEventArgs {
    TrackEventArgs {
        api_key: "phc_test".into(),
        host: Some(host.into()),
        user_id: user_id.into(),
        event: event.into(),
        ..Default::default()
    }
}

async fn capture_mock(server: &MockServer, status: u16, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/i/v0/e/"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(status).set_body_string("{\"status\":\"Ok\"}"))
        .expect(expected)
        .mount(server)
        .await;
}

async fn first_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    serde_json::from_slice(&requests[0].body).unwrap()
}

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture warnings on the current thread until the guard drops.
fn capture_warnings() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

/// Scheduler that records calls instead of running them.
#[derive(Default)]
struct RecordingCtx {
    calls: Mutex<Vec<ScheduledCall>>,
}

#[async_trait]
impl Scheduler for RecordingCtx {
    async fn run_after(
        &self,
        _delay: Duration,
        call: ScheduledCall,
    ) -> Result<(), posthog_relay::Error> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl RunMutationCtx for RecordingCtx {
    fn scheduler(&self) -> &dyn Scheduler {
        self
    }
}

#[tokio::test]
async fn test_handler_sends_correct_payload() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 1).await;

    let mut args = args(&mock_server.uri(), "u1", "signup");
    args.properties = Some(HashMap::from([("plan".into(), json!("free"))]));

    track_event(args).await;

    let body = first_body(&mock_server).await;
    assert_eq!(body["api_key"], "phc_test");
    assert_eq!(body["event"], "signup");
    assert_eq!(body["distinct_id"], "u1");
    assert_eq!(
        body["properties"],
        json!({ "plan": "free", "$lib": "convex-posthog", "$lib_version": "0.1.1" })
    );
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_handler_empty_user_id_sends_nothing() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 0).await;
    let (logs, _guard) = capture_warnings();

    track_event(args(&mock_server.uri(), "", "x")).await;

    let output = logs.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("userId and event are required"));
    assert!(output.contains("event=x"));
}

#[tokio::test]
async fn test_handler_empty_event_sends_nothing() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 0).await;

    track_event(args(&mock_server.uri(), "u1", "")).await;
}

#[tokio::test]
async fn test_handler_empty_api_key_sends_nothing() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 0).await;
    let (logs, _guard) = capture_warnings();

    let mut args = args(&mock_server.uri(), "u1", "signup");
    args.api_key = String::new();

    track_event(args).await;

    // Disabled tracking is silent
    assert_eq!(logs.contents(), "");
}

#[tokio::test]
async fn test_handler_swallows_error_status() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 500, 1).await;
    let (logs, _guard) = capture_warnings();

    // Resolves normally despite the 500
    track_event(args(&mock_server.uri(), "u1", "signup")).await;

    let output = logs.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("PostHog tracking failed"));
    assert!(output.contains("status=500"));
    assert!(output.contains("Internal Server Error"));
    assert!(output.contains(r#"response_body={"status":"Ok"}"#));
    assert!(output.contains("event=signup"));
    assert!(output.contains("user_id=u1"));
    assert!(output.contains(&format!("url={}/i/v0/e/", mock_server.uri())));
}

#[tokio::test]
async fn test_handler_swallows_transport_error() {
    let (logs, _guard) = capture_warnings();

    // Nothing listens on port 1
    track_event(args("http://127.0.0.1:1", "u1", "signup")).await;

    let output = logs.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("PostHog tracking failed"));
    assert!(output.contains("error="));
    assert!(output.contains("event=signup"));
    assert!(output.contains("user_id=u1"));
    assert!(output.contains("url=http://127.0.0.1:1/i/v0/e/"));
}

#[tokio::test]
async fn test_handler_trims_trailing_slash() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 1).await;

    track_event(args(&format!("{}/", mock_server.uri()), "u1", "signup")).await;
}

#[tokio::test]
async fn test_track_user_event_schedules_once() {
    let ctx = RecordingCtx::default();
    let client = PostHog::builder()
        .api_key("phc_test")
        .host("https://example.com")
        .build();

    let mut request = EventRequest::new("u1", "signup");
    request.properties = Some(HashMap::from([("plan".into(), json!("free"))]));
    client.track_user_event(&ctx, request).await;

    let calls = ctx.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name(), "lib:trackEvent");
}

#[tokio::test]
async fn test_track_user_event_without_key_schedules_nothing() {
    let ctx = RecordingCtx::default();
    let (logs, _guard) = capture_warnings();
    let client = PostHog::builder()
        .api_key("")
        .host("https://example.com")
        .build();

    for i in 0..5 {
        client
            .track_user_event(&ctx, EventRequest::new(format!("u{}", i), "signup"))
            .await;
    }

    assert!(ctx.calls.lock().unwrap().is_empty());
    let output = logs.contents();
    assert_eq!(
        output
            .matches("PostHog API key not configured, skipping event tracking")
            .count(),
        5
    );
}

#[tokio::test]
async fn test_end_to_end_through_tokio_scheduler() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 1).await;

    let client = PostHog::builder()
        .api_key("phc_test")
        .host(mock_server.uri())
        .build();
    let ctx = MutationCtx::tokio();

    client
        .track(&ctx, "signup", "u1")
        .property("plan", "free")
        .set_property("name", "Ada")
        .send()
        .await;

    // The handler runs detached; wait for it to land
    let mut received = Vec::new();
    for _ in 0..100 {
        received = mock_server.received_requests().await.unwrap();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(received.len(), 1);
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["distinct_id"], "u1");
    assert_eq!(body["properties"]["plan"], "free");
    assert_eq!(body["properties"]["$set"], json!({ "name": "Ada" }));
}

#[tokio::test]
async fn test_shared_context_across_tasks() {
    let mock_server = MockServer::start().await;
    capture_mock(&mock_server, 200, 10).await;

    let client = Arc::new(
        PostHog::builder()
            .api_key("phc_test")
            .host(mock_server.uri())
            .build(),
    );
    let ctx = MutationCtx::tokio();

    let mut handles = vec![];
    for i in 0..10 {
        let client = client.clone();
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            client
                .track_user_event(&ctx, EventRequest::new(format!("u{}", i), "signup"))
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for _ in 0..100 {
        if mock_server.received_requests().await.unwrap().len() == 10 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
