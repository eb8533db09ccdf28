use agent_worker_server::{
    app,
    config::Config,
    events::{SessionEvent, SessionEvents, SessionRecord},
    session::SessionLauncher,
    AppState,
};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower::ServiceExt;

struct Gateway {
    hits: AtomicUsize,
    delay: Duration,
}

/// Starts a fake tools gateway that counts calls and answers after `delay`.
async fn spawn_gateway(delay: Duration) -> (String, Arc<Gateway>) {
    let gateway = Arc::new(Gateway {
        hits: AtomicUsize::new(0),
        delay,
    });

    async fn handle(State(gateway): State<Arc<Gateway>>, Json(body): Json<Value>) -> Json<Value> {
        gateway.hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(gateway.delay).await;
        Json(json!({ "ok": true, "tool": body["tool"], "result": { "lead_id": 1 } }))
    }

    let router = Router::new()
        .route("/agent-tools", post(handle))
        .with_state(gateway.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}/agent-tools", addr), gateway)
}

fn config(livekit: bool, tools_url: &str) -> Config {
    let mut config = Config::default();
    if livekit {
        config.livekit.url = "http://localhost:7880".into();
        config.livekit.api_key = "devkey".into();
        config.livekit.api_secret = "secret".into();
    }
    config.tools.url = tools_url.into();
    config.tools.service_key = "service-key".into();
    config
}

fn setup_app(config: &Config) -> (Router, broadcast::Receiver<SessionRecord>) {
    let events = SessionEvents::new(64);
    let rx = events.subscribe();
    let launcher = SessionLauncher::from_config(config, events).unwrap();
    (app(AppState { launcher }), rx)
}

async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
    post_raw(app, Some("application/json"), body.as_bytes().to_vec()).await
}

async fn post_raw(
    app: Router,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/start-agent");
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let response = app
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Collects session events until one matching `done` arrives.
async fn collect_until(
    rx: &mut broadcast::Receiver<SessionRecord>,
    done: fn(&SessionEvent) -> bool,
) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    loop {
        let record = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("event channel closed");
        let finished = done(&record.event);
        seen.push(record.event);
        if finished {
            return seen;
        }
    }
}

fn is_terminal(event: &SessionEvent) -> bool {
    matches!(
        event,
        SessionEvent::SessionCompleted | SessionEvent::SessionAborted { .. }
    )
}

#[tokio::test]
async fn health_check_returns_healthy() {
    let (app, mut rx) = setup_app(&Config::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "ok": true, "status": "healthy" }));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn missing_room_name_is_rejected_without_side_effects() {
    let (url, gateway) = spawn_gateway(Duration::ZERO).await;
    let cfg = config(true, &url);

    for body in [
        r#"{"agentId":"abc"}"#,
        r#"{"roomName":"","agentId":"abc"}"#,
        r#"{"roomName":null,"agentId":"abc"}"#,
        "",
    ] {
        let (app, mut rx) = setup_app(&cfg);
        let (status, json) = post_json(app, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json, json!({ "ok": false, "error": "missing_roomName" }));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(
            matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)),
            "no session routine should run for body: {body}"
        );
    }

    assert_eq!(gateway.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_a_server_error() {
    let (app, mut rx) = setup_app(&Config::default());
    let (status, json) = post_json(app, r#"{"roomName": "room-1""#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "server_error");
    assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn wrongly_typed_field_is_a_server_error() {
    let (app, _rx) = setup_app(&Config::default());
    let (status, json) = post_json(app, r#"{"roomName": "room-1", "agentId": 7}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "server_error");
}

#[tokio::test]
async fn non_json_content_type_is_treated_as_empty() {
    let (url, gateway) = spawn_gateway(Duration::ZERO).await;
    let body = br#"{"roomName":"room-1","agentId":"abc"}"#.to_vec();

    for content_type in [Some("text/plain"), Some("application/x-www-form-urlencoded"), None] {
        let (app, mut rx) = setup_app(&config(true, &url));
        let (status, json) = post_raw(app, content_type, body.clone()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "content type: {content_type:?}");
        assert_eq!(json, json!({ "ok": false, "error": "missing_roomName" }));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    assert_eq!(gateway.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn json_content_type_with_charset_is_accepted() {
    let (url, _gateway) = spawn_gateway(Duration::ZERO).await;
    let (app, _rx) = setup_app(&config(true, &url));

    let (status, json) = post_raw(
        app,
        Some("application/json; charset=utf-8"),
        br#"{"roomName":"room-1"}"#.to_vec(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["roomName"], "room-1");
}

#[tokio::test]
async fn oversized_body_gets_json_envelope() {
    let (app, mut rx) = setup_app(&Config::default());
    let padding = "x".repeat(2 * 1024 * 1024);
    let body = format!(r#"{{"roomName":"room-1","config":{{"padding":"{padding}"}}}}"#);

    let (status, json) = post_raw(app, Some("application/json"), body.into_bytes()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "payload_too_large");
    assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn null_ids_are_omitted_from_ack() {
    let (url, gateway) = spawn_gateway(Duration::ZERO).await;
    let (app, mut rx) = setup_app(&config(true, &url));

    let (status, json) = post_json(
        app,
        r#"{"roomName":"room-1","agentId":null,"sessionId":null}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "ok": true, "message": "Agent started", "roomName": "room-1" })
    );

    let events = collect_until(&mut rx, is_terminal).await;
    assert!(events.contains(&SessionEvent::CredentialMinted {
        identity: "agent-default".into()
    }));
    assert_eq!(gateway.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn valid_request_echoes_inputs() {
    let (url, _gateway) = spawn_gateway(Duration::ZERO).await;
    let (app, _rx) = setup_app(&config(true, &url));

    let (status, json) = post_json(
        app,
        r#"{"roomName":"room-1","agentId":"abc","sessionId":"sess-1","config":{"voice":"alloy"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "ok": true,
            "message": "Agent started",
            "roomName": "room-1",
            "agentId": "abc",
            "sessionId": "sess-1"
        })
    );
}

#[tokio::test]
async fn response_does_not_wait_for_tool_gateway() {
    let (url, gateway) = spawn_gateway(Duration::from_secs(2)).await;
    let (app, mut rx) = setup_app(&config(true, &url));

    let started = Instant::now();
    let (status, json) = post_json(app, r#"{"roomName":"room-1","agentId":"abc"}"#).await;
    let elapsed = started.elapsed();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["roomName"], "room-1");
    assert!(
        elapsed < Duration::from_secs(1),
        "ack took {:?}, should not wait on the gateway",
        elapsed
    );

    let events = collect_until(&mut rx, is_terminal).await;
    let result = events
        .iter()
        .find_map(|event| match event {
            SessionEvent::ToolDemoCalled { tool, result } => Some((tool.clone(), result.clone())),
            _ => None,
        })
        .expect("demo tool call should have run");
    assert_eq!(result.0, "create_lead");
    assert!(result.1.ok());
    assert_eq!(gateway.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_livekit_config_is_invisible_to_caller() {
    let (url, gateway) = spawn_gateway(Duration::ZERO).await;
    let (app, mut rx) = setup_app(&config(false, &url));

    let (status, json) = post_json(app, r#"{"roomName":"room-1","agentId":"abc"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "ok": true, "message": "Agent started", "roomName": "room-1", "agentId": "abc" })
    );

    let events = collect_until(&mut rx, is_terminal).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        SessionEvent::SessionAborted { missing, .. } => {
            assert_eq!(
                missing,
                &vec!["LIVEKIT_URL", "LIVEKIT_API_KEY", "LIVEKIT_API_SECRET"]
            );
        }
        other => panic!("expected abort, got {:?}", other),
    }
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::CredentialMinted { .. })));
    assert_eq!(gateway.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_agent_id_mints_default_identity_and_skips_tool() {
    let (url, gateway) = spawn_gateway(Duration::ZERO).await;
    let (app, mut rx) = setup_app(&config(true, &url));

    let (status, json) = post_json(app, r#"{"roomName":"lobby"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "ok": true, "message": "Agent started", "roomName": "lobby" })
    );

    let events = collect_until(&mut rx, is_terminal).await;
    assert!(events.contains(&SessionEvent::CredentialMinted {
        identity: "agent-default".into()
    }));
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::ToolDemoSkipped { .. })));
    assert_eq!(events.last(), Some(&SessionEvent::SessionCompleted));
    assert_eq!(gateway.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_sessions_run_independently() {
    let (url, gateway) = spawn_gateway(Duration::from_millis(50)).await;
    let (app, mut rx) = setup_app(&config(true, &url));

    for room in ["room-a", "room-b", "room-c"] {
        let body = format!(r#"{{"roomName":"{room}","agentId":"agent-{room}"}}"#);
        let (status, _) = post_json(app.clone(), &body).await;
        assert_eq!(status, StatusCode::OK);
    }

    let mut completed = Vec::new();
    while completed.len() < 3 {
        let record = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for sessions")
            .unwrap();
        if record.event == SessionEvent::SessionCompleted {
            completed.push(record.room_name);
        }
    }
    completed.sort();
    assert_eq!(completed, vec!["room-a", "room-b", "room-c"]);
    assert_eq!(gateway.hits.load(Ordering::SeqCst), 3);
}
