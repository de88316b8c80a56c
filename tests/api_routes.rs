//! HTTP surface tests driven through the router

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use block_pause::{
    challenge::FixedCode,
    create_router,
    services::ManualClock,
    tasks::{spawn_popup, Popup},
    AppState, Event, MachineSettings, StoredState, ToggleMachine,
};
use common::{ScriptedBackend, NOW};

const CODE: &str = "Xk9pQmZ2aT";

async fn start(state: StoredState) -> (Router, Popup) {
    let clock = ManualClock::new(NOW);
    let backend = ScriptedBackend::new(clock.clone(), state);
    let (machine, events) = ToggleMachine::new(backend, clock, MachineSettings::default());
    let machine = machine.with_code_generator(Box::new(FixedCode(CODE.to_string())));

    let popup = spawn_popup(machine, events);
    popup.handle.dispatch(Event::Load).await.unwrap();

    let state = Arc::new(AppState::new(
        popup.handle.clone(),
        popup.view_rx.clone(),
        20554,
        "127.0.0.1".to_string(),
    ));
    (create_router(state), popup)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, popup) = start(StoredState::blocking()).await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    popup.task.abort();
}

#[tokio::test]
async fn challenge_flow_over_http() {
    let (app, popup) = start(StoredState::blocking()).await;

    let (status, view) = send(&app, Method::GET, "/view", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "BLOCKING");
    assert_eq!(view["button_label"], "Disable for 5 min");

    let (_, view) = send(&app, Method::POST, "/toggle", None).await;
    assert_eq!(view["phase"], "CHALLENGE_PENDING");
    assert_eq!(view["challenge_visible"], true);
    assert_eq!(view["button_visible"], false);
    assert_eq!(view["challenge_code"], CODE);

    let (_, view) = send(&app, Method::POST, "/challenge/input", Some(json!({ "text": "wrong123" }))).await;
    assert_eq!(view["challenge_input"], "wrong123");
    let (_, view) = send(&app, Method::POST, "/challenge/confirm", None).await;
    assert_eq!(view["phase"], "CHALLENGE_PENDING");
    assert_eq!(view["error_visible"], true);

    send(&app, Method::POST, "/challenge/input", Some(json!({ "text": CODE }))).await;
    let (status, view) = send(&app, Method::POST, "/challenge/key", Some(json!({ "key": "Enter" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "COOLDOWN");
    assert_eq!(view["button_label"], "Re-enabling in 5:00...");
    assert_eq!(view["challenge_visible"], false);

    let (_, status_body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status_body["view"], view);
    assert_eq!(status_body["port"], 20554);
    assert_eq!(status_body["host"], "127.0.0.1");
    popup.task.abort();
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let (app, popup) = start(StoredState::blocking()).await;
    let (status, _) = send(&app, Method::POST, "/challenge/input", Some(json!({}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    popup.task.abort();
}

#[tokio::test]
async fn stopped_event_loop_returns_server_error() {
    let (app, popup) = start(StoredState::blocking()).await;
    popup.task.abort();
    assert!(popup.task.await.unwrap_err().is_cancelled());

    let (status, _) = send(&app, Method::POST, "/toggle", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
