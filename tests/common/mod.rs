//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use next_best_step::mcp::{build_router, AppState};
use next_best_step::{ServerProfile, WidgetAsset};

pub const WIDGET_HTML: &str = "<div id=\"next-best-step-root\"></div>";

pub fn next_step_app() -> (AppState, Router) {
    let state = AppState::new(ServerProfile::next_step().unwrap());
    let app = build_router(state.clone());
    (state, app)
}

pub fn widget_app() -> (AppState, Router) {
    let profile = ServerProfile::widget(WidgetAsset::from_html(WIDGET_HTML)).unwrap();
    let state = AppState::new(profile);
    let app = build_router(state.clone());
    (state, app)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_message(app: &Router, session_id: Option<&str>, message: &Value) -> Response {
    let uri = match session_id {
        Some(id) => format!("/mcp/messages?sessionId={}", id),
        None => "/mcp/messages".to_string(),
    };
    send(
        app,
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(message.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Next SSE event on an open stream, as raw text
pub async fn next_event(body: &mut Body) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("timed out waiting for SSE event")
        .expect("SSE stream ended")
        .expect("SSE stream errored");
    let data = frame.into_data().expect("expected a data frame");
    String::from_utf8(data.to_vec()).unwrap()
}

/// Value of the `data:` line of one SSE event
pub fn event_data(event: &str) -> String {
    event
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Value of the `event:` line of one SSE event
pub fn event_name(event: &str) -> Option<String> {
    event
        .lines()
        .find_map(|line| line.strip_prefix("event:"))
        .map(|name| name.trim().to_string())
}

/// Open `GET /mcp`, read the endpoint event, and return the session id with
/// the still-open stream. Dropping the stream closes the session.
pub async fn open_session(app: &Router) -> (String, Body) {
    let resp = get(app, "/mcp").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let mut body = resp.into_body();
    let event = next_event(&mut body).await;
    assert_eq!(event_name(&event).as_deref(), Some("endpoint"));

    let endpoint = event_data(&event);
    assert!(endpoint.starts_with("/mcp/messages?sessionId="));
    let session_id = endpoint
        .split("sessionId=")
        .nth(1)
        .unwrap()
        .to_string();
    (session_id, body)
}

/// Read the next `message` event and parse its JSON-RPC payload
pub async fn next_message(body: &mut Body) -> Value {
    let event = next_event(body).await;
    assert_eq!(event_name(&event).as_deref(), Some("message"));
    serde_json::from_str(&event_data(&event)).unwrap()
}
