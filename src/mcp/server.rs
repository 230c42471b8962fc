//! MCP HTTP server for the coaching tools.
//!
//! Serves the SSE session endpoint, the message endpoint keyed by
//! `sessionId`, a health check, and a JSON service descriptor.

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{
        sse::{KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::profile::{ServerProfile, HEALTH_PATH, MESSAGES_PATH, SSE_PATH};

use super::dispatch::McpServer;
use super::sessions::SessionDirectory;
use super::transport::{SseTransport, TransportError};

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<ServerProfile>,
    pub sessions: SessionDirectory,
}

impl AppState {
    pub fn new(profile: ServerProfile) -> Self {
        Self {
            profile: Arc::new(profile),
            sessions: SessionDirectory::new(),
        }
    }
}

/// Build the router: descriptor, health, SSE connect, message post, preflight
pub fn build_router(state: AppState) -> Router {
    let mcp_routes = Router::new()
        .route(
            SSE_PATH,
            get(sse_connect).options(cors_preflight).fallback(not_found),
        )
        .route(
            MESSAGES_PATH,
            post(post_message)
                .options(cors_preflight)
                .fallback(not_found),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ));

    Router::new()
        .route("/", get(service_descriptor).fallback(not_found))
        .route(HEALTH_PATH, get(health_endpoint).fallback(not_found))
        .merge(mcp_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind on `0.0.0.0:port` and serve until Ctrl+C
pub async fn start_server(profile: ServerProfile, port: u16) -> anyhow::Result<()> {
    let name = profile.name();
    let state = AppState::new(profile);
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {} to {}", name, addr))?;
    info!("{} listening on http://{}", name, addr);
    info!("SSE endpoint: GET {}  messages: POST {}", SSE_PATH, MESSAGES_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.sessions.clone()))
        .await
        .context("MCP server error")?;

    info!("{} stopped", name);
    Ok(())
}

async fn shutdown_signal(sessions: SessionDirectory) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
    // Open SSE streams would otherwise keep graceful shutdown waiting forever
    sessions.close_all();
}

async fn service_descriptor(State(state): State<AppState>) -> Json<Value> {
    Json(state.profile.descriptor())
}

async fn health_endpoint() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn cors_preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "content-type"),
        ],
    )
}

/// Open a session: register it, send the endpoint event, then stream
async fn sse_connect(State(state): State<AppState>) -> Response {
    let (transport, receiver) = SseTransport::new();
    let session_id = transport.session_id().to_string();
    let server = McpServer::new(state.profile.clone(), session_id.clone());

    // Registered before the handshake so an early POST can find it
    state.sessions.create(server, transport.clone());

    let sessions = state.sessions.clone();
    let closing_id = session_id.clone();
    let stream = transport.stream(receiver, move || {
        sessions.remove(&closing_id);
    });

    if let Err(e) = handshake(&state.sessions, &transport).await {
        error!(session_id = %session_id, "SSE handshake failed: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to establish SSE connection",
        )
            .into_response();
    }
    info!(session_id = %session_id, "SSE session opened");

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Send the endpoint event and mark the session active. A failed handshake
/// removes the session; it is never retried.
async fn handshake(
    sessions: &SessionDirectory,
    transport: &SseTransport,
) -> Result<(), TransportError> {
    if let Err(e) = transport.start(MESSAGES_PATH).await {
        sessions.remove(transport.session_id());
        return Err(e);
    }
    sessions.mark_active(transport.session_id());
    Ok(())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Deliver one JSON-RPC message to the session's transport
async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId parameter").into_response();
    };

    let Some(record) = state.sessions.lookup(&session_id) else {
        warn!(session_id = %session_id, "Message for unknown session");
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    match record
        .transport
        .handle_post_message(&record.server, &body)
        .await
    {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) if e.is_client_error() => {
            warn!(session_id = %session_id, "Rejected message: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            error!(session_id = %session_id, "Error handling message: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error handling message").into_response()
        }
    }
}
