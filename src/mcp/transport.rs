//! SSE transport for one MCP session.
//!
//! The client opens a long-lived `GET` that receives an `endpoint` event and
//! then one `message` event per JSON-RPC response. Requests arrive as `POST`s
//! on the advertised endpoint. When the SSE body is dropped the transport is
//! closed and its close callback runs exactly once.

use axum::response::sse::Event;
use futures_util::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::dispatch::McpServer;
use super::types::{JsonRpcRequest, JsonRpcResponse};

/// Pending events per session before senders wait
const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid message: {0}")]
    InvalidMessage(#[source] serde_json::Error),
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("SSE stream for session {0} is closed")]
    Closed(String),
}

impl TransportError {
    /// Caller sent something we cannot decode (as opposed to our own failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidMessage(_))
    }
}

#[derive(Clone)]
pub struct SseTransport {
    session_id: String,
    sender: mpsc::Sender<Event>,
    closed: Arc<AtomicBool>,
}

impl SseTransport {
    /// New transport with a fresh session id; the receiver feeds the SSE body
    pub fn new() -> (Self, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let transport = Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            sender,
            closed: Arc::new(AtomicBool::new(false)),
        };
        (transport, receiver)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wrap the receiver in the stream handed to `Sse`. `on_close` runs when
    /// the stream is dropped (client disconnect or server shutdown).
    pub fn stream(
        &self,
        receiver: mpsc::Receiver<Event>,
        on_close: impl FnOnce() + Send + 'static,
    ) -> SseStream {
        SseStream {
            receiver,
            _guard: CloseGuard {
                session_id: self.session_id.clone(),
                closed: self.closed.clone(),
                on_close: Some(Box::new(on_close)),
            },
        }
    }

    /// Handshake: tell the client where to POST its messages
    pub async fn start(&self, messages_path: &str) -> Result<(), TransportError> {
        let endpoint = format!("{}?sessionId={}", messages_path, self.session_id);
        self.send_event(Event::default().event("endpoint").data(endpoint))
            .await
    }

    /// Decode one POSTed JSON-RPC message, dispatch it, and write any
    /// response to the SSE stream
    pub async fn handle_post_message(
        &self,
        server: &McpServer,
        body: &[u8],
    ) -> Result<(), TransportError> {
        let request: JsonRpcRequest =
            serde_json::from_slice(body).map_err(TransportError::InvalidMessage)?;

        match server.handle(request) {
            Some(response) => self.send(&response).await,
            None => Ok(()),
        }
    }

    pub async fn send(&self, response: &JsonRpcResponse) -> Result<(), TransportError> {
        let data = serde_json::to_string(response).map_err(TransportError::Encode)?;
        self.send_event(Event::default().event("message").data(data))
            .await
    }

    async fn send_event(&self, event: Event) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed(self.session_id.clone()));
        }
        self.sender.send(event).await.map_err(|_| {
            warn!(session_id = %self.session_id, "SSE receiver dropped before send");
            TransportError::Closed(self.session_id.clone())
        })
    }
}

/// SSE event stream; closing fires when this is dropped
pub struct SseStream {
    receiver: mpsc::Receiver<Event>,
    _guard: CloseGuard,
}

impl Stream for SseStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx).map(|event| event.map(Ok))
    }
}

struct CloseGuard {
    session_id: String,
    closed: Arc<AtomicBool>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!(session_id = %self.session_id, "SSE stream dropped");
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }
}
