//! Directory of live SSE sessions.
//!
//! Maps a session id to its protocol server and transport. Entries are
//! inserted before the SSE handshake and removed from the transport's close
//! callback, so a closed session is never routed to again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use super::dispatch::McpServer;
use super::transport::SseTransport;

/// Lifecycle phase of a session still present in the directory.
/// A closed session is simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Active,
}

#[derive(Clone)]
pub struct SessionRecord {
    pub session_id: String,
    pub server: McpServer,
    pub transport: SseTransport,
    pub phase: SessionPhase,
}

/// Shared session map. The lock is never held across an `.await`.
#[derive(Clone, Default)]
pub struct SessionDirectory {
    sessions: Arc<Mutex<HashMap<String, SessionRecord>>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        // A panic elsewhere cannot leave the map half-updated
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a new session in the `Connecting` phase, keyed by the
    /// transport's session id
    pub fn create(&self, server: McpServer, transport: SseTransport) -> SessionRecord {
        let record = SessionRecord {
            session_id: transport.session_id().to_string(),
            server,
            transport,
            phase: SessionPhase::Connecting,
        };
        self.lock()
            .insert(record.session_id.clone(), record.clone());
        record
    }

    /// Find a session whose transport has not closed
    pub fn lookup(&self, session_id: &str) -> Option<SessionRecord> {
        self.lock()
            .get(session_id)
            .filter(|record| !record.transport.is_closed())
            .cloned()
    }

    /// Handshake succeeded. Returns false if the session is already gone.
    pub fn mark_active(&self, session_id: &str) -> bool {
        match self.lock().get_mut(session_id) {
            Some(record) => {
                record.phase = SessionPhase::Active;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, session_id: &str) -> Option<SessionRecord> {
        let removed = self.lock().remove(session_id);
        if removed.is_some() {
            info!(session_id = %session_id, "Session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every session, ending their SSE streams. Used on shutdown.
    pub fn close_all(&self) -> usize {
        let drained: Vec<SessionRecord> = self.lock().drain().map(|(_, record)| record).collect();
        let count = drained.len();
        if count > 0 {
            info!("Closed {} session(s) for shutdown", count);
        }
        count
    }
}
