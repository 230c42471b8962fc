//! MCP (Model Context Protocol) server over the SSE transport.
//!
//! Each `GET /mcp` opens a session with its own protocol server and
//! transport; JSON-RPC requests are POSTed to `/mcp/messages?sessionId=ID`
//! and answered as `message` events on the session's stream.
//!
//! ## Tools
//!
//! - `next_best_step` - coaching reply (simple) or timeboxed directive (widget)
//! - `kitchen-sink-refresh` - widget server only; echoes a message back
//!
//! ## Protocol
//!
//! ```json
//! {
//!     "jsonrpc": "2.0",
//!     "id": 1,
//!     "method": "tools/call",
//!     "params": {
//!         "name": "next_best_step",
//!         "arguments": { "user_input": "I'm stuck on the report" }
//!     }
//! }
//! ```

mod dispatch;
pub mod handlers;
mod server;
mod sessions;
mod transport;
pub mod types;

pub use dispatch::{McpServer, SUPPORTED_PROTOCOL_VERSIONS};
pub use server::{build_router, start_server, AppState};
pub use sessions::{SessionDirectory, SessionPhase, SessionRecord};
pub use transport::{SseStream, SseTransport, TransportError};
