//! agent-stream - a streaming client for a ReAct-style AI agent backend
//!
//! The backend runs the agent; this crate submits queries and follows the
//! agent's progress as it streams back over Server-Sent Events.
//!
//! - [`stream`]: opens query streams and reports their lifecycle
//! - [`sse`]: incremental line decoding and `data:` frame dispatch
//! - [`session`]: backend session creation
//! - [`state`]: caller-owned task store fed by stream observers

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod session;
pub mod sse;
pub mod state;
pub mod stream;
pub mod traits;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, StreamError};
pub use session::{Session, SessionClient, SessionError};
pub use sse::TaskEvent;
pub use stream::{SseHandler, StreamHandle, StreamObserver, StreamState};
