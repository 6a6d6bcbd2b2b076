//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use agent_stream::prelude::*;
//! ```
//!
//! This will import:
//! - Streaming types (SseHandler, StreamHandle, StreamObserver, ChannelObserver)
//! - Event types (TaskEvent)
//! - Session types (SessionClient, Session)
//! - State types (TaskStore, TaskObserver)
//! - Configuration and errors

// Streaming
pub use crate::stream::{
    ChannelObserver, SseHandler, StreamHandle, StreamMessage, StreamObserver, StreamState,
};

// Events
pub use crate::sse::TaskEvent;

// Sessions
pub use crate::session::{Session, SessionClient};

// State types
pub use crate::state::{Task, TaskObserver, TaskStatus, TaskStore};

// Configuration and errors
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ClientResult, StreamError};
