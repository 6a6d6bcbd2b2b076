//! SSE event type definitions
//!
//! Contains the typed task events produced by the agent backend, the
//! line classification used by the parser, and frame-level parse errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents a classified SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: message")
    Event(String),
    /// Data payload with the prefix stripped and surrounding whitespace trimmed
    Data(String),
    /// Blank line (keep-alive or event separator)
    Empty,
    /// Comment line (starts with ':') or any unrecognized line
    Comment(String),
}

/// Typed task events streamed by the agent backend.
///
/// The wire discriminator is the `type` field of the JSON object carried on
/// each `data:` line. The frame parser checks it and decodes through
/// `payloads` instead of this `Deserialize`, which only serves stored tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// An intermediate reasoning or tool-use step
    Step {
        thought: String,
        action: String,
        /// Tool input; the backend sends either a string or an object
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action_input: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        observation: Option<String>,
    },
    /// Terminal successful result
    FinalAnswer { thought: String, answer: String },
    /// Terminal timing marker, in seconds
    ExecutionTime { time: f64 },
    /// Terminal failure reported by the backend
    Error { error: String },
}

impl TaskEvent {
    /// Returns the wire name of the event type.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            TaskEvent::Step { .. } => "step",
            TaskEvent::FinalAnswer { .. } => "final_answer",
            TaskEvent::ExecutionTime { .. } => "execution_time",
            TaskEvent::Error { .. } => "error",
        }
    }

    /// True for events after which the backend sends nothing meaningful.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskEvent::Step { .. })
    }

    /// Build the synthetic error event recorded when the transport fails.
    pub fn error(message: impl Into<String>) -> Self {
        TaskEvent::Error {
            error: message.into(),
        }
    }
}

/// Errors that can occur while parsing a single `data:` frame.
///
/// These never abort a stream; the dispatcher logs them and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Payload is not valid JSON
    #[error("Invalid JSON in data frame: {0}")]
    InvalidJson(String),

    /// Payload is JSON but has no string `type` field
    #[error("Data frame has no event type")]
    MissingType,

    /// Discriminator names an event this client does not know
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Discriminator is known but the variant fields do not match
    #[error("Invalid payload for event '{event_type}': {reason}")]
    InvalidPayload { event_type: String, reason: String },
}
