//! SSE frame parsing logic
//!
//! Contains the line classifier, the typed event parser, and the
//! `EventDispatcher` that turns decoded lines into `TaskEvent`s.

mod step;
mod terminal;

use crate::sse::events::{FrameError, SseLine, TaskEvent};

use step::parse_step_event;
use terminal::{parse_error_event, parse_execution_time_event, parse_final_answer_event};

/// Payload the backend sends to mark intentional completion.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Classify a single SSE line.
///
/// The line is trimmed first, so indentation and a trailing `\r` do not
/// affect recognition. Prefixes are case-sensitive.
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    // Unknown line format - treat as comment
    SseLine::Comment(line.to_string())
}

/// Parse a JSON payload into a typed `TaskEvent`.
///
/// The `type` discriminator is checked before any variant field is read.
pub fn parse_task_event(data: &str) -> Result<TaskEvent, FrameError> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| FrameError::InvalidJson(e.to_string()))?;

    let event_type = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(FrameError::MissingType)?
        .to_string();

    match event_type.as_str() {
        "step" => parse_step_event(&event_type, value),
        "final_answer" => parse_final_answer_event(&event_type, value),
        "execution_time" => parse_execution_time_event(&event_type, value),
        "error" => parse_error_event(&event_type, value),
        _ => Err(FrameError::UnknownEventType(event_type)),
    }
}

/// Outcome of parsing one decoded line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A `data:` line carrying a task event
    Event(TaskEvent),
    /// A `data:` line carrying the completion sentinel
    Sentinel,
    /// Anything else: blank keep-alives, comments, `event:` lines, empty data
    Ignored,
}

/// Parse a decoded line into a `Frame`.
pub fn parse_frame(line: &str, sentinel: &str) -> Result<Frame, FrameError> {
    match parse_sse_line(line) {
        SseLine::Data(payload) if payload == sentinel => Ok(Frame::Sentinel),
        SseLine::Data(payload) if payload.is_empty() => Ok(Frame::Ignored),
        SseLine::Data(payload) => parse_task_event(&payload).map(Frame::Event),
        SseLine::Event(_) | SseLine::Empty | SseLine::Comment(_) => Ok(Frame::Ignored),
    }
}

/// Counters for what the dispatcher has seen on the current stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: u64,
    pub sentinels: u64,
    pub ignored: u64,
    pub malformed: u64,
}

/// Turns decoded lines into events, absorbing per-frame failures.
///
/// A malformed or unknown frame is logged and counted; it never aborts the
/// stream and never affects the frames around it.
#[derive(Debug)]
pub struct EventDispatcher {
    sentinel: String,
    stats: DispatchStats,
    last_error: Option<FrameError>,
}

impl EventDispatcher {
    /// Create a dispatcher using the default `[DONE]` sentinel.
    pub fn new() -> Self {
        Self::with_sentinel(DONE_SENTINEL)
    }

    /// Create a dispatcher with a custom completion sentinel.
    pub fn with_sentinel(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            stats: DispatchStats::default(),
            last_error: None,
        }
    }

    /// Process one line, returning the event it carries, if any.
    pub fn dispatch_line(&mut self, line: &str) -> Option<TaskEvent> {
        match parse_frame(line, &self.sentinel) {
            Ok(Frame::Event(event)) => {
                self.stats.events += 1;
                Some(event)
            }
            Ok(Frame::Sentinel) => {
                tracing::debug!("Received completion sentinel");
                self.stats.sentinels += 1;
                None
            }
            Ok(Frame::Ignored) => {
                self.stats.ignored += 1;
                None
            }
            Err(err) => {
                match &err {
                    // The backend also streams `observation` frames on every tool call
                    FrameError::UnknownEventType(event_type) => {
                        tracing::debug!("Skipping unknown event type: {}", event_type)
                    }
                    _ => tracing::warn!("Skipping malformed SSE frame: {}", err),
                }
                self.stats.malformed += 1;
                self.last_error = Some(err);
                None
            }
        }
    }

    /// Counters since creation or the last reset.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Most recent frame-level failure, if any.
    pub fn last_error(&self) -> Option<&FrameError> {
        self.last_error.as_ref()
    }

    /// Reset counters and the recorded error.
    pub fn reset(&mut self) {
        self.stats = DispatchStats::default();
        self.last_error = None;
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
