//! Lifecycle of a single query stream.

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, warn};

/// Stream lifecycle state.
///
/// ```text
/// Idle -> Connecting -> Streaming -> Closed
///             |             |
///             +-> Errored <-+
///             +-> Cancelled <-+
/// ```
///
/// `Closed`, `Errored` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    /// Request dispatched, waiting for response headers
    Connecting,
    /// Headers received, body being read
    Streaming,
    /// The backend ended the stream
    Closed,
    /// The transport failed
    Errored,
    /// The caller cancelled the stream
    Cancelled,
}

impl StreamState {
    /// No further transitions, callbacks or reads happen from a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamState::Closed | StreamState::Errored | StreamState::Cancelled
        )
    }

    /// Whether a transport is currently in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, StreamState::Connecting | StreamState::Streaming)
    }

    /// Whether moving from `self` to `next` is a valid edge.
    pub fn can_transition_to(&self, next: StreamState) -> bool {
        use StreamState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Streaming)
                | (Connecting, Errored)
                | (Connecting, Cancelled)
                | (Streaming, Closed)
                | (Streaming, Errored)
                | (Streaming, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Connecting => "connecting",
            StreamState::Streaming => "streaming",
            StreamState::Closed => "closed",
            StreamState::Errored => "errored",
            StreamState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of a stream's state, publishing every change to watchers.
///
/// Only valid edges are applied, and terminal states have no exits, so a
/// callback gated on a successful transition fires at most once.
#[derive(Debug)]
pub(crate) struct StateMachine {
    tx: watch::Sender<StreamState>,
}

impl StateMachine {
    pub(crate) fn new() -> (Self, watch::Receiver<StreamState>) {
        let (tx, rx) = watch::channel(StreamState::Idle);
        (Self { tx }, rx)
    }

    pub(crate) fn current(&self) -> StreamState {
        *self.tx.borrow()
    }

    pub(crate) fn can_advance(&self, next: StreamState) -> bool {
        self.current().can_transition_to(next)
    }

    /// Apply the transition if valid. Returns whether it was applied.
    pub(crate) fn advance(&self, next: StreamState) -> bool {
        let mut from = StreamState::Idle;
        let applied = self.tx.send_if_modified(|state| {
            from = *state;
            if state.can_transition_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });

        if applied {
            debug!("Stream state {} -> {}", from, next);
        } else if !from.is_terminal() {
            warn!("Rejected stream state transition {} -> {}", from, next);
        }
        applied
    }
}
