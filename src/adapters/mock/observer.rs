//! Recording stream observer for testing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StreamError;
use crate::sse::TaskEvent;
use crate::stream::StreamObserver;

/// One observer callback, as recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ConnectionStart,
    Event(TaskEvent),
    Error(StreamError),
    Close,
}

/// Observer that records every callback in order.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All callbacks so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.record().clone()
    }

    /// Events delivered through `on_event`.
    pub fn events(&self) -> Vec<TaskEvent> {
        self.record()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Event(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    /// Errors delivered through `on_error`.
    pub fn errors(&self) -> Vec<StreamError> {
        self.record()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Error(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `on_error` plus `on_close` callbacks.
    pub fn terminal_count(&self) -> usize {
        self.record()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Error(_) | RecordedCall::Close))
            .count()
    }

    pub fn clear(&self) {
        self.record().clear();
    }
}

impl StreamObserver for RecordingObserver {
    fn on_connection_start(&self) {
        self.record().push(RecordedCall::ConnectionStart);
    }

    fn on_event(&self, event: TaskEvent) {
        self.record().push(RecordedCall::Event(event));
    }

    fn on_error(&self, error: &StreamError) {
        self.record().push(RecordedCall::Error(error.clone()));
    }

    fn on_close(&self) {
        self.record().push(RecordedCall::Close);
    }
}
