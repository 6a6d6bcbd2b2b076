//! Caller-facing callback surface of a query stream.

use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::sse::TaskEvent;

/// Receives the lifecycle of one query stream.
///
/// Callbacks run on the stream's reader task, in order. For any outcome
/// exactly one of `on_error` / `on_close` fires, and nothing fires after it.
/// `on_connection_start` precedes every `on_event`.
pub trait StreamObserver: Send + Sync {
    /// Response headers arrived and the body is being read.
    fn on_connection_start(&self) {}

    /// A task event was decoded. Fires zero or more times.
    fn on_event(&self, event: TaskEvent);

    /// The stream failed. Terminal.
    fn on_error(&self, _error: &StreamError) {}

    /// The stream ended, either because the backend finished it or because it
    /// was cancelled. Terminal.
    fn on_close(&self) {}
}

/// Stream callbacks as values, for observers that hand them to another task.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Connected,
    Event(TaskEvent),
    Error(StreamError),
    Closed,
}

impl StreamMessage {
    /// Whether no further messages follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamMessage::Error(_) | StreamMessage::Closed)
    }
}

/// Observer that forwards every callback over an unbounded channel.
///
/// A dropped receiver is not an error: the stream keeps running and the
/// messages are discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StreamMessage>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<StreamMessage>) -> Self {
        Self { tx }
    }

    /// Create an observer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, message: StreamMessage) {
        let _ = self.tx.send(message);
    }
}

impl StreamObserver for ChannelObserver {
    fn on_connection_start(&self) {
        self.forward(StreamMessage::Connected);
    }

    fn on_event(&self, event: TaskEvent) {
        self.forward(StreamMessage::Event(event));
    }

    fn on_error(&self, error: &StreamError) {
        self.forward(StreamMessage::Error(error.clone()));
    }

    fn on_close(&self) {
        self.forward(StreamMessage::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards_in_order() {
        let (observer, mut rx) = ChannelObserver::channel();

        observer.on_connection_start();
        observer.on_event(TaskEvent::ExecutionTime { time: 1.5 });
        observer.on_close();

        assert_eq!(rx.try_recv().unwrap(), StreamMessage::Connected);
        assert_eq!(
            rx.try_recv().unwrap(),
            StreamMessage::Event(TaskEvent::ExecutionTime { time: 1.5 })
        );
        let last = rx.try_recv().unwrap();
        assert!(last.is_terminal());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_only_on_event_is_required() {
        struct Count(std::sync::atomic::AtomicUsize);

        impl StreamObserver for Count {
            fn on_event(&self, _event: TaskEvent) {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }

        let observer = Count(Default::default());
        observer.on_connection_start();
        observer.on_event(TaskEvent::ExecutionTime { time: 0.1 });
        observer.on_error(&StreamError::Other {
            message: "x".to_string(),
        });
        observer.on_close();
        assert_eq!(observer.0.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_observer_forwards_errors() {
        let (observer, mut rx) = ChannelObserver::channel();
        let error = StreamError::Unreadable {
            message: "eof".to_string(),
        };

        observer.on_error(&error);

        assert_eq!(rx.try_recv().unwrap(), StreamMessage::Error(error));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (observer, rx) = ChannelObserver::channel();
        drop(rx);
        observer.on_event(TaskEvent::error("late"));
        observer.on_close();
    }
}
