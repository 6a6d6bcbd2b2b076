//! The read loop driving one query stream.
//!
//! Runs on its own task. The line buffer, dispatcher and state are confined to
//! that task; the outside world only sees the watch channel and the observer
//! callbacks.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, error, info};

use super::observer::StreamObserver;
use super::session::StreamSession;
use super::state::{StateMachine, StreamState};
use crate::error::StreamError;
use crate::sse::{EventDispatcher, LineDecoder};
use crate::traits::{Headers, HttpClient};

/// Headers sent with every query request.
pub fn stream_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "text/event-stream".to_string());
    headers.insert("Cache-Control".to_string(), "no-cache".to_string());
    headers
}

pub(crate) struct StreamReader {
    client: Arc<dyn HttpClient>,
    url: String,
    session: StreamSession,
    observer: Arc<dyn StreamObserver>,
    machine: StateMachine,
    lines: LineDecoder,
    dispatcher: EventDispatcher,
}

impl StreamReader {
    /// `machine` must already be in `Connecting`.
    pub(crate) fn new(
        client: Arc<dyn HttpClient>,
        url: String,
        sentinel: &str,
        session: StreamSession,
        observer: Arc<dyn StreamObserver>,
        machine: StateMachine,
    ) -> Self {
        Self {
            client,
            url,
            session,
            observer,
            machine,
            lines: LineDecoder::new(),
            dispatcher: EventDispatcher::with_sentinel(sentinel),
        }
    }

    pub(crate) async fn run(mut self) {
        let cancel = self.session.cancellation_token().clone();

        let body = match serde_json::to_string(&self.session.request()) {
            Ok(body) => body,
            Err(e) => {
                self.fail(StreamError::Other {
                    message: e.to_string(),
                });
                return;
            }
        };
        let headers = stream_headers();

        debug!("Opening stream to {} for session {}", self.url, self.session.session_id());

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.finish_cancelled();
                return;
            }
            result = self.client.post_stream(&self.url, &body, &headers) => result,
        };

        let mut chunks = match response {
            Ok(chunks) => chunks,
            Err(err) => {
                match StreamError::establishing(err, &self.url) {
                    Some(error) => self.fail(error),
                    None => self.finish_cancelled(),
                }
                return;
            }
        };

        if !self.machine.advance(StreamState::Streaming) {
            return;
        }
        info!("Stream connected: {}", self.url);
        self.observer.on_connection_start();

        let mut received_data = false;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.finish_cancelled();
                    return;
                }
                next = chunks.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    received_data |= !chunk.is_empty();
                    for line in self.lines.feed(&chunk) {
                        if cancel.is_cancelled() {
                            self.finish_cancelled();
                            return;
                        }
                        if let Some(event) = self.dispatcher.dispatch_line(&line) {
                            self.observer.on_event(event);
                        }
                    }
                }
                Some(Err(err)) => {
                    match StreamError::reading(err, received_data) {
                        Some(error) => self.fail(error),
                        None => self.finish_cancelled(),
                    }
                    return;
                }
                None => break,
            }
        }

        if let Some(partial) = self.lines.finish() {
            debug!(
                "Discarding unterminated line at end of stream ({} bytes)",
                partial.len()
            );
        }

        if self.machine.can_advance(StreamState::Closed) {
            let stats = self.dispatcher.stats();
            info!(
                "Stream closed: {} events, {} malformed frames",
                stats.events, stats.malformed
            );
            self.observer.on_close();
            self.machine.advance(StreamState::Closed);
        }
    }

    // Terminal callbacks run before the terminal state is published, so a
    // watcher that sees the state knows every callback has been delivered.
    // The reader is the only writer, so the check cannot go stale.

    fn fail(&self, error: StreamError) {
        if self.machine.can_advance(StreamState::Errored) {
            error!("Stream failed [{}]: {}", error.error_code(), error);
            self.observer.on_error(&error);
            self.machine.advance(StreamState::Errored);
        }
    }

    fn finish_cancelled(&self) {
        if self.machine.can_advance(StreamState::Cancelled) {
            debug!("Stream cancelled: {}", self.url);
            self.observer.on_close();
            self.machine.advance(StreamState::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_headers() {
        let headers = stream_headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Accept"], "text/event-stream");
        assert_eq!(headers["Cache-Control"], "no-cache");
    }
}
