//! Query streaming against the agent backend.
//!
//! [`SseHandler`] opens one streaming POST per query, decodes the body into
//! lines, dispatches `data:` frames as [`TaskEvent`](crate::sse::TaskEvent)s
//! and reports the lifecycle to a [`StreamObserver`]:
//!
//! ```text
//! open() -> Connecting -> on_connection_start -> on_event* -> on_close
//!                 \                   \
//!                  +------------------+-> on_error
//! ```
//!
//! A handler runs at most one stream at a time. Opening a new stream first
//! cancels the previous one and waits for its reader to finish, so the old
//! stream can no longer deliver events once the new one starts.
//!
//! Cancellation is not an error. A cancelled stream reports `on_close` once
//! and nothing else.

mod observer;
mod reader;
mod session;
mod state;

pub use observer::{ChannelObserver, StreamMessage, StreamObserver};
pub use reader::stream_headers;
pub use session::StreamSession;
pub use state::StreamState;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::traits::HttpClient;
use reader::StreamReader;
use state::StateMachine;

/// Caller's view of one open stream.
///
/// Cheap to clone. Dropping it does not cancel the stream.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    cancel: CancellationToken,
    state: watch::Receiver<StreamState>,
}

impl StreamHandle {
    /// Abort the stream. No `on_event` or `on_error` follows once the reader
    /// observes it; `on_close` fires once. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// True between response headers and the end of the stream.
    pub fn is_connected(&self) -> bool {
        self.state() == StreamState::Streaming
    }

    /// Wait for the stream to reach a terminal state and return it.
    ///
    /// By the time this returns, the stream's final callback has run.
    pub async fn finished(&self) -> StreamState {
        let mut rx = self.state.clone();
        let result = rx.wait_for(|state| state.is_terminal()).await.map(|state| *state);
        match result {
            Ok(state) => state,
            // The reader is gone; whatever it last published is final.
            Err(_) => *rx.borrow(),
        }
    }
}

struct ActiveStream {
    handle: StreamHandle,
    task: JoinHandle<()>,
}

/// Opens query streams and keeps at most one of them running.
///
/// # Example
///
/// ```ignore
/// let (observer, mut messages) = ChannelObserver::channel();
/// let mut handler = SseHandler::with_reqwest(ClientConfig::from_env(), Arc::new(observer))?;
///
/// let handle = handler.open(&session.id, "summarize the repo").await;
/// while let Some(message) = messages.recv().await {
///     if message.is_terminal() { break; }
/// }
/// ```
pub struct SseHandler {
    client: Arc<dyn HttpClient>,
    config: ClientConfig,
    observer: Arc<dyn StreamObserver>,
    active: Option<ActiveStream>,
}

impl SseHandler {
    pub fn new(
        client: Arc<dyn HttpClient>,
        config: ClientConfig,
        observer: Arc<dyn StreamObserver>,
    ) -> Self {
        Self {
            client,
            config,
            observer,
            active: None,
        }
    }

    /// Create a handler backed by reqwest, honoring the configured connect
    /// timeout.
    pub fn with_reqwest(
        config: ClientConfig,
        observer: Arc<dyn StreamObserver>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let client = ReqwestHttpClient::with_connect_timeout(config.connect_timeout)?;
        Ok(Self::new(Arc::new(client), config, observer))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a stream reporting to the handler's observer.
    pub async fn open(&mut self, session_id: &str, query: &str) -> StreamHandle {
        let observer = Arc::clone(&self.observer);
        self.open_with_observer(session_id, query, observer).await
    }

    /// Open a stream reporting to `observer` instead of the handler's own.
    ///
    /// Any stream still running is closed first; its observer receives its
    /// final `on_close` before this stream's first callback.
    pub async fn open_with_observer(
        &mut self,
        session_id: &str,
        query: &str,
        observer: Arc<dyn StreamObserver>,
    ) -> StreamHandle {
        self.close().await;

        let session = StreamSession::new(session_id, query);
        let (machine, state_rx) = StateMachine::new();
        machine.advance(StreamState::Connecting);

        let handle = StreamHandle {
            cancel: session.cancellation_token().clone(),
            state: state_rx,
        };

        let reader = StreamReader::new(
            Arc::clone(&self.client),
            self.config.query_url(),
            &self.config.done_sentinel,
            session,
            observer,
            machine,
        );
        let task = tokio::spawn(reader.run());

        self.active = Some(ActiveStream {
            handle: handle.clone(),
            task,
        });
        handle
    }

    /// Cancel the running stream, if any, and wait for its reader to finish.
    pub async fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        if active.handle.state().is_active() {
            debug!("Closing active stream");
        }
        active.handle.cancel();

        if let Err(e) = active.task.await {
            if e.is_panic() {
                warn!("Stream reader panicked: {}", e);
            }
        }
    }

    /// Whether a stream is connecting or streaming right now.
    pub fn is_active_connection(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.handle.state().is_active())
    }

    /// State of the most recent stream, `Idle` if none was opened.
    pub fn state(&self) -> StreamState {
        self.active
            .as_ref()
            .map(|active| active.handle.state())
            .unwrap_or_default()
    }

    /// Handle of the most recent stream.
    pub fn current(&self) -> Option<&StreamHandle> {
        self.active.as_ref().map(|active| &active.handle)
    }
}

impl Drop for SseHandler {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse, RecordedCall, RecordingObserver};
    use crate::error::StreamError;
    use crate::sse::TaskEvent;
    use crate::traits::HttpError;
    use bytes::Bytes;
    use std::time::Duration;

    const QUERY_URL: &str = "http://localhost:5001/Query";

    fn handler_with(client: MockHttpClient) -> (SseHandler, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let handler = SseHandler::new(Arc::new(client), ClientConfig::default(), observer.clone());
        (handler, observer)
    }

    fn chunks(parts: &[&str]) -> Vec<Bytes> {
        parts.iter().map(|p| Bytes::from(p.to_string())).collect()
    }

    async fn wait_for_calls(observer: &RecordingObserver, count: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while observer.calls().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("observer calls did not arrive");
    }

    #[tokio::test]
    async fn test_clean_stream() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::Stream(chunks(&[
                "data: {\"type\":\"step\",\"thought\":\"t\",\"action\":\"ls\"}\n\n",
                "data: {\"type\":\"final_answer\",\"thought\":\"t\",\"answer\":\"a\"}\n\n",
                "data: {\"type\":\"execution_time\",\"time\":1.5}\n\ndata: [DONE]\n\n",
            ])),
        );
        let (mut handler, observer) = handler_with(client.clone());

        let handle = handler.open("s-1", "list").await;
        assert_eq!(handle.finished().await, StreamState::Closed);

        let calls = observer.calls();
        assert_eq!(calls.first(), Some(&RecordedCall::ConnectionStart));
        assert_eq!(calls.last(), Some(&RecordedCall::Close));
        assert_eq!(observer.events().len(), 3);
        assert_eq!(observer.terminal_count(), 1);
        assert!(!handler.is_active_connection());

        let request = &client.requests()[0];
        assert_eq!(request.url, QUERY_URL);
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"text/event-stream".to_string())
        );
        let body = request.json_body().unwrap();
        assert_eq!(body["session_id"], "s-1");
        assert_eq!(body["query"], "list");
    }

    #[tokio::test]
    async fn test_split_frame_yields_one_event() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::Stream(chunks(&[
                "data: {\"typ",
                "e\":\"execution_time\",\"time\":1.5}\n",
            ])),
        );
        let (mut handler, observer) = handler_with(client);

        handler.open("s", "q").await.finished().await;

        assert_eq!(observer.events(), vec![TaskEvent::ExecutionTime { time: 1.5 }]);
    }

    #[tokio::test]
    async fn test_malformed_frame_between_valid_ones() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::Stream(chunks(&[
                "data: {\"type\":\"step\",\"thought\":\"a\",\"action\":\"x\"}\n",
                "data: {not json\n",
                "data: {\"type\":\"execution_time\",\"time\":2}\n",
            ])),
        );
        let (mut handler, observer) = handler_with(client);

        let state = handler.open("s", "q").await.finished().await;

        assert_eq!(state, StreamState::Closed);
        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type_name(), "step");
        assert_eq!(events[1], TaskEvent::ExecutionTime { time: 2.0 });
        assert!(observer.errors().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::StreamError(HttpError::ConnectionFailed("refused".to_string())),
        );
        let (mut handler, observer) = handler_with(client);

        let state = handler.open("s", "q").await.finished().await;

        assert_eq!(state, StreamState::Errored);
        let calls = observer.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            RecordedCall::Error(StreamError::Unreachable { url, .. }) => {
                assert_eq!(url, QUERY_URL)
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_skips_connection_start() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::StreamError(HttpError::ServerError {
                status: 404,
                message: "Session s not found".to_string(),
            }),
        );
        let (mut handler, observer) = handler_with(client);

        handler.open("s", "q").await.finished().await;

        assert_eq!(
            observer.calls(),
            vec![RecordedCall::Error(StreamError::HttpStatus {
                status: 404,
                message: "Session s not found".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn test_unreadable_body_after_headers() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::StreamThenError(vec![], HttpError::Io("eof".to_string())),
        );
        let (mut handler, observer) = handler_with(client);

        handler.open("s", "q").await.finished().await;

        let calls = observer.calls();
        assert_eq!(calls[0], RecordedCall::ConnectionStart);
        assert!(matches!(
            calls[1],
            RecordedCall::Error(StreamError::Unreadable { .. })
        ));
        assert_eq!(observer.terminal_count(), 1);
    }

    #[tokio::test]
    async fn test_connection_lost_mid_stream() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::StreamThenError(
                chunks(&["data: {\"type\":\"step\",\"thought\":\"a\",\"action\":\"x\"}\n"]),
                HttpError::Io("reset".to_string()),
            ),
        );
        let (mut handler, observer) = handler_with(client);

        let state = handler.open("s", "q").await.finished().await;

        assert_eq!(state, StreamState::Errored);
        assert_eq!(observer.events().len(), 1);
        assert!(matches!(
            observer.errors()[0],
            StreamError::ConnectionLost { .. }
        ));
        assert_eq!(observer.terminal_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_read_is_not_an_error() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::StreamThenError(vec![], HttpError::Cancelled),
        );
        let (mut handler, observer) = handler_with(client);

        let state = handler.open("s", "q").await.finished().await;

        assert_eq!(state, StreamState::Cancelled);
        assert!(observer.errors().is_empty());
        assert_eq!(observer.calls().last(), Some(&RecordedCall::Close));
    }

    #[tokio::test]
    async fn test_cancel_while_connecting() {
        let client = MockHttpClient::new();
        client.set_response(QUERY_URL, MockResponse::Hang);
        let (mut handler, observer) = handler_with(client);

        let handle = handler.open("s", "q").await;
        assert_eq!(handle.state(), StreamState::Connecting);
        assert!(handler.is_active_connection());

        handle.cancel();
        assert_eq!(handle.finished().await, StreamState::Cancelled);
        assert_eq!(observer.calls(), vec![RecordedCall::Close]);
    }

    #[tokio::test]
    async fn test_cancel_while_streaming() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::StreamThenHang(chunks(&[
                "data: {\"type\":\"step\",\"thought\":\"a\",\"action\":\"x\"}\n",
            ])),
        );
        let (mut handler, observer) = handler_with(client);

        let handle = handler.open("s", "q").await;
        wait_for_calls(&observer, 2).await;
        assert!(handle.is_connected());

        handle.cancel();
        assert_eq!(handle.finished().await, StreamState::Cancelled);

        assert_eq!(
            observer.calls(),
            vec![
                RecordedCall::ConnectionStart,
                RecordedCall::Event(TaskEvent::Step {
                    thought: "a".to_string(),
                    action: "x".to_string(),
                    action_input: None,
                    observation: None,
                }),
                RecordedCall::Close,
            ]
        );
    }

    #[tokio::test]
    async fn test_reopen_closes_previous_stream() {
        let client = MockHttpClient::new();
        client.queue_response(
            QUERY_URL,
            MockResponse::StreamThenHang(chunks(&[
                "data: {\"type\":\"step\",\"thought\":\"first\",\"action\":\"x\"}\n",
            ])),
        );
        client.queue_response(
            QUERY_URL,
            MockResponse::Stream(chunks(&["data: {\"type\":\"execution_time\",\"time\":0.5}\n"])),
        );

        let first_observer = Arc::new(RecordingObserver::new());
        let second_observer = Arc::new(RecordingObserver::new());
        let mut handler = SseHandler::new(
            Arc::new(client.clone()),
            ClientConfig::default(),
            first_observer.clone(),
        );

        let first = handler.open("s", "one").await;
        wait_for_calls(&first_observer, 2).await;

        let second = handler
            .open_with_observer("s", "two", second_observer.clone())
            .await;

        // The first stream was torn down before the second was started.
        assert_eq!(first.state(), StreamState::Cancelled);
        assert_eq!(first_observer.events().len(), 1);
        assert_eq!(first_observer.calls().last(), Some(&RecordedCall::Close));

        assert_eq!(second.finished().await, StreamState::Closed);
        assert_eq!(
            second_observer.events(),
            vec![TaskEvent::ExecutionTime { time: 0.5 }]
        );
        assert_eq!(first_observer.events().len(), 1);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_close_without_stream_is_noop() {
        let (mut handler, observer) = handler_with(MockHttpClient::new());
        handler.close().await;
        assert_eq!(handler.state(), StreamState::Idle);
        assert!(handler.current().is_none());
        assert!(observer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_close_after_finish_fires_nothing_more() {
        let client = MockHttpClient::new();
        client.set_response(QUERY_URL, MockResponse::Stream(vec![]));
        let (mut handler, observer) = handler_with(client);

        handler.open("s", "q").await.finished().await;
        handler.close().await;

        assert_eq!(
            observer.calls(),
            vec![RecordedCall::ConnectionStart, RecordedCall::Close]
        );
    }

    #[tokio::test]
    async fn test_trailing_partial_line_is_discarded() {
        let client = MockHttpClient::new();
        client.set_response(
            QUERY_URL,
            MockResponse::Stream(chunks(&["data: {\"type\":\"execution_time\",\"time\":1}"])),
        );
        let (mut handler, observer) = handler_with(client);

        let state = handler.open("s", "q").await.finished().await;

        assert_eq!(state, StreamState::Closed);
        assert!(observer.events().is_empty());
    }

    #[tokio::test]
    async fn test_custom_sentinel() {
        let client = MockHttpClient::new();
        client.set_response(QUERY_URL, MockResponse::Stream(chunks(&["data: <end>\n"])));
        let observer = Arc::new(RecordingObserver::new());
        let mut handler = SseHandler::new(
            Arc::new(client),
            ClientConfig::default().with_done_sentinel("<end>"),
            observer.clone(),
        );

        handler.open("s", "q").await.finished().await;

        assert!(observer.events().is_empty());
        assert!(observer.errors().is_empty());
    }

    #[test]
    fn test_with_reqwest_rejects_bad_config() {
        let observer = Arc::new(RecordingObserver::new());
        let result = SseHandler::with_reqwest(ClientConfig::default().with_base_url(""), observer);
        assert!(result.is_err());
    }
}
