//! Scripted HTTP client for tests.
//!
//! Each URL gets a script describing how the backend behaves: a buffered
//! answer, a body that arrives in given chunks, or a failure at any point of
//! the exchange. Every request is recorded for later assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{future, stream};
use futures_util::StreamExt;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

impl RecordedRequest {
    /// The body parsed as JSON, if it is JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// How the mock answers one request.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Buffered answer to `post`
    Success(Response),
    /// Fail `post` before any response
    Error(HttpError),
    /// Stream these chunks, then end cleanly
    Stream(Vec<Bytes>),
    /// Fail `post_stream` before headers
    StreamError(HttpError),
    /// Stream these chunks, then fail the body read
    StreamThenError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then go silent without ending
    StreamThenHang(Vec<Bytes>),
    /// Never answer at all
    Hang,
}

#[derive(Debug, Default)]
struct Script {
    fixed: HashMap<String, MockResponse>,
    queued: HashMap<String, VecDeque<MockResponse>>,
    fallback: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
}

impl Script {
    /// Queued one-shots first, then the fixed answer (exact, then prefix),
    /// then the fallback.
    fn answer_for(&mut self, url: &str) -> Option<MockResponse> {
        if let Some(response) = self.queued.get_mut(url).and_then(VecDeque::pop_front) {
            return Some(response);
        }
        self.fixed
            .get(url)
            .or_else(|| {
                self.fixed
                    .iter()
                    .find(|(prefix, _)| url.starts_with(prefix.as_str()))
                    .map(|(_, response)| response)
            })
            .or(self.fallback.as_ref())
            .cloned()
    }
}

/// [`HttpClient`] that replays scripted answers.
///
/// Clones share the same script, so a test can keep one handle for
/// assertions while the code under test owns another.
///
/// # Example
///
/// ```ignore
/// use agent_stream::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost:5001/Query",
///     MockResponse::StreamThenError(
///         vec![Bytes::from("data: {\"type\":\"step\",")],
///         HttpError::Io("connection reset".to_string()),
///     ),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    script: Arc<Mutex<Script>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every request to `url`, or to a URL it is a prefix of.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.script().fixed.insert(url.to_string(), response);
    }

    /// Answer the next request to `url` once, ahead of any fixed answer.
    pub fn queue_response(&self, url: &str, response: MockResponse) {
        self.script()
            .queued
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Answer requests no other script matches.
    pub fn set_default_response(&self, response: MockResponse) {
        self.script().fallback = Some(response);
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.script().requests.clear();
    }

    fn record(&self, url: &str, body: &str, headers: &Headers) -> Option<MockResponse> {
        let mut script = self.script();
        script.requests.push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });
        script.answer_for(url)
    }
}

fn unscripted(url: &str) -> HttpError {
    HttpError::Other(format!("No mock response for URL: {}", url))
}

fn chunks_then(
    chunks: Vec<Bytes>,
    tail: impl futures::Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
) -> ByteStream {
    Box::pin(stream::iter(chunks.into_iter().map(Ok)).chain(tail))
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        match self.record(url, body, headers) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) | Some(MockResponse::StreamError(err)) => Err(err),
            Some(MockResponse::Hang) => future::pending().await,
            Some(_) => Err(HttpError::Other(
                "Stream response scripted for a buffered request".to_string(),
            )),
            None => Err(unscripted(url)),
        }
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        match self.record(url, body, headers) {
            Some(MockResponse::Stream(chunks)) => Ok(chunks_then(chunks, stream::empty())),
            Some(MockResponse::StreamThenError(chunks, err)) => {
                Ok(chunks_then(chunks, stream::once(future::ready(Err(err)))))
            }
            Some(MockResponse::StreamThenHang(chunks)) => {
                Ok(chunks_then(chunks, stream::pending()))
            }
            Some(MockResponse::Hang) => future::pending().await,
            Some(MockResponse::StreamError(err)) | Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "Buffered response scripted for a stream request".to_string(),
            )),
            None => Err(unscripted(url)),
        }
    }
}
