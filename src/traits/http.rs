//! Transport seam between the stream machinery and the network.
//!
//! The agent backend is only ever spoken to with POST: a buffered request for
//! session creation and a streaming one for queries. Everything above this
//! trait is transport-agnostic, which is what lets the stream tests script
//! chunk boundaries and failures with the mock client.

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

/// Request headers, name to value.
pub type Headers = HashMap<String, String>;

/// Body chunks of a streaming response, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The backend's explanation for a failed request.
    pub fn error_message(&self) -> String {
        error_message_from_body(&self.body)
    }
}

/// Transport failures.
///
/// `ServerError` is only produced for a non-2xx answer to a streaming POST;
/// buffered POSTs hand the status back in the [`Response`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The caller aborted the request
    #[error("Request cancelled")]
    Cancelled,

    /// The body could not be read to the end
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled)
    }
}

/// Pull the message out of an error body.
///
/// The backend reports failures as `{"error": "..."}`. Anything else comes back
/// as trimmed text; an empty body yields an empty string.
pub fn error_message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

/// POST-only HTTP client used to reach the agent backend.
///
/// # Example
///
/// ```ignore
/// use agent_stream::traits::{Headers, HttpClient};
///
/// let response = client
///     .post("http://localhost:5001/New_Session", "{}", &Headers::new())
///     .await?;
/// assert!(response.is_success());
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a POST and buffer the whole response, whatever its status.
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// Send a POST and hand back the body as it arrives.
    ///
    /// Resolves once response headers are in. A non-2xx status is reported as
    /// [`HttpError::ServerError`] carrying the backend's message, so a returned
    /// stream always belongs to a successful response.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
