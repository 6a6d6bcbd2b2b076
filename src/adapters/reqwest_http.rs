//! reqwest transport for the agent backend.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use crate::traits::{error_message_from_body, ByteStream, Headers, HttpClient, HttpError, Response};

/// [`HttpClient`] backed by a shared `reqwest::Client`.
///
/// No overall request timeout is set: a query stream stays open for as long as
/// the agent keeps working. Only connection establishment is bounded.
///
/// # Example
///
/// ```ignore
/// use agent_stream::adapters::ReqwestHttpClient;
///
/// let client = ReqwestHttpClient::with_connect_timeout(Duration::from_secs(10))?;
/// let chunks = client.post_stream(&url, &body, &stream_headers()).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (proxies, TLS roots, pools).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Create a client that gives up connecting after `timeout`.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map(Self::with_client)
            .map_err(|e| HttpError::Other(e.to_string()))
    }

    fn request(&self, url: &str, body: &str, headers: &Headers) -> reqwest::RequestBuilder {
        headers.iter().fold(
            self.client.post(url).body(body.to_string()),
            |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
        )
    }
}

/// Classify a failure to get response headers.
fn send_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::ConnectionFailed(describe_connect_error(&err))
    } else if err.is_builder() {
        HttpError::InvalidUrl(err.to_string())
    } else {
        HttpError::Other(err.to_string())
    }
}

/// Classify a failure while reading the body.
fn body_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else {
        HttpError::Io(err.to_string())
    }
}

/// Name the usual culprits of a failed connect.
fn describe_connect_error(err: &reqwest::Error) -> String {
    let text = err.to_string();
    let cause = std::error::Error::source(err)
        .map(|s| s.to_string().to_lowercase())
        .unwrap_or_default();

    let prefix = if cause.contains("dns") || cause.contains("resolve") {
        "DNS resolution failed"
    } else if cause.contains("refused") {
        "Connection refused"
    } else if cause.contains("tls") || cause.contains("certificate") {
        "TLS handshake failed"
    } else {
        return text;
    };
    format!("{}: {}", prefix, text)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = self
            .request(url, body, headers)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(body_error)?;
        Ok(Response::new(status, body))
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let response = self
            .request(url, body, headers)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .bytes()
                .await
                .map(|body| error_message_from_body(&body))
                .unwrap_or_default();
            debug!(status = status.as_u16(), %message, "Stream request rejected");
            return Err(HttpError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(body_error))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_connect_timeout() {
        assert!(ReqwestHttpClient::with_connect_timeout(Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_request_carries_headers() {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        let request = ReqwestHttpClient::new()
            .request("http://localhost:5001/Query", "{}", &headers)
            .build()
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()["accept"], "text/event-stream");
    }

    #[tokio::test]
    async fn test_post_invalid_url() {
        let result = ReqwestHttpClient::new()
            .post("not-a-valid-url", "{}", &Headers::new())
            .await;
        assert!(matches!(
            result,
            Err(HttpError::InvalidUrl(_)) | Err(HttpError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_post_stream_connection_refused() {
        // Nothing listens on port 1
        let result = ReqwestHttpClient::new()
            .post_stream("http://127.0.0.1:1/Query", "{}", &Headers::new())
            .await;
        match result {
            Err(HttpError::ConnectionFailed(message)) => {
                assert!(!message.is_empty());
            }
            Err(other) => panic!("expected connection failure, got {:?}", other),
            Ok(_) => panic!("expected connection failure"),
        }
    }
}
