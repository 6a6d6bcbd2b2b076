//! Client configuration.
//!
//! Endpoints and transport settings for talking to the agent backend.

use std::time::Duration;

use tracing::warn;

use crate::error::ClientError;
use crate::sse::DONE_SENTINEL;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Environment variable overriding the backend address.
pub const URL_ENV: &str = "AGENT_STREAM_URL";

/// Environment variable overriding the connect timeout, in seconds.
pub const CONNECT_TIMEOUT_ENV: &str = "AGENT_STREAM_CONNECT_TIMEOUT";

/// Configuration for the stream and session clients.
///
/// Use the builder pattern to customize.
///
/// # Example
///
/// ```ignore
/// use agent_stream::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://10.0.0.5:5001")
///     .with_connect_timeout(Duration::from_secs(3));
/// assert_eq!(config.query_url(), "http://10.0.0.5:5001/Query");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend address (default: http://localhost:5001)
    pub base_url: String,
    /// Path of the streaming query endpoint (default: /Query)
    pub query_path: String,
    /// Path of the session creation endpoint (default: /New_Session)
    pub session_path: String,
    /// How long to wait for a connection (default: 10s)
    pub connect_timeout: Duration,
    /// Payload marking the end of a stream (default: [DONE])
    pub done_sentinel: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            query_path: "/Query".to_string(),
            session_path: "/New_Session".to_string(),
            connect_timeout: Duration::from_secs(10),
            done_sentinel: DONE_SENTINEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend address.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the streaming query endpoint path.
    pub fn with_query_path(mut self, path: impl Into<String>) -> Self {
        self.query_path = path.into();
        self
    }

    /// Set the session creation endpoint path.
    pub fn with_session_path(mut self, path: impl Into<String>) -> Self {
        self.session_path = path.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the end-of-stream sentinel.
    pub fn with_done_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.done_sentinel = sentinel.into();
        self
    }

    /// Create config from `AGENT_STREAM_URL` and `AGENT_STREAM_CONNECT_TIMEOUT`.
    ///
    /// Unset variables keep their defaults. An unparseable timeout is logged
    /// and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var(CONNECT_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.connect_timeout = Duration::from_secs(secs),
                Err(_) => warn!(
                    "Ignoring {}={:?}: expected whole seconds",
                    CONNECT_TIMEOUT_ENV, raw
                ),
            }
        }

        config
    }

    /// Check the settings before any request is made.
    pub fn validate(&self) -> Result<(), ClientError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::Config {
                message: "base URL is empty".to_string(),
            });
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ClientError::Config {
                message: format!("base URL '{}' must start with http:// or https://", base),
            });
        }
        if self.done_sentinel.trim().is_empty() {
            return Err(ClientError::Config {
                message: "done sentinel is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the streaming query endpoint.
    pub fn query_url(&self) -> String {
        join_url(&self.base_url, &self.query_path)
    }

    /// Full URL of the session creation endpoint.
    pub fn session_url(&self) -> String {
        join_url(&self.base_url, &self.session_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}
