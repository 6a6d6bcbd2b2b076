//! Backend session creation.
//!
//! A session is the backend's conversation context. Every query stream names
//! one; this module asks the backend for a fresh one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{http_category, ClientResult, ErrorCategory};
use crate::models::SessionResponse;
use crate::traits::{Headers, HttpClient, HttpError};

/// Errors that can occur while creating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The request never got a response
    #[error("Failed to reach session endpoint: {0}")]
    Http(#[from] HttpError),

    /// The backend answered with a non-2xx status
    #[error("Session creation failed with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered with something other than a session
    #[error("Invalid session response: {0}")]
    InvalidResponse(String),
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::Http(err) => http_category(err),
            SessionError::Status { status, .. } => ErrorCategory::from_status(*status),
            SessionError::InvalidResponse(_) => ErrorCategory::Protocol,
        }
    }
}

/// A backend conversation context.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    /// When this client received the session
    pub created_at: DateTime<Utc>,
}

/// Client for the session creation endpoint.
pub struct SessionClient {
    client: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl SessionClient {
    pub fn new(client: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Create a client backed by reqwest.
    pub fn with_reqwest(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = ReqwestHttpClient::with_connect_timeout(config.connect_timeout)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Ask the backend for a new session.
    pub async fn create_session(&self) -> Result<Session, SessionError> {
        let url = self.config.session_url();
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        debug!("Creating session at {}", url);
        let response = self.client.post(&url, "{}", &headers).await?;

        if !response.is_success() {
            return Err(SessionError::Status {
                status: response.status,
                message: response.error_message(),
            });
        }

        let parsed: SessionResponse = response
            .json()
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        if parsed.session_id.trim().is_empty() {
            return Err(SessionError::InvalidResponse(
                "empty session_id".to_string(),
            ));
        }

        info!("Created session {}", parsed.session_id);
        Ok(Session {
            id: parsed.session_id,
            created_at: Utc::now(),
        })
    }
}
