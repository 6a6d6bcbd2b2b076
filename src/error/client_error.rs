//! Unified error type for the agent-stream client.
//!
//! `ClientError` consolidates the transport, stream, session and frame errors
//! into one enum so callers get uniform categorization and messaging.

use std::fmt;

use super::category::ErrorCategory;
use super::stream::StreamError;
use crate::session::SessionError;
use crate::sse::FrameError;
use crate::traits::HttpError;

/// Unified error type for the client.
#[derive(Debug)]
pub enum ClientError {
    /// Transport-level failure outside a stream.
    Http(HttpError),

    /// Terminal failure of a query stream.
    Stream(StreamError),

    /// Session creation failure.
    Session(SessionError),

    /// A frame the backend sent could not be interpreted.
    Frame(FrameError),

    /// Invalid local configuration.
    Config { message: String },
}

/// Categorize a transport error.
pub(crate) fn http_category(err: &HttpError) -> ErrorCategory {
    match err {
        HttpError::ConnectionFailed(_)
        | HttpError::Timeout(_)
        | HttpError::Io(_)
        | HttpError::Cancelled
        | HttpError::Other(_) => ErrorCategory::Network,
        HttpError::ServerError { status, .. } => ErrorCategory::from_status(*status),
        HttpError::InvalidUrl(_) => ErrorCategory::Configuration,
    }
}

impl ClientError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Http(err) => http_category(err),
            ClientError::Stream(err) => err.category(),
            ClientError::Session(err) => err.category(),
            ClientError::Frame(_) => ErrorCategory::Protocol,
            ClientError::Config { .. } => ErrorCategory::Configuration,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(err) => err.to_string(),
            ClientError::Stream(err) => err.user_message(),
            ClientError::Session(err) => err.to_string(),
            ClientError::Frame(err) => format!("Received invalid data from server: {}", err),
            ClientError::Config { message } => format!("Configuration error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Http(_) => "E_HTTP",
            ClientError::Stream(err) => err.error_code(),
            ClientError::Session(_) => "E_SESSION",
            ClientError::Frame(_) => "E_FRAME",
            ClientError::Config { .. } => "E_CONFIG",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(err) => write!(f, "{}", err),
            ClientError::Stream(err) => write!(f, "{}", err),
            ClientError::Session(err) => write!(f, "{}", err),
            ClientError::Frame(err) => write!(f, "{}", err),
            ClientError::Config { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Http(err) => Some(err),
            ClientError::Stream(err) => Some(err),
            ClientError::Session(err) => Some(err),
            ClientError::Frame(err) => Some(err),
            ClientError::Config { .. } => None,
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<HttpError> for ClientError {
    fn from(err: HttpError) -> Self {
        ClientError::Http(err)
    }
}

impl From<StreamError> for ClientError {
    fn from(err: StreamError) -> Self {
        ClientError::Stream(err)
    }
}

impl From<SessionError> for ClientError {
    fn from(err: SessionError) -> Self {
        ClientError::Session(err)
    }
}

impl From<FrameError> for ClientError {
    fn from(err: FrameError) -> Self {
        ClientError::Frame(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_http_error_category() {
        let err = ClientError::from(HttpError::ConnectionFailed("refused".to_string()));
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());

        let err = ClientError::from(HttpError::InvalidUrl("nope".to_string()));
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_stream_error_category() {
        let err = ClientError::from(StreamError::HttpStatus {
            status: 503,
            message: "busy".to_string(),
        });
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.error_code(), "E_STREAM_HTTP");
        assert!(err.user_message().contains("503"));
    }

    #[test]
    fn test_frame_error_is_protocol() {
        let err = ClientError::from(FrameError::MissingType);
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert_eq!(err.error_code(), "E_FRAME");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_session_error_conversion() {
        let err = ClientError::from(SessionError::InvalidResponse("no session_id".to_string()));
        assert_eq!(err.error_code(), "E_SESSION");
        assert!(err.to_string().contains("no session_id"));
    }

    #[test]
    fn test_config_error() {
        let err = ClientError::Config {
            message: "empty base URL".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.source().is_none());
        assert_eq!(err.recovery_hint(), ErrorCategory::Configuration.recovery_hint());
    }
}
