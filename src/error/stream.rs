//! Streaming-related error types.
//!
//! This module defines the errors a query stream can end with, and the
//! classification of transport failures into them. Cancellation is not an
//! error: the classifiers return `None` for it.

use std::fmt;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Terminal stream failure reported through `StreamObserver::on_error`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The backend could not be reached before response headers arrived.
    Unreachable { url: String, message: String },

    /// The backend answered with a non-2xx status.
    HttpStatus { status: u16, message: String },

    /// Headers arrived but the body could not be read.
    Unreadable { message: String },

    /// The connection dropped after the stream had delivered data.
    ConnectionLost { message: String },

    /// Any other failure while establishing the stream.
    Other { message: String },
}

impl StreamError {
    /// Classify a failure that happened before response headers arrived.
    ///
    /// Returns `None` when the request was cancelled.
    pub fn establishing(err: HttpError, url: &str) -> Option<Self> {
        let classified = match err {
            HttpError::Cancelled => return None,
            HttpError::ConnectionFailed(message)
            | HttpError::Timeout(message)
            | HttpError::InvalidUrl(message) => StreamError::Unreachable {
                url: url.to_string(),
                message,
            },
            HttpError::ServerError { status, message } => {
                StreamError::HttpStatus { status, message }
            }
            HttpError::Io(message) | HttpError::Other(message) => StreamError::Other { message },
        };
        Some(classified)
    }

    /// Classify a failed body read.
    ///
    /// A failure before any body bytes arrived means the body was unreadable;
    /// afterwards it means the connection was lost. Returns `None` when the
    /// read was cancelled.
    pub fn reading(err: HttpError, received_data: bool) -> Option<Self> {
        if matches!(err, HttpError::Cancelled) {
            return None;
        }
        let message = err.to_string();
        Some(if received_data {
            StreamError::ConnectionLost { message }
        } else {
            StreamError::Unreadable { message }
        })
    }

    /// Category used for retry and messaging decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Unreachable { .. }
            | StreamError::Unreadable { .. }
            | StreamError::ConnectionLost { .. }
            | StreamError::Other { .. } => ErrorCategory::Network,
            StreamError::HttpStatus { status, .. } => ErrorCategory::from_status(*status),
        }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Unreachable { url, .. } => format!(
                "Unable to connect to server. Please check if the backend is running at {}",
                url
            ),
            StreamError::HttpStatus { status, message } => {
                if message.is_empty() {
                    format!("Server error: HTTP {}", status)
                } else {
                    format!("Server error: HTTP {}: {}", status, message)
                }
            }
            StreamError::Unreadable { .. } => "Error reading response stream".to_string(),
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost while streaming".to_string()
            }
            StreamError::Other { message } => format!("Connection error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Unreachable { .. } => "E_STREAM_UNREACHABLE",
            StreamError::HttpStatus { .. } => "E_STREAM_HTTP",
            StreamError::Unreadable { .. } => "E_STREAM_UNREADABLE",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::Other { .. } => "E_STREAM_OTHER",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Unreachable { url, message } => {
                write!(f, "Cannot reach '{}': {}", url, message)
            }
            StreamError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            StreamError::Unreadable { message } => {
                write!(f, "Response body unreadable: {}", message)
            }
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::Other { message } => write!(f, "Stream error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:5001/Query";

    #[test]
    fn test_cancellation_is_not_an_error() {
        assert_eq!(StreamError::establishing(HttpError::Cancelled, URL), None);
        assert_eq!(StreamError::reading(HttpError::Cancelled, true), None);
        assert_eq!(StreamError::reading(HttpError::Cancelled, false), None);
    }

    #[test]
    fn test_connect_failure_is_unreachable() {
        let err = StreamError::establishing(
            HttpError::ConnectionFailed("connection refused".to_string()),
            URL,
        )
        .unwrap();
        assert!(matches!(err, StreamError::Unreachable { .. }));
        assert!(err.user_message().contains("Unable to connect to server"));
        assert!(err.user_message().contains(URL));
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_STREAM_UNREACHABLE");
    }

    #[test]
    fn test_timeout_is_unreachable() {
        let err =
            StreamError::establishing(HttpError::Timeout("10s".to_string()), URL).unwrap();
        assert!(matches!(err, StreamError::Unreachable { .. }));
    }

    #[test]
    fn test_status_error() {
        let err = StreamError::establishing(
            HttpError::ServerError {
                status: 404,
                message: "Session abc not found".to_string(),
            },
            URL,
        )
        .unwrap();
        assert_eq!(
            err.user_message(),
            "Server error: HTTP 404: Session abc not found"
        );
        assert_eq!(err.category(), ErrorCategory::Request);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_error_without_message() {
        let err = StreamError::HttpStatus {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Server error: HTTP 502");
        assert_eq!(err.category(), ErrorCategory::Server);
    }

    #[test]
    fn test_read_failure_before_data_is_unreadable() {
        let err = StreamError::reading(HttpError::Io("reset".to_string()), false).unwrap();
        assert!(matches!(err, StreamError::Unreadable { .. }));
        assert_eq!(err.user_message(), "Error reading response stream");
    }

    #[test]
    fn test_read_failure_after_data_is_connection_lost() {
        let err = StreamError::reading(HttpError::Io("reset".to_string()), true).unwrap();
        assert!(matches!(err, StreamError::ConnectionLost { .. }));
        assert_eq!(err.error_code(), "E_STREAM_CONN");
    }

    #[test]
    fn test_other_error_message() {
        let err = StreamError::establishing(HttpError::Other("weird".to_string()), URL).unwrap();
        assert_eq!(err.user_message(), "Connection error: weird");
    }

    #[test]
    fn test_display_format() {
        let err = StreamError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(format!("{}", err), "HTTP 500 error: boom");
    }
}
