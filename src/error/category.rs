//! Error category classification for unified error handling.
//!
//! Categories give callers one place to decide whether to retry, what to tell
//! the user, and whether the problem is on this side of the wire or the other.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, or dropped stream.
    /// Generally transient and retryable.
    Network,

    /// Backend responded with a 5xx status.
    /// Generally transient and retryable after delay.
    Server,

    /// Backend rejected the request (4xx): unknown session, missing model.
    Request,

    /// Backend sent data this client cannot interpret.
    Protocol,

    /// Invalid base URL or other local configuration problem.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            ErrorCategory::Server
        } else {
            ErrorCategory::Request
        }
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Request => "request",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the backend is running and reachable",
            ErrorCategory::Server => {
                "The backend may be experiencing issues. Please try again later"
            }
            ErrorCategory::Request => {
                "Check the session and the backend's model and API key settings"
            }
            ErrorCategory::Protocol => "The backend may be running an incompatible version",
            ErrorCategory::Configuration => "Check the configured backend URL",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
