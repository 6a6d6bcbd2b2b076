//! Unified error handling for agent-stream.
//!
//! This module provides:
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Stream Errors**: The classified terminal failures of a query stream
//! - **Unified Error Type**: `ClientError` consolidates all error types
//! - **Result Type Alias**: `ClientResult<T>` for consistent return types
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout, dropped stream | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Request | Backend rejected the request (4xx) | No |
//! | Protocol | Data the client cannot interpret | No |
//! | Configuration | Invalid local settings | No |
//!
//! Frame-level parse failures are absorbed by the dispatcher and never end a
//! stream; they only surface as `ClientError::Frame` when a caller parses
//! frames directly.

mod category;
mod client_error;
mod result;
mod stream;

// Re-export all public types
pub use category::ErrorCategory;
pub use client_error::ClientError;
pub(crate) use client_error::http_category;
pub use result::ClientResult;
pub use stream::StreamError;
