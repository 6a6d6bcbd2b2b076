//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses and streams
//! - [`RecordingObserver`] - Stream observer that records its callbacks

pub mod http;
pub mod observer;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use observer::{RecordedCall, RecordingObserver};
