//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses and streams
//! - [`mock::RecordingObserver`] - Records stream callbacks

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, RecordingObserver};
pub use reqwest_http::ReqwestHttpClient;
