//! Mock implementations for test fixtures.
//!
//! Re-exports the recording observer and adds a builder
//! for scripting the backend's two endpoints.

pub use agent_stream::adapters::mock::RecordingObserver;

use agent_stream::adapters::mock::{MockHttpClient, MockResponse};
use agent_stream::traits::Response;

use bytes::Bytes;

pub const QUERY_URL: &str = "http://localhost:5001/Query";
pub const SESSION_URL: &str = "http://localhost:5001/New_Session";

/// Configuration for setting up mock backend responses.
pub struct MockHttpConfig {
    client: MockHttpClient,
}

impl MockHttpConfig {
    /// Creates a new mock HTTP configuration.
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Stream the query endpoint body in the given chunks.
    pub fn with_query_chunks<I, C>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        self.client.set_response(
            QUERY_URL,
            MockResponse::Stream(chunks.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Answer the session endpoint.
    pub fn with_session_response(self, status: u16, json: &str) -> Self {
        self.client.set_response(
            SESSION_URL,
            MockResponse::Success(Response::new(status, Bytes::from(json.to_string()))),
        );
        self
    }

    /// Builds the configured MockHttpClient.
    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockHttpConfig {
    fn default() -> Self {
        Self::new()
    }
}
