use serde::{Deserialize, Serialize};

/// Body of a streaming query request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// Backend conversation the query belongs to
    pub session_id: String,
    /// Raw text submitted by the user
    pub query: String,
}

impl QueryRequest {
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
        }
    }
}

/// Response of the session creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub session_id: String,
}
