use tokio_util::sync::CancellationToken;

use crate::models::QueryRequest;

/// One query submission. Lives exactly as long as its stream.
///
/// The session id is supplied by the caller and never generated here. Neither
/// the id nor the query is validated.
#[derive(Debug, Clone)]
pub struct StreamSession {
    session_id: String,
    query: String,
    cancel: CancellationToken,
}

impl StreamSession {
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Token the reader observes before every read.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Request body for this submission.
    pub fn request(&self) -> QueryRequest {
        QueryRequest::new(self.session_id.clone(), self.query.clone())
    }
}
