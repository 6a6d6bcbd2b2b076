//! Result type alias for client operations.

use super::client_error::ClientError;

/// Type alias for Results using ClientError.
///
/// # Example
///
/// ```ignore
/// use agent_stream::error::ClientResult;
///
/// async fn start(client: &SessionClient) -> ClientResult<Session> {
///     Ok(client.create_session().await?)
/// }
/// ```
pub type ClientResult<T> = Result<T, ClientError>;
