//! SSE payload deserialization structs
//!
//! Contains internal structs used to deserialize the variant-specific fields
//! of a `data:` frame once its `type` discriminator has been checked.

use serde::Deserialize;

/// Agent step payload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StepPayload {
    pub thought: String,
    pub action: String,
    /// String or object; WriteFile/ReadFile steps omit it entirely
    #[serde(default)]
    pub action_input: Option<serde_json::Value>,
    #[serde(default)]
    pub observation: Option<String>,
}

/// Final answer payload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FinalAnswerPayload {
    pub thought: String,
    pub answer: String,
}

/// Execution time payload (seconds)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExecutionTimePayload {
    pub time: f64,
}

/// Backend-reported error payload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    pub error: String,
}
