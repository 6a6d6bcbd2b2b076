//! Step event parser

use crate::sse::events::{FrameError, TaskEvent};
use crate::sse::payloads::StepPayload;

/// Parse step event
pub(super) fn parse_step_event(
    event_type: &str,
    data: serde_json::Value,
) -> Result<TaskEvent, FrameError> {
    let payload: StepPayload =
        serde_json::from_value(data).map_err(|e| FrameError::InvalidPayload {
            event_type: event_type.to_string(),
            reason: e.to_string(),
        })?;
    Ok(TaskEvent::Step {
        thought: payload.thought,
        action: payload.action,
        action_input: payload.action_input,
        observation: payload.observation,
    })
}
