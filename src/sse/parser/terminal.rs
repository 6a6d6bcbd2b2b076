//! Terminal event parsers (final answer, execution time, error)

use crate::sse::events::{FrameError, TaskEvent};
use crate::sse::payloads::{ErrorPayload, ExecutionTimePayload, FinalAnswerPayload};

fn invalid_payload(event_type: &str, e: serde_json::Error) -> FrameError {
    FrameError::InvalidPayload {
        event_type: event_type.to_string(),
        reason: e.to_string(),
    }
}

/// Parse final_answer event
pub(super) fn parse_final_answer_event(
    event_type: &str,
    data: serde_json::Value,
) -> Result<TaskEvent, FrameError> {
    let payload: FinalAnswerPayload =
        serde_json::from_value(data).map_err(|e| invalid_payload(event_type, e))?;
    Ok(TaskEvent::FinalAnswer {
        thought: payload.thought,
        answer: payload.answer,
    })
}

/// Parse execution_time event
pub(super) fn parse_execution_time_event(
    event_type: &str,
    data: serde_json::Value,
) -> Result<TaskEvent, FrameError> {
    let payload: ExecutionTimePayload =
        serde_json::from_value(data).map_err(|e| invalid_payload(event_type, e))?;
    Ok(TaskEvent::ExecutionTime { time: payload.time })
}

/// Parse error event
pub(super) fn parse_error_event(
    event_type: &str,
    data: serde_json::Value,
) -> Result<TaskEvent, FrameError> {
    let payload: ErrorPayload =
        serde_json::from_value(data).map_err(|e| invalid_payload(event_type, e))?;
    Ok(TaskEvent::Error {
        error: payload.error,
    })
}
