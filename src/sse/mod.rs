//! SSE (Server-Sent Events) stream decoding
//!
//! Decodes the agent backend's streaming response. The wire format is
//! newline-delimited text:
//! - `data: <json>` - task event payload, discriminated by its `type` field
//! - `data: [DONE]` - completion sentinel (no event)
//! - Empty lines and lines starting with `:` - keep-alives/comments (ignored)
//!
//! # Module structure
//! - `decoder` - Incremental UTF-8 and line framing (LineDecoder)
//! - `events` - Event type definitions (TaskEvent, SseLine, FrameError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Frame parsing and dispatch (EventDispatcher, parse_frame)

mod decoder;
mod events;
mod parser;
mod payloads;

// Re-export public types
pub use decoder::{LineDecoder, Utf8Decoder};
pub use events::{FrameError, SseLine, TaskEvent};
pub use parser::{
    parse_frame, parse_sse_line, parse_task_event, DispatchStats, EventDispatcher, Frame,
    DONE_SENTINEL,
};
