mod request;
mod text_utils;

pub use request::{QueryRequest, SessionResponse};
pub use text_utils::{format_execution_time, truncate_text};
