//! Display helpers for task output.

/// Format an execution time given in seconds.
///
/// Sub-second times are shown as whole milliseconds, longer ones as seconds
/// with two decimals.
pub fn format_execution_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{}ms", (seconds * 1000.0).round() as i64)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Truncate `text` to at most `max_chars` characters, ending with `...` when
/// anything was cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept)
}
