//! Incremental byte-to-line decoding for SSE bodies.
//!
//! Transport chunks arrive at arbitrary boundaries: a chunk may end in the
//! middle of a line or in the middle of a multi-byte UTF-8 sequence. The
//! decoders here buffer both cases so that a line is only emitted once every
//! byte contributing to it has arrived.

/// Streaming UTF-8 decoder.
///
/// Holds back an incomplete multi-byte sequence at the end of a chunk until
/// the next chunk completes it. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder with no buffered bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let mut rest: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            joined = std::mem::take(&mut self.pending);
            &joined
        };

        let mut text = String::with_capacity(rest.len());
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of input
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        text
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any incomplete trailing sequence. Returns true if bytes were dropped.
    pub fn finish(&mut self) -> bool {
        let dropped = !self.pending.is_empty();
        self.pending.clear();
        dropped
    }
}

/// Splits a chunked byte stream into newline-delimited lines.
///
/// Lines are returned without their terminating `\n`. Any `\r` is left in
/// place; the frame parser trims each line before classifying it.
#[derive(Debug, Default)]
pub struct LineDecoder {
    utf8: Utf8Decoder,
    /// Trailing partial line (no newline seen yet)
    carry: String,
}

impl LineDecoder {
    /// Create a new line decoder with an empty carry buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completes, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.utf8.decode(chunk);
        if text.is_empty() {
            return Vec::new();
        }
        self.carry.push_str(&text);

        let Some(last_newline) = self.carry.rfind('\n') else {
            return Vec::new();
        };

        let rest = self.carry.split_off(last_newline + 1);
        let mut complete = std::mem::replace(&mut self.carry, rest);
        complete.pop(); // final '\n'
        complete.split('\n').map(str::to_string).collect()
    }

    /// The partial line waiting for its terminator.
    pub fn carry(&self) -> &str {
        &self.carry
    }

    /// Signal end of input.
    ///
    /// A trailing line without a terminator is never emitted; it is returned
    /// here only so the caller can log what was discarded.
    pub fn finish(&mut self) -> Option<String> {
        let dropped_bytes = self.utf8.finish();
        let carry = std::mem::take(&mut self.carry);
        if carry.is_empty() && !dropped_bytes {
            None
        } else {
            Some(carry)
        }
    }

    /// Clear all buffered state.
    pub fn reset(&mut self) {
        self.utf8.finish();
        self.carry.clear();
    }
}
