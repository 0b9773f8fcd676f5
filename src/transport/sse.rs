//! Incremental decoder for server-sent chat-completion streams
//!
//! Bytes arrive in arbitrary chunks. The accumulator keeps two carry-over
//! buffers between chunks: undecoded bytes of a UTF-8 sequence cut at the
//! chunk edge, and the text of a line that has no newline yet. Neither is
//! ever dropped while the stream is open.

use crate::types::messages::StreamChunk;

/// Prefix of lines that carry a payload
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks a normal end of stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Whether the stream should keep being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// No sentinel seen yet
    Open,
    /// Sentinel seen; further bytes are ignored
    Done,
}

/// Per-request decoding state
///
/// Created for one streaming request and discarded with it.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
    /// Decoded text after the last newline
    line: String,
    /// Concatenated fragments so far
    full_text: String,
    status: Option<StreamStatus>,
}

impl StreamAccumulator {
    /// Fresh accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated so far
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> StreamStatus {
        self.status.unwrap_or(StreamStatus::Open)
    }

    /// Feed one raw chunk
    ///
    /// `on_progress` is called with the full accumulated text once per
    /// fragment, in arrival order. Frames whose JSON does not parse are
    /// skipped. Returns [`StreamStatus::Done`] once the sentinel is seen;
    /// anything after it, in this chunk or later ones, is ignored.
    pub fn feed(&mut self, chunk: &[u8], mut on_progress: impl FnMut(&str)) -> StreamStatus {
        if self.status() == StreamStatus::Done {
            return StreamStatus::Done;
        }

        let decoded = self.decode(chunk);
        self.line.push_str(&decoded);

        while let Some(newline) = self.line.find('\n') {
            let line: String = self.line.drain(..=newline).collect();
            if self.handle_line(&line, &mut on_progress) == StreamStatus::Done {
                self.status = Some(StreamStatus::Done);
                self.line.clear();
                self.pending.clear();
                return StreamStatus::Done;
            }
        }

        StreamStatus::Open
    }

    /// Close the stream and return the final text
    ///
    /// Flushes any incomplete UTF-8 tail (as U+FFFD) and processes a last
    /// line that never got its newline. A stream that closes without the
    /// sentinel is not an error.
    pub fn finish(mut self, mut on_progress: impl FnMut(&str)) -> String {
        if self.status() == StreamStatus::Open {
            if !self.pending.is_empty() {
                let tail = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                self.line.push_str(&tail);
            }
            let last = std::mem::take(&mut self.line);
            if !last.is_empty() {
                self.handle_line(&last, &mut on_progress);
            }
        }
        self.full_text
    }

    /// Decode as much of `pending + chunk` as forms complete characters
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Sequence cut at the chunk edge; wait for more bytes
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }

        out
    }

    fn handle_line(&mut self, line: &str, on_progress: &mut impl FnMut(&str)) -> StreamStatus {
        let line = line.trim_end_matches(['\n', '\r']);
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            return StreamStatus::Open;
        };
        if data == DONE_SENTINEL {
            return StreamStatus::Done;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                if let Some(fragment) = chunk.fragment() {
                    self.full_text.push_str(fragment);
                    on_progress(&self.full_text);
                }
            }
            Err(e) => log::trace!("Skipping unparsable stream frame: {e}"),
        }
        StreamStatus::Open
    }
}
