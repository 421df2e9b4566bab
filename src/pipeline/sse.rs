//! Server-Sent-Events framing (String -> frames -> chunks)
//!
//! Frames are separated by a blank line (`"\n\n"`). Within a frame, `event:`
//! names the event, `data:` lines accumulate the payload and `:` lines are
//! comments. A `[DONE]` payload or a `done` event ends the stream.

use super::{ChunkFramer, FrameOutcome};
use std::collections::VecDeque;

pub const FRAME_DELIMITER: &str = "\n\n";
pub const DONE_SIGNAL: &str = "[DONE]";
pub const DONE_EVENT: &str = "done";

/// One parsed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
}

impl SseEvent {
    pub(crate) fn parse(frame: &str) -> Self {
        let mut event_type = None;
        let mut data_lines: Vec<&str> = Vec::new();

        for line in frame.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("event:") {
                event_type = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }

        Self {
            event_type,
            data: data_lines.join("\n"),
        }
    }

    fn is_sentinel(&self) -> bool {
        self.data == DONE_SIGNAL || self.event_type.as_deref() == Some(DONE_EVENT)
    }
}

/// Buffers decoded text and hands out finalized frames one at a time.
#[derive(Debug, Default)]
pub struct SseFrameParser {
    buffer: String,
    /// Byte offset in `buffer` before which no delimiter can start.
    scanned: usize,
    ready: VecDeque<String>,
    terminated: bool,
}

impl SseFrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the trailing frame still waiting for its delimiter.
    pub fn partial(&self) -> &str {
        &self.buffer
    }
}

impl ChunkFramer for SseFrameParser {
    fn push(&mut self, text: &str) {
        if self.terminated {
            return;
        }
        self.buffer.push_str(text);

        // The delimiter may straddle the old buffer end and the new text.
        let mut search_from = self.scanned;
        while !self.buffer.is_char_boundary(search_from) {
            search_from -= 1;
        }

        let mut start = 0;
        while let Some(idx) = self.buffer[search_from..].find(FRAME_DELIMITER) {
            let end = search_from + idx;
            self.ready.push_back(self.buffer[start..end].to_string());
            start = end + FRAME_DELIMITER.len();
            search_from = start;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
        self.scanned = self
            .buffer
            .len()
            .saturating_sub(FRAME_DELIMITER.len() - 1);
    }

    fn next_frame(&mut self) -> Option<FrameOutcome> {
        if self.terminated {
            return Some(FrameOutcome::Terminate);
        }
        while let Some(frame) = self.ready.pop_front() {
            let event = SseEvent::parse(&frame);
            if event.data.is_empty() {
                continue;
            }
            if event.is_sentinel() {
                self.terminated = true;
                self.ready.clear();
                self.buffer.clear();
                self.scanned = 0;
                return Some(FrameOutcome::Terminate);
            }
            return Some(FrameOutcome::Chunk(event.data));
        }
        None
    }
}
