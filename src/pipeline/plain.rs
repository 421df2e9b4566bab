//! Raw incremental text: every non-empty decoded read is one chunk.

use super::{ChunkFramer, FrameOutcome};
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct PlainTextStreamer {
    ready: VecDeque<String>,
}

impl PlainTextStreamer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkFramer for PlainTextStreamer {
    fn push(&mut self, text: &str) {
        if !text.is_empty() {
            self.ready.push_back(text.to_string());
        }
    }

    fn next_frame(&mut self) -> Option<FrameOutcome> {
        self.ready.pop_front().map(FrameOutcome::Chunk)
    }
}
