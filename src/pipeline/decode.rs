//! Incremental UTF-8 decoding (Bytes -> String)
//!
//! Network reads split text at arbitrary byte offsets. The decoder holds back an
//! incomplete trailing sequence and completes it with the next read, so callers
//! never see half a character.

use super::DecodeError;

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
    strict: bool,
}

impl ChunkDecoder {
    /// Lenient decoder: malformed sequences become U+FFFD.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict decoder: malformed sequences are a [`DecodeError`].
    pub fn strict() -> Self {
        Self {
            pending: Vec::new(),
            strict: true,
        }
    }

    /// Number of bytes of an incomplete character carried over to the next call.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode one read. With `is_final` set, an incomplete tail is flushed
    /// (lenient) or rejected (strict) instead of being held back.
    pub fn decode(&mut self, bytes: &[u8], is_final: bool) -> Result<String, DecodeError> {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        let mut consumed = 0usize;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&rest[..valid_up_to]).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            if self.strict {
                                return Err(DecodeError::InvalidUtf8 {
                                    offset: consumed + valid_up_to,
                                });
                            }
                            out.push(REPLACEMENT);
                            consumed += valid_up_to + bad;
                            rest = &rest[valid_up_to + bad..];
                        }
                        None => {
                            let tail = &rest[valid_up_to..];
                            if !is_final {
                                self.pending = tail.to_vec();
                            } else if self.strict {
                                return Err(DecodeError::IncompleteUtf8 { len: tail.len() });
                            } else {
                                out.push(REPLACEMENT);
                            }
                            break;
                        }
                    }
                }
            }
        }

        Ok(out)
    }

    /// End of input for chunked consumers: an incomplete tail is dropped
    /// (lenient) or rejected (strict). Nothing is emitted for it.
    pub fn finish(&mut self) -> Result<(), DecodeError> {
        let tail = std::mem::take(&mut self.pending);
        if self.strict && !tail.is_empty() {
            return Err(DecodeError::IncompleteUtf8 { len: tail.len() });
        }
        Ok(())
    }
}
