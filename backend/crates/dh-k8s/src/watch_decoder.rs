use crate::{K8sError, Result as K8sErrorResult, WatchEvent};

use bytes::BytesMut;

const INITIAL_CAPACITY: usize = 8192;

/// Splits a chunked watch response into newline-delimited JSON events
#[derive(Debug)]
pub struct WatchDecoder {
    buffer: BytesMut,
}

impl Default for WatchDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete event, or `None` until more bytes arrive.
    pub fn next_event(&mut self) -> Option<K8sErrorResult<WatchEvent>> {
        loop {
            let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
            let mut line = self.buffer.split_to(newline_pos + 1);
            line.truncate(line.len() - 1);

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(decode_line(&line));
        }
    }

    /// Decode whatever is left once the response body ends.
    pub fn finish(&mut self) -> Option<K8sErrorResult<WatchEvent>> {
        if let Some(event) = self.next_event() {
            return Some(event);
        }
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return None;
        }
        let rest = self.buffer.split();
        Some(decode_line(&rest))
    }
}

fn decode_line(line: &[u8]) -> K8sErrorResult<WatchEvent> {
    serde_json::from_slice(line).map_err(|e| K8sError::decode(format!("invalid watch event: {e}")))
}
