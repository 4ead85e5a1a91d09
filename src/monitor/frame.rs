//! Frame extraction from a buffered byte stream.
//!
//! Frames are bare JSON values written back to back. There is no length
//! prefix; a frame ends where its outermost object closes.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Incremental JSON frame splitter.
///
/// Object, array and string frames are located with a byte scanner that
/// resumes where the previous call stopped, so a frame delivered over many
/// reads is scanned once. Only the completed slice is handed to `serde_json`.
#[derive(Debug, Default)]
pub(crate) struct FrameDecoder {
    buffer: Vec<u8>,
    scan: Scan,
}

/// Scanner state for the frame at the front of the buffer.
#[derive(Debug, Default)]
struct Scan {
    active: bool,
    pos: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

fn is_json_whitespace(b: &u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

impl FrameDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Buffer to read into. Callers append, never rewrite.
    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    /// Make room for at least `additional` more bytes.
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.buffer.reserve(additional);
    }

    /// Bytes buffered but not yet consumed by a complete frame.
    pub(crate) fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds the start of an unfinished frame.
    pub(crate) fn has_partial(&self) -> bool {
        self.buffer.iter().any(|b| !is_json_whitespace(b))
    }

    /// Extract the next complete frame.
    ///
    /// Returns `Ok(None)` when the buffer holds no complete frame yet; the
    /// partial bytes stay buffered. A frame that fails to parse is consumed
    /// and its error returned.
    pub(crate) fn next_frame(&mut self) -> Result<Option<Value>, serde_json::Error> {
        if !self.scan.active {
            let Some(start) = self.buffer.iter().position(|b| !is_json_whitespace(b)) else {
                self.buffer.clear();
                return Ok(None);
            };
            self.buffer.drain(..start);

            if !matches!(self.buffer[0], b'{' | b'[' | b'"') {
                return self.next_scalar();
            }
            self.scan = Scan {
                active: true,
                ..Scan::default()
            };
        }

        let Some(end) = self.scan_to_end() else {
            return Ok(None);
        };

        let frame = serde_json::from_slice(&self.buffer[..=end]);
        self.buffer.drain(..=end);
        self.scan = Scan::default();
        frame.map(Some)
    }

    /// Advance the scanner over newly buffered bytes. Returns the index of
    /// the byte closing the frame.
    fn scan_to_end(&mut self) -> Option<usize> {
        let scan = &mut self.scan;
        while scan.pos < self.buffer.len() {
            let at = scan.pos;
            let b = self.buffer[at];
            scan.pos += 1;

            if scan.in_string {
                if scan.escaped {
                    scan.escaped = false;
                } else if b == b'\\' {
                    scan.escaped = true;
                } else if b == b'"' {
                    scan.in_string = false;
                    if scan.depth == 0 {
                        return Some(at);
                    }
                }
                continue;
            }

            match b {
                b'"' => scan.in_string = true,
                b'{' | b'[' => scan.depth += 1,
                b'}' | b']' => {
                    scan.depth = scan.depth.saturating_sub(1);
                    if scan.depth == 0 {
                        return Some(at);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Numbers, literals and stray bytes. These are short, so a full parse of
    /// the buffer front is fine.
    fn next_scalar(&mut self) -> Result<Option<Value>, serde_json::Error> {
        let (next, consumed) = {
            let mut frames = serde_json::Deserializer::from_slice(&self.buffer).into_iter::<Value>();
            let next = frames.next();
            (next, frames.byte_offset())
        };

        match next {
            Some(Ok(value)) => {
                self.buffer.drain(..consumed);
                Ok(Some(value))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// Decode one frame into the message type, reporting the failing field path.
pub(crate) fn decode_frame<M: DeserializeOwned>(frame: Value) -> Result<M, String> {
    serde_path_to_error::deserialize(frame).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut FrameDecoder, bytes: &[u8]) {
        decoder.buffer_mut().extend_from_slice(bytes);
    }

    #[test]
    fn splits_concatenated_objects() -> Result<(), serde_json::Error> {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, br#"{"a":1}{"a":2}
 {"a":3}"#);

        let mut seen = Vec::new();
        while let Some(frame) = decoder.next_frame()? {
            seen.push(frame["a"].as_i64());
        }
        assert_eq!(seen, vec![Some(1), Some(2), Some(3)]);
        assert!(!decoder.has_partial());
        Ok(())
    }

    #[test]
    fn keeps_partial_frames_until_completed() -> Result<(), serde_json::Error> {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, br#"{"status":"Down"#);
        assert!(decoder.next_frame()?.is_none());
        assert!(decoder.has_partial());

        feed(&mut decoder, br#"loading"}"#);
        let frame = decoder.next_frame()?;
        assert_eq!(
            frame.as_ref().and_then(|f| f["status"].as_str()),
            Some("Downloading")
        );
        assert_eq!(decoder.pending(), 0);
        Ok(())
    }

    #[test]
    fn syntax_errors_are_reported() {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, br#"{"a":1}{"a":]"#);
        assert!(matches!(decoder.next_frame(), Ok(Some(_))));
        assert!(decoder.next_frame().is_err());
    }

    #[test]
    fn large_frame_is_scanned_incrementally() -> Result<(), serde_json::Error> {
        let blob = "x\\\"{[".repeat(512 * 1024);
        let frame = serde_json::json!({"aux": {"blob": blob}, "id": "big"}).to_string();
        assert!(frame.len() > 2 * 1024 * 1024);

        let mut decoder = FrameDecoder::new();
        let mut decoded = None;
        for chunk in frame.as_bytes().chunks(8 * 1024) {
            assert!(decoded.is_none());
            feed(&mut decoder, chunk);
            decoded = decoder.next_frame()?;
            if decoded.is_none() {
                // Every buffered byte has been scanned exactly once.
                assert_eq!(decoder.scan.pos, decoder.pending());
            }
        }

        let decoded = decoded.map(|v| v["aux"]["blob"].as_str().map(str::len));
        assert_eq!(decoded, Some(Some(blob.len())));
        assert_eq!(decoder.pending(), 0);
        Ok(())
    }

    #[test]
    fn brackets_inside_strings_do_not_end_the_frame() -> Result<(), serde_json::Error> {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, br#"{"stream":"}]\"}"#);
        assert!(decoder.next_frame()?.is_none());
        feed(&mut decoder, br#""} 7 "tail""#);

        let frame = decoder.next_frame()?;
        assert_eq!(
            frame.as_ref().and_then(|f| f["stream"].as_str()),
            Some("}]\"}")
        );
        assert_eq!(decoder.next_frame()?, Some(serde_json::json!(7)));
        assert_eq!(decoder.next_frame()?, Some(serde_json::json!("tail")));
        assert!(!decoder.has_partial());
        Ok(())
    }

    #[test]
    fn decode_errors_name_the_field() {
        #[derive(Debug, serde::Deserialize)]
        struct Msg {
            #[allow(dead_code)]
            count: u32,
        }

        let err = decode_frame::<Msg>(serde_json::json!({"count": "many"})).err();
        assert!(err.is_some_and(|e| e.starts_with("count")));
    }
}
