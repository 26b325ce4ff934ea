//! Frame extraction for the hardware link byte stream.
//!
//! The link carries JSON objects concatenated with arbitrary separators
//! and line noise, with no framing beyond the braces themselves. The
//! codec scans for balanced-brace candidates, tolerating partial frames
//! split across reads; a malformed candidate is dropped without blocking
//! the frames behind it.

use std::io;

use bytes::{Buf, BytesMut};
use serde_json::{Map, Value};
use tokio_util::codec::Decoder;

use crate::tracing::prelude::*;

#[derive(Debug, Default)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Map<String, Value>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        loop {
            // Noise before the first opening brace can never start a
            // frame; drop it.
            let Some(start) = src.iter().position(|&b| b == b'{') else {
                src.clear();
                return Ok(None);
            };
            if start > 0 {
                src.advance(start);
            }

            // Candidate ends where brace depth first returns to zero.
            let mut depth = 0usize;
            let mut end = None;
            for (i, &b) in src.iter().enumerate() {
                match b {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            end = Some(i);
                            break;
                        }
                    }
                    _ => {}
                }
            }

            // Partial frame; keep it buffered until more bytes arrive.
            let Some(end) = end else {
                return Ok(None);
            };

            let candidate = src.split_to(end + 1);
            match serde_json::from_slice::<Map<String, Value>>(&candidate) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => {
                    warn!(error = %e, len = candidate.len(), "Discarding malformed frame");
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_all(codec: &mut FrameCodec, buf: &mut BytesMut) -> Vec<Map<String, Value>> {
        let mut out = Vec::new();
        while let Some(record) = codec.decode(buf).expect("codec never errors") {
            out.push(record);
        }
        out
    }

    #[test]
    fn partial_frame_completes_across_chunks() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"garbage{\"power\":1}{\"pow");
        let first = decode_all(&mut codec, &mut buf);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].get("power"), Some(&json!(1)));

        buf.extend_from_slice(b"er\":0}");
        let second = decode_all(&mut codec, &mut buf);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].get("power"), Some(&json!(0)));
    }

    #[test]
    fn leading_noise_is_discarded() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"\x00\xff boot log\n{\"power\":true}"[..]);

        let records = decode_all(&mut codec, &mut buf);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("power"), Some(&json!(true)));
        assert!(buf.is_empty());
    }

    #[test]
    fn noise_without_brace_clears_buffer() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"no frames here"[..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn malformed_frame_does_not_block_the_next() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"{oops}{\"power\":1}"[..]);

        let records = decode_all(&mut codec, &mut buf);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("power"), Some(&json!(1)));
    }

    #[test]
    fn nested_objects_stay_in_one_frame() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"{\"power\":1,\"meta\":{\"rssi\":-40}}"[..]);

        let records = decode_all(&mut codec, &mut buf);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("meta"), Some(&json!({"rssi": -40})));
    }

    #[test]
    fn back_to_back_frames_all_decode() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"{\"power\":1}\r\n{\"power\":0}junk{\"power\":1}"[..]);

        let records = decode_all(&mut codec, &mut buf);
        assert_eq!(records.len(), 3);
    }
}
