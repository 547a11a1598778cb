//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines and writes CRLF-terminated ones. Decoding
//! never fails on line content: bytes that are not UTF-8 are replaced, and a
//! line longer than the limit is skipped and reported as [`Line::Overlong`].
//! A decoder error would end the framed stream, so only I/O errors surface.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::MAX_IRC_LINE_LEN;

/// One frame read from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// A complete line without its terminator.
    Text(String),
    /// A line that exceeded the length limit and was discarded.
    Overlong,
}

/// Newline-delimited codec with a length limit.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, terminator included
    max_len: usize,
    /// Set while skipping the rest of an over-long line
    discarding: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::with_max_len(MAX_IRC_LINE_LEN)
    }
}

impl LineCodec {
    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Line>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            if src.len() > self.max_len {
                src.clear();
                self.next_index = 0;
                self.discarding = true;
            } else {
                self.next_index = src.len();
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if std::mem::take(&mut self.discarding) || line.len() > self.max_len {
            return Ok(Some(Line::Overlong));
        }

        let text = String::from_utf8_lossy(&line);
        Ok(Some(Line::Text(
            text.trim_end_matches(['\r', '\n']).to_owned(),
        )))
    }
}

impl Encoder<String> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> io::Result<()> {
        dst.reserve(msg.len() + 2);
        dst.extend_from_slice(msg.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Line> {
        Some(Line::Text(s.to_owned()))
    }

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("PING :test\r\nPING :again\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), text("PING :test"));
        assert_eq!(codec.decode(&mut buf).unwrap(), text("PING :again"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"late\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), text("PING :late"));
    }

    #[test]
    fn test_decode_invalid_utf8_is_replaced() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from(&b"PRIVMSG #test :caf\xe9\r\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            text("PRIVMSG #test :caf\u{fffd}")
        );
    }

    #[test]
    fn test_decode_too_long_is_skipped() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nPING :x\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Line::Overlong));
        assert_eq!(codec.decode(&mut buf).unwrap(), text("PING :x"));
    }

    #[test]
    fn test_decode_too_long_across_reads() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("0123456789abcdef");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        buf.extend_from_slice(b"tail\r\nPING :x\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Line::Overlong));
        assert_eq!(codec.decode(&mut buf).unwrap(), text("PING :x"));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }
}
