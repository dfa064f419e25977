//! # Frame Header
//!
//! The only framing on the wire is a decimal byte count terminated by a
//! newline, sent once before the payload:
//!
//! ```text
//! <decimal-ascii-byte-count> '\n' <raw-payload-bytes>
//! ```
//!
//! The header may arrive split across TCP segments, and the read that
//! completes it may also carry the first payload bytes. [`read_header`]
//! handles both: it keeps reading until it sees the newline (within a
//! bounded buffer) and hands back whatever followed it as [`Header::leftover`].

use std::io::{self, Read};

use crate::common::error::TransferError;

/// Parsed header plus any payload bytes that arrived in the same reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Number of payload bytes announced by the peer
    pub payload_len: u64,
    /// Bytes read past the newline; these belong to the payload
    pub leftover: Vec<u8>,
}

/// Encode the header announcing `payload_len` bytes.
pub fn encode_header(payload_len: u64) -> Vec<u8> {
    format!("{}\n", payload_len).into_bytes()
}

/// Parse the bytes preceding the newline as a non-negative decimal integer.
///
/// Surrounding ASCII whitespace (including a trailing `\r`) is tolerated.
/// Signs, empty headers and values that overflow `u64` are rejected.
pub fn parse_header(line: &[u8]) -> Result<u64, TransferError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| TransferError::Protocol("header is not valid UTF-8".to_string()))?
        .trim();

    if text.is_empty() {
        return Err(TransferError::Protocol("empty header".to_string()));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransferError::Protocol(format!(
            "header {:?} is not a byte count",
            text
        )));
    }

    text.parse::<u64>()
        .map_err(|e| TransferError::Protocol(format!("header {:?} out of range: {}", text, e)))
}

/// Read from `reader` until the header newline is seen.
///
/// At most `max_len` bytes are buffered; a header that does not terminate
/// within that window, or a stream that closes first, is a protocol error.
pub fn read_header<R: Read + ?Sized>(
    reader: &mut R,
    max_len: usize,
) -> Result<Header, TransferError> {
    let mut buf: Vec<u8> = Vec::with_capacity(max_len);
    let mut scratch = vec![0u8; max_len];

    loop {
        if buf.len() >= max_len {
            return Err(TransferError::Protocol(format!(
                "no header newline within {} bytes",
                max_len
            )));
        }

        let want = max_len - buf.len();
        let n = match reader.read(&mut scratch[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::socket("reading header", e)),
        };

        if n == 0 {
            let reason = if buf.is_empty() {
                "connection closed before header".to_string()
            } else {
                format!("connection closed after {} header bytes without newline", buf.len())
            };
            return Err(TransferError::Protocol(reason));
        }

        let searched = buf.len();
        buf.extend_from_slice(&scratch[..n]);

        if let Some(offset) = buf[searched..].iter().position(|&b| b == b'\n') {
            let newline = searched + offset;
            let leftover = buf.split_off(newline + 1);
            buf.truncate(newline);
            let payload_len = parse_header(&buf)?;
            return Ok(Header {
                payload_len,
                leftover,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorKind;
    use std::io::Cursor;

    const MAX: usize = crate::common::config::MAX_HEADER_LEN;

    /// Reader that hands out one byte per call, like a header trickling in.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_encode_header() {
        assert_eq!(encode_header(48), b"48\n".to_vec());
        assert_eq!(encode_header(0), b"0\n".to_vec());
    }

    #[test]
    fn test_parse_header_accepts_digits() {
        assert_eq!(parse_header(b"48").unwrap(), 48);
        assert_eq!(parse_header(b"0").unwrap(), 0);
        assert_eq!(parse_header(b"007").unwrap(), 7);
        assert_eq!(parse_header(b"10000\r").unwrap(), 10000);
    }

    #[test]
    fn test_parse_header_rejects_garbage() {
        let cases: [&[u8]; 6] = [b"", b"abc", b"-3", b"+3", b"1 2", b"99999999999999999999999"];
        for bad in cases {
            let err = parse_header(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ProtocolError, "input {:?}", bad);
        }
    }

    #[test]
    fn test_read_header_keeps_payload_after_newline() {
        let mut stream = Cursor::new(b"48\nThis is".to_vec());
        let header = read_header(&mut stream, MAX).unwrap();
        assert_eq!(header.payload_len, 48);
        assert_eq!(header.leftover, b"This is".to_vec());
    }

    #[test]
    fn test_read_header_split_across_reads() {
        let mut stream = Trickle(Cursor::new(b"4096\nxyz".to_vec()));
        let header = read_header(&mut stream, MAX).unwrap();
        assert_eq!(header.payload_len, 4096);
        // One byte per read, so nothing past the newline was consumed yet.
        assert!(header.leftover.is_empty());
    }

    #[test]
    fn test_read_header_without_newline_in_bound() {
        let mut stream = Cursor::new(vec![b'1'; 32]);
        let err = read_header(&mut stream, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolError);
    }

    #[test]
    fn test_read_header_closed_early() {
        let mut empty = Cursor::new(Vec::new());
        assert_eq!(
            read_header(&mut empty, MAX).unwrap_err().kind(),
            ErrorKind::ProtocolError
        );

        let mut partial = Cursor::new(b"12".to_vec());
        assert_eq!(
            read_header(&mut partial, MAX).unwrap_err().kind(),
            ErrorKind::ProtocolError
        );
    }
}
