//! # Chunked Copy
//!
//! The one loop both roles share: move exactly `total` bytes from a reader
//! to a writer in bounded chunks, reporting the running byte count after
//! each chunk. The sender runs it file → socket, the receiver socket → file.

use std::io::{self, Read, Write};

/// Where a copy stopped.
///
/// Kept separate from [`TransferError`](crate::TransferError) because the
/// same I/O failure means different things depending on which side is the
/// socket; each role maps these into its own error kinds.
#[derive(Debug)]
pub enum CopyError {
    Read(io::Error),
    Write(io::Error),
    /// The reader ran dry before `expected` bytes were moved.
    UnexpectedEof { copied: u64, expected: u64 },
}

/// Copy exactly `total` bytes from `reader` to `writer`.
///
/// Each read asks for at most `chunk_size` bytes and never more than what is
/// still owed, so nothing past `total` is consumed from the reader. Every
/// chunk is fully written before the next read. `on_chunk` receives the
/// cumulative byte count after each write. With `total == 0` the reader is
/// never touched.
pub fn copy_exact<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    total: u64,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let chunk_size = chunk_size.max(1);
    let mut buf = vec![0u8; chunk_size.min(usize::try_from(total).unwrap_or(usize::MAX))];
    let mut copied: u64 = 0;

    while copied < total {
        let remaining = total - copied;
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));

        let n = match reader.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(CopyError::UnexpectedEof {
                    copied,
                    expected: total,
                })
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        copied += n as u64;
        on_chunk(copied);
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_copies_in_chunks_with_remainder() {
        let data: Vec<u8> = (0..20u8).collect();
        let mut reader = Cursor::new(data.clone());
        let mut writer = Vec::new();
        let mut seen = Vec::new();

        let copied = copy_exact(&mut reader, &mut writer, 20, 7, |n| seen.push(n)).unwrap();

        assert_eq!(copied, 20);
        assert_eq!(writer, data);
        assert_eq!(seen, vec![7, 14, 20]);
    }

    #[test]
    fn test_does_not_read_past_total() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        let mut writer = Vec::new();

        copy_exact(&mut reader, &mut writer, 5, 4096, |_| {}).unwrap();

        assert_eq!(writer, b"hello".to_vec());
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn test_zero_total_touches_nothing() {
        let mut reader = Cursor::new(b"ignored".to_vec());
        let mut writer = Vec::new();
        let mut calls = 0;

        let copied = copy_exact(&mut reader, &mut writer, 0, 4096, |_| calls += 1).unwrap();

        assert_eq!(copied, 0);
        assert_eq!(calls, 0);
        assert_eq!(reader.position(), 0);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_short_reader_is_reported() {
        let mut reader = Cursor::new(b"a".to_vec());
        let mut writer = Vec::new();

        match copy_exact(&mut reader, &mut writer, 3, 4096, |_| {}) {
            Err(CopyError::UnexpectedEof { copied, expected }) => {
                assert_eq!(copied, 1);
                assert_eq!(expected, 3);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        assert_eq!(writer, b"a".to_vec());
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut reader = Cursor::new(b"abc".to_vec());
        let result = copy_exact(&mut reader, &mut Broken, 3, 4096, |_| {});
        assert!(matches!(result, Err(CopyError::Write(_))));
    }
}
