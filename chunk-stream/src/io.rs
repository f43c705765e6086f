//! Read extension trait and the chunk-preserving copy loop.
//!
//! [`ChunkReadExt`] is blanket-implemented for every [`Read`], so any source can be wrapped
//! in a [`ThrottledReader`] with a method call:
//!
//! ```
//! use std::io::{self, Cursor};
//! use std::time::Duration;
//! use chunk_stream::io::{ChunkReadExt, copy_chunks};
//!
//! let mut reader = Cursor::new(b"hello world".to_vec())
//!     .throttle_reads(4usize, Duration::from_millis(1));
//! let mut out = Vec::new();
//! let mut buf = [0u8; 4];
//!
//! let copied = copy_chunks(&mut reader, &mut out, &mut buf)?;
//! assert_eq!(copied, 11);
//! assert_eq!(out, b"hello world");
//! # Ok::<(), io::Error>(())
//! ```
//!
//! [`copy_chunks`] differs from [`std::io::copy`] in two ways: it reads through the buffer
//! the caller hands it (so the buffer length bounds every read), and it flushes the writer
//! after each chunk so a consumer on the other side sees the chunks as they happen.
use std::{
    io::{self, Read, Write},
    time,
};

use crate::{
    delay::Delay,
    diagnostics::Diagnostics,
    size::Size,
    throttler::ThrottledReader,
};

/// Read-side ergonomics for the throttling adapter.
pub trait ChunkReadExt: Read {
    /// Cap every read at `size` bytes without any delay.
    #[must_use]
    fn chunk_reads<S: Size>(self, size: S) -> ThrottledReader<Self, S, time::Duration>
    where
        Self: Sized,
    {
        ThrottledReader::new(self, size, time::Duration::ZERO)
    }

    /// Sleep after every successful read without capping its size.
    #[must_use]
    fn delay_reads<D: Delay>(self, delay: D) -> ThrottledReader<Self, usize, D>
    where
        Self: Sized,
    {
        ThrottledReader::new(self, 0usize, delay)
    }

    /// Cap every read at `size` bytes and sleep `delay` after each one.
    #[must_use]
    fn throttle_reads<S: Size, D: Delay>(self, size: S, delay: D) -> ThrottledReader<Self, S, D>
    where
        Self: Sized,
    {
        ThrottledReader::new(self, size, delay)
    }

    /// Same as [`throttle_reads`](Self::throttle_reads), reporting every read to
    /// `diagnostics`.
    #[must_use]
    fn throttle_reads_with<S: Size, D: Delay, O: Diagnostics>(
        self,
        size: S,
        delay: D,
        diagnostics: O,
    ) -> ThrottledReader<Self, S, D, O>
    where
        Self: Sized,
    {
        ThrottledReader::with_diagnostics(self, size, delay, diagnostics)
    }
}

impl<T: Read> ChunkReadExt for T {}

/// Copies `reader` into `writer` until end of stream, one read per chunk.
///
/// Each chunk is written in full and followed by a flush. `Interrupted` reads are retried;
/// any other error is returned as is. Returns the number of bytes copied.
///
/// # Errors
/// Returns `InvalidInput` if `buf` is empty, since no progress could be made.
pub fn copy_chunks<R, W>(reader: &mut R, writer: &mut W, buf: &mut [u8]) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if buf.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "copy buffer must not be empty",
        ));
    }

    let mut copied = 0u64;
    loop {
        let n = match reader.read(buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buf[..n])?;
        writer.flush()?;
        copied += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::WriteDiagnostics;
    use std::io::Cursor;

    /// Writer that logs each write and flush.
    #[derive(Default)]
    struct EventLog {
        events: Vec<String>,
    }

    impl Write for EventLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.events
                .push(format!("write {}", String::from_utf8_lossy(buf)));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.events.push("flush".to_string());
            Ok(())
        }
    }

    /// Source that is interrupted once before every successful read.
    struct Flaky {
        inner: Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if self.interrupt_next {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn copies_ten_bytes_in_four_byte_chunks() {
        let mut reader =
            Cursor::new(b"ABCDEFGHIJ".to_vec()).throttle_reads(4usize, time::Duration::ZERO);
        let mut out = EventLog::default();
        let mut buf = [0u8; 4];

        let copied = copy_chunks(&mut reader, &mut out, &mut buf).unwrap();

        assert_eq!(copied, 10);
        assert_eq!(
            out.events,
            vec![
                "write ABCD",
                "flush",
                "write EFGH",
                "flush",
                "write IJ",
                "flush"
            ]
        );
    }

    #[test]
    fn buffer_length_bounds_chunks() {
        let mut reader = Cursor::new(b"ABCDEFGHIJ".to_vec()).chunk_reads(0usize);
        let mut out = EventLog::default();
        let mut buf = [0u8; 6];

        copy_chunks(&mut reader, &mut out, &mut buf).unwrap();

        assert_eq!(out.events, vec!["write ABCDEF", "flush", "write GHIJ", "flush"]);
    }

    #[test]
    fn retries_interrupted_reads() {
        let mut reader = Flaky {
            inner: Cursor::new(b"xyz".to_vec()),
            interrupt_next: false,
        }
        .chunk_reads(1usize);
        let mut out = Vec::new();

        let copied = copy_chunks(&mut reader, &mut out, &mut [0u8; 8]).unwrap();
        assert_eq!(copied, 3);
        assert_eq!(out, b"xyz");
    }

    #[test]
    fn propagates_read_errors() {
        struct Missing;
        impl Read for Missing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }

        let mut out = Vec::new();
        let mut reader = Missing.delay_reads(time::Duration::from_secs(5));
        let err = copy_chunks(&mut reader, &mut out, &mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_empty_buffer() {
        let err = copy_chunks(&mut io::empty(), &mut io::sink(), &mut [0u8; 0]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn throttle_reads_with_reports_to_sink() {
        let mut reader = Cursor::new(b"abc".to_vec()).throttle_reads_with(
            2usize,
            time::Duration::ZERO,
            WriteDiagnostics::new(Vec::new()),
        );

        copy_chunks(&mut reader, &mut io::sink(), &mut [0u8; 8]).unwrap();

        let log = String::from_utf8(reader.diagnostics().get_ref().clone()).unwrap();
        assert_eq!(log.lines().count(), 3);
    }
}
