//! Chunk-and-delay reader adapter.
//!
//! [`ThrottledReader`] wraps any [`Read`] and turns each call to [`Read::read`] into a
//! bounded chunk followed by a pause:
//! - a [`Size`] policy caps how many bytes are requested from the inner source;
//! - a [`Delay`] policy decides how long the calling thread sleeps after the chunk;
//! - a [`Diagnostics`] sink receives a [`ReadRecord`] for every read.
//!
//! ## Static configuration
//! ```
//! use std::io::{Cursor, Read};
//! use std::time::Duration;
//! use chunk_stream::throttler::ThrottledReader;
//!
//! let src = Cursor::new(b"abcdefghij".to_vec());
//! let mut reader = ThrottledReader::new(src, 4usize, Duration::from_millis(1));
//!
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap(); // 4 + 4 + 2 bytes, ~1ms apart
//! assert_eq!(out, b"abcdefghij");
//! ```
//!
//! ## Random sizes and waits
//! ```
//! use std::io::{self, Cursor, Read};
//! use chunk_stream::{
//!     delay::DelayPolicy,
//!     diagnostics::WriteDiagnostics,
//!     size::SizePolicy,
//!     throttler::ThrottledReader,
//! };
//!
//! let size = SizePolicy::ranged(1, 8).unwrap();
//! let delay = DelayPolicy::ranged_millis(0, 2).unwrap();
//! let mut reader = ThrottledReader::with_diagnostics(
//!     Cursor::new(vec![7u8; 64]),
//!     size,
//!     delay,
//!     WriteDiagnostics::new(io::stderr()),
//! );
//! io::copy(&mut reader, &mut io::sink()).unwrap();
//! ```
//!
//! ## Under the hood
//! - The wait is drawn **before** the inner read and applied **after** it, so the record
//!   emitted for a read carries the wait that follows it.
//! - An inner error, or `Ok(0)` for a non-empty request, returns straight away without
//!   sleeping: nothing is delayed once the stream is done.
//! - A size of `0` removes the cap; a zero wait skips the sleep call.
use std::{
    fmt,
    io::{self, IoSlice, Read, Write},
    thread,
};

use crate::{
    delay::Delay,
    diagnostics::{Diagnostics, ReadRecord},
    size::Size,
};

/// A reader adapter that delivers the inner stream in capped chunks with a pause after
/// each chunk.
///
/// See the [module-level](self) documentation for an overview and examples.
///
/// # Type Parameters
/// * `R` — inner [`Read`] source (and optionally [`Write`], forwarded untouched).
/// * `S` — a [`Size`] policy (`usize`, [`SizePolicy`](crate::size::SizePolicy), closure).
/// * `D` — a [`Delay`] policy (`Duration`, [`DelayPolicy`](crate::delay::DelayPolicy), closure).
/// * `O` — a [`Diagnostics`] sink; `io::Sink` discards.
pub struct ThrottledReader<R, S, D, O = io::Sink> {
    inner: R,
    size: S,
    delay: D,
    diagnostics: O,
}

impl<R, S: Size, D: Delay> ThrottledReader<R, S, D, io::Sink> {
    /// Wrap `inner` with the given size and delay policies, discarding diagnostics.
    pub fn new(inner: R, size: S, delay: D) -> Self {
        Self::with_diagnostics(inner, size, delay, io::sink())
    }
}

impl<R, S: Size, D: Delay, O: Diagnostics> ThrottledReader<R, S, D, O> {
    /// Wrap `inner` and report every read to `diagnostics`.
    pub fn with_diagnostics(inner: R, size: S, delay: D, diagnostics: O) -> Self {
        Self {
            inner,
            size,
            delay,
            diagnostics,
        }
    }

    /// Immutable access to the inner source.
    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutable access to the inner source.
    ///
    /// Reading through this handle bypasses chunking and delays.
    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// The chunk-size policy.
    #[inline]
    pub fn size_policy(&self) -> &S {
        &self.size
    }

    /// The delay policy.
    #[inline]
    pub fn delay_policy(&self) -> &D {
        &self.delay
    }

    /// The diagnostics sink receiving one record per read.
    #[inline]
    pub fn diagnostics(&self) -> &O {
        &self.diagnostics
    }

    /// Consume the wrapper and return the inner source.
    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, S: Size, D: Delay, O: Diagnostics> Read for ThrottledReader<R, S, D, O> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let wait = self.delay.delay();
        let cap = match self.size.size() {
            0 => buf.len(),
            size => size.min(buf.len()),
        };

        let res = self.inner.read(&mut buf[..cap]);

        self.diagnostics.record(&ReadRecord {
            wait,
            cap,
            size: *res.as_ref().unwrap_or(&0),
        });

        let n = res?;
        if n == 0 && cap > 0 {
            // end of stream
            return Ok(0);
        }

        if !wait.is_zero() {
            thread::sleep(wait);
        }

        Ok(n)
    }
}

impl<W: Write, S, D, O> Write for ThrottledReader<W, S, D, O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        self.inner.write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<R: fmt::Debug, S: fmt::Debug, D: fmt::Debug, O> fmt::Debug for ThrottledReader<R, S, D, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottledReader")
            .field("inner", &self.inner)
            .field("size", &self.size)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
