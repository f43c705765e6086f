//! Measuring what a throttled pipeline really delivers.
//!
//! [`RateCountingReader`] sits on top of any [`Read`] and keeps a running byte total. The
//! clock starts when the first byte arrives, and the observed throughput can be read back at
//! any point.
//!
//! ## Example
//! ```
//! use std::io::{self, Cursor, Read};
//! use chunk_stream::utils::rate_counting_reader::RateCountingReader;
//!
//! let mut reader = RateCountingReader::new(Cursor::new(b"hello world".to_vec()));
//! let mut buf = Vec::new();
//! reader.read_to_end(&mut buf)?;
//! assert_eq!(reader.total(), 11);
//! assert!(reader.rate_bps().unwrap() > 0.0);
//! # Ok::<(), io::Error>(())
//! ```
use std::{
    fmt,
    io::{self, Read},
    time::Instant,
};

/// Byte total and mean throughput of everything read through it.
///
/// Reads that return no data (end of stream, empty buffers) leave both the total and the
/// clock untouched, so the rate stays unknown until data shows up.
pub struct RateCountingReader<R> {
    inner: R,
    total_bytes: u64,
    start: Option<Instant>,
}

impl<R> RateCountingReader<R> {
    /// Starts measuring reads from `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            total_bytes: 0,
            start: None,
        }
    }

    /// Bytes seen so far; stops growing at `u64::MAX`.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total_bytes
    }

    /// Moment the first byte arrived, if any has.
    #[inline]
    pub fn start_instant(&self) -> Option<Instant> {
        self.start
    }

    /// Mean bytes per second since [`start_instant`](Self::start_instant), or `None` before
    /// the first byte.
    pub fn rate_bps(&self) -> Option<f64> {
        let start = self.start?;
        // floor of 1µs
        let elapsed = start.elapsed().as_secs_f64().max(1e-6);
        Some(self.total_bytes as f64 / elapsed)
    }

    /// Forgets the total and stops the clock.
    #[inline]
    pub fn reset(&mut self) {
        self.total_bytes = 0;
        self.start = None;
    }

    /// The measured reader.
    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutable access to the measured reader. Reads through it are not counted.
    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Drops the counters and returns the measured reader.
    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: fmt::Debug> fmt::Debug for RateCountingReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateCountingReader")
            .field("inner", &self.inner)
            .field("total_bytes", &self.total_bytes)
            .field("start", &self.start)
            .finish()
    }
}

impl<R: Read> Read for RateCountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.total_bytes = self.total_bytes.saturating_add(n as u64);
            if self.start.is_none() {
                self.start = Some(Instant::now());
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ChunkReadExt;
    use std::{io::Cursor, time::Duration};

    #[test]
    fn tracks_total_and_first_data_instant() {
        let mut reader = RateCountingReader::new(Cursor::new(b"0123456789".to_vec()));

        let mut head = [0u8; 3];
        reader.read_exact(&mut head).unwrap();
        let first = reader.start_instant().expect("clock starts with the first byte");

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();

        assert_eq!(reader.total(), 10);
        assert_eq!(reader.start_instant(), Some(first));
        assert!(reader.rate_bps().is_some_and(|bps| bps > 0.0));
    }

    #[test]
    fn empty_source_leaves_rate_unknown() {
        let mut reader = RateCountingReader::new(io::empty());
        assert_eq!(reader.read(&mut [0u8; 8]).unwrap(), 0);
        assert_eq!((reader.total(), reader.rate_bps()), (0, None));

        // a zero-length buffer on a live source moves no data either
        let mut reader = RateCountingReader::new(Cursor::new(vec![1u8; 4]));
        assert_eq!(reader.read(&mut [0u8; 0]).unwrap(), 0);
        assert!(reader.start_instant().is_none());
    }

    #[test]
    fn reads_through_get_mut_are_not_counted() {
        let mut reader = RateCountingReader::new(Cursor::new(vec![1u8; 6]));
        reader.get_mut().read_exact(&mut [0u8; 2]).unwrap();
        reader.read_exact(&mut [0u8; 4]).unwrap();

        assert_eq!(reader.total(), 4);
        assert_eq!(reader.into_inner().position(), 6);
    }

    #[test]
    fn reset_starts_a_fresh_measurement() {
        let mut reader = RateCountingReader::new(Cursor::new(vec![1u8; 4]));
        reader.read_exact(&mut [0u8; 4]).unwrap();
        reader.reset();

        assert_eq!(reader.total(), 0);
        assert!(reader.start_instant().is_none());
    }

    #[test]
    fn throttled_source_reports_a_bounded_rate() {
        // 4 chunks of 4 bytes, 20ms after each: at most ~16 B / 60ms between first and last.
        let throttled =
            Cursor::new(vec![0u8; 16]).throttle_reads(4usize, Duration::from_millis(20));
        let mut reader = RateCountingReader::new(throttled);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(reader.total(), 16);
        let rate = reader.rate_bps().unwrap();
        assert!(rate < 16.0 / 0.06 + 1.0, "rate {rate} B/s too high");
    }
}
