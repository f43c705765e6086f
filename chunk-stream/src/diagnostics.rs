//! Per-read diagnostics for [`ThrottledReader`](crate::throttler::ThrottledReader).
//!
//! Every read, successful or not, produces one [`ReadRecord`] that is handed to a
//! [`Diagnostics`] sink. Sinks are best-effort: they have no way to fail the read.
//!
//! - [`io::Sink`] discards records.
//! - [`WriteDiagnostics`] writes one human-readable line per read to any [`Write`].
//! - [`TracingDiagnostics`] emits a `DEBUG` event through `tracing`.
use std::{
    fmt,
    io::{self, Write},
    time,
};

use tracing::debug;

/// Outcome of a single throttled read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRecord {
    /// Wait drawn for this read. Applied only if the read succeeded with data.
    pub wait: time::Duration,
    /// Bytes requested from the inner source, after clamping to the caller's buffer.
    pub cap: usize,
    /// Bytes the inner source returned; `0` on error or end of stream.
    pub size: usize,
}

impl fmt::Display for ReadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wait: {}ms; max: {}; size: {}",
            self.wait.as_millis(),
            self.cap,
            self.size
        )
    }
}

/// Receiver of [`ReadRecord`]s.
pub trait Diagnostics {
    fn record(&mut self, record: &ReadRecord);
}

impl Diagnostics for io::Sink {
    #[inline]
    fn record(&mut self, _record: &ReadRecord) {}
}

impl<O: Diagnostics + ?Sized> Diagnostics for &mut O {
    fn record(&mut self, record: &ReadRecord) {
        (**self).record(record)
    }
}

impl<O: Diagnostics + ?Sized> Diagnostics for Box<O> {
    fn record(&mut self, record: &ReadRecord) {
        (**self).record(record)
    }
}

/// Writes each record as a `wait: ..; max: ..; size: ..` line.
///
/// Write errors are swallowed so a broken log stream never interrupts the data stream.
#[derive(Debug)]
pub struct WriteDiagnostics<W> {
    inner: W,
}

impl<W: Write> WriteDiagnostics<W> {
    /// Wraps `inner` as a line-per-record sink.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Immutable access to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Diagnostics for WriteDiagnostics<W> {
    fn record(&mut self, record: &ReadRecord) {
        // best effort
        _ = writeln!(self.inner, "{record}");
    }
}

/// Emits each record as a `tracing` event at `DEBUG` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&mut self, record: &ReadRecord) {
        debug!(
            wait_ms = record.wait.as_millis() as u64,
            cap = record.cap,
            size = record.size,
            "chunk read"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that fails every call.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    fn record() -> ReadRecord {
        ReadRecord {
            wait: time::Duration::from_millis(100),
            cap: 16,
            size: 10,
        }
    }

    #[test]
    fn display_format() {
        assert_eq!(record().to_string(), "wait: 100ms; max: 16; size: 10");
    }

    #[test]
    fn write_diagnostics_emits_one_line_per_record() {
        let mut sink = WriteDiagnostics::new(Vec::new());
        sink.record(&record());
        sink.record(&ReadRecord {
            size: 0,
            ..record()
        });

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "wait: 100ms; max: 16; size: 10\nwait: 100ms; max: 16; size: 0\n"
        );
    }

    #[test]
    fn write_failures_are_ignored() {
        let mut sink = WriteDiagnostics::new(BrokenPipe);
        sink.record(&record());
    }

    #[test]
    fn forwarding_impls() {
        let mut inner = WriteDiagnostics::new(Vec::new());
        {
            let mut by_ref = &mut inner;
            Diagnostics::record(&mut by_ref, &record());
        }
        let mut boxed: Box<dyn Diagnostics> = Box::new(io::sink());
        boxed.record(&record());
        TracingDiagnostics.record(&record());

        assert_eq!(inner.into_inner(), b"wait: 100ms; max: 16; size: 10\n");
    }
}
