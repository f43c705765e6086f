//! Blocking read adapters that turn any byte source into a slow, chunked one.
//!
//! The core type is [`ThrottledReader`](throttler::ThrottledReader): every read is capped by a
//! [`Size`](size::Size) policy and followed by a sleep chosen by a [`Delay`](delay::Delay)
//! policy. Both policies come in fixed and uniformly random flavours, and every read can be
//! reported to a [`Diagnostics`](diagnostics::Diagnostics) sink.
//!
//! ```
//! use std::io::{self, Cursor};
//! use chunk_stream::{
//!     delay::DelayPolicy,
//!     io::{ChunkReadExt, copy_chunks},
//!     size::SizePolicy,
//! };
//!
//! let size = SizePolicy::ranged(2, 4).unwrap();
//! let delay = DelayPolicy::fixed_millis(1);
//! let mut reader = Cursor::new(b"ABCDEFGHIJ".to_vec()).throttle_reads(size, delay);
//!
//! let mut out = Vec::new();
//! copy_chunks(&mut reader, &mut out, &mut [0u8; 4])?;
//! assert_eq!(out, b"ABCDEFGHIJ");
//! # Ok::<(), io::Error>(())
//! ```
pub mod delay;
pub mod diagnostics;
pub mod io;
pub mod range;
pub mod size;
pub mod throttler;
pub mod utils;

pub use range::InvalidRangeError;
pub use throttler::ThrottledReader;
