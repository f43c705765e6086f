//! Chunk-size policies for [`ThrottledReader`](crate::throttler::ThrottledReader).
//!
//! A [`Size`] hands out the maximum number of bytes a single read may request from the
//! wrapped source. A size of **`0`** means "no cap": the read is limited by the caller's
//! buffer only.
//!
//! ## Fixed size
//! ```
//! use std::io::{Cursor, Read};
//! use chunk_stream::io::ChunkReadExt;
//!
//! let mut reader = Cursor::new(b"abcdef".to_vec()).chunk_reads(4usize);
//! let mut buf = [0u8; 16];
//! assert_eq!(reader.read(&mut buf).unwrap(), 4);
//! assert_eq!(reader.read(&mut buf).unwrap(), 2);
//! ```
//!
//! ## Random size
//! ```
//! use chunk_stream::size::{Size, SizePolicy};
//!
//! let mut policy = SizePolicy::ranged(2, 8).unwrap();
//! let size = policy.size();
//! assert!((2..=8).contains(&size));
//! ```
use rand::RngCore;

use crate::range::{InvalidRangeError, Ranged, validate_range};

/// Strategy for the per-read chunk size cap.
///
/// Called once per read. Implementors may keep state between calls (a random generator,
/// a counter) but each call is an independent draw.
pub trait Size {
    /// Returns the size cap in bytes for the next read. `0` disables the cap.
    fn size(&mut self) -> usize;
}

impl Size for usize {
    fn size(&mut self) -> usize {
        *self
    }
}

impl<S: Size + ?Sized> Size for &mut S {
    fn size(&mut self) -> usize {
        (**self).size()
    }
}

impl<S: Size + ?Sized> Size for Box<S> {
    fn size(&mut self) -> usize {
        (**self).size()
    }
}

/// Fixed or uniformly random chunk size.
#[derive(Debug, Clone)]
pub enum SizePolicy {
    /// Every read is capped at the same size.
    Fixed(usize),
    /// Every read is capped at a size drawn from `[low, high]`.
    Ranged(Ranged),
}

impl SizePolicy {
    /// Random sizes in `[low, high]`, seeded from the thread-local RNG.
    ///
    /// `low` must be at least 1: a drawn 0 would lift the cap entirely.
    pub fn ranged(low: usize, high: usize) -> Result<Self, InvalidRangeError> {
        validate_size_range(low, high)?;
        Ranged::new(low as u64, high as u64).map(Self::Ranged)
    }

    /// Random sizes in `[low, high]` with a generator derived from `rng`.
    ///
    /// Same bounds rules as [`ranged`](Self::ranged).
    pub fn ranged_from_rng(
        low: usize,
        high: usize,
        rng: &mut impl RngCore,
    ) -> Result<Self, InvalidRangeError> {
        validate_size_range(low, high)?;
        Ranged::from_rng(low as u64, high as u64, rng).map(Self::Ranged)
    }

    /// Picks the policy for a `low`/`max` pair as the command line describes it.
    ///
    /// `low == 0` or `low == max` selects a fixed `max`; `low < max` selects a random size
    /// in `[low, max]`; `low > max` is an error.
    pub fn from_bounds(
        low: usize,
        max: usize,
        rng: &mut impl RngCore,
    ) -> Result<Self, InvalidRangeError> {
        if low > max {
            return Err(InvalidRangeError::Inverted {
                low: low as u64,
                high: max as u64,
            });
        }
        if low == 0 || low == max {
            return Ok(Self::Fixed(max));
        }
        Self::ranged_from_rng(low, max, rng)
    }

    /// Largest size this policy can produce.
    pub fn max(&self) -> usize {
        match self {
            Self::Fixed(size) => *size,
            Self::Ranged(range) => usize::try_from(range.high()).unwrap_or(usize::MAX),
        }
    }
}

fn validate_size_range(low: usize, high: usize) -> Result<(), InvalidRangeError> {
    validate_range(low as u64, high as u64)?;
    if low == 0 {
        return Err(InvalidRangeError::ZeroSize { high: high as u64 });
    }
    Ok(())
}

impl Size for SizePolicy {
    fn size(&mut self) -> usize {
        match self {
            Self::Fixed(size) => *size,
            Self::Ranged(range) => usize::try_from(range.sample()).unwrap_or(usize::MAX),
        }
    }
}

/// [`Size`] backed by a closure. Built by [`from_fn`].
pub struct SizeFn<F> {
    f: F,
}

/// Wraps a closure as a [`Size`] policy.
///
/// ```
/// use chunk_stream::size::{self, Size};
///
/// let mut next = 0;
/// let mut growing = size::from_fn(move || {
///     next += 1;
///     next
/// });
/// assert_eq!(growing.size(), 1);
/// assert_eq!(growing.size(), 2);
/// ```
pub fn from_fn<F: FnMut() -> usize>(f: F) -> SizeFn<F> {
    SizeFn { f }
}

impl<F: FnMut() -> usize> Size for SizeFn<F> {
    fn size(&mut self) -> usize {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for SizeFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeFn").finish_non_exhaustive()
    }
}
