//! Delay policies for [`ThrottledReader`](crate::throttler::ThrottledReader).
//!
//! A [`Delay`] hands out how long the reader sleeps after a successful read. Delays are
//! configured in whole milliseconds; a delay of `Duration::ZERO` skips the sleep.
//!
//! ## Fixed delay
//! ```
//! use std::time::Duration;
//! use chunk_stream::delay::{Delay, DelayPolicy};
//!
//! let mut policy = DelayPolicy::Fixed(Duration::from_millis(25));
//! assert_eq!(policy.delay(), Duration::from_millis(25));
//! ```
//!
//! ## Random delay
//! ```
//! use std::time::Duration;
//! use chunk_stream::delay::{Delay, DelayPolicy};
//!
//! let mut policy = DelayPolicy::ranged_millis(10, 50).unwrap();
//! let wait = policy.delay();
//! assert!(wait >= Duration::from_millis(10) && wait <= Duration::from_millis(50));
//! ```
use std::time;

use rand::RngCore;

use crate::range::{InvalidRangeError, Ranged};

/// Strategy for the post-read wait.
pub trait Delay {
    /// Returns how long to sleep after the next successful read.
    fn delay(&mut self) -> time::Duration;
}

impl Delay for time::Duration {
    fn delay(&mut self) -> time::Duration {
        *self
    }
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay(&mut self) -> time::Duration {
        (**self).delay()
    }
}

impl<D: Delay + ?Sized> Delay for Box<D> {
    fn delay(&mut self) -> time::Duration {
        (**self).delay()
    }
}

/// Fixed or uniformly random delay.
#[derive(Debug, Clone)]
pub enum DelayPolicy {
    /// Every read waits the same amount.
    Fixed(time::Duration),
    /// Every read waits a number of milliseconds drawn from `[low, high]`.
    RangedMillis(Ranged),
}

impl DelayPolicy {
    /// Fixed delay of `ms` milliseconds.
    pub fn fixed_millis(ms: u64) -> Self {
        Self::Fixed(time::Duration::from_millis(ms))
    }

    /// Random delays in `[low, high]` milliseconds, seeded from the thread-local RNG.
    pub fn ranged_millis(low: u64, high: u64) -> Result<Self, InvalidRangeError> {
        Ranged::new(low, high).map(Self::RangedMillis)
    }

    /// Random delays in `[low, high]` milliseconds with a generator derived from `rng`.
    pub fn ranged_millis_from_rng(
        low: u64,
        high: u64,
        rng: &mut impl RngCore,
    ) -> Result<Self, InvalidRangeError> {
        Ranged::from_rng(low, high, rng).map(Self::RangedMillis)
    }

    /// Picks the policy for a `low`/`max` millisecond pair as the command line describes it.
    ///
    /// `low == 0` or `low == max` selects a fixed `max`; `low < max` selects a random wait
    /// in `[low, max]`; `low > max` is an error.
    pub fn from_millis_bounds(
        low: u64,
        max: u64,
        rng: &mut impl RngCore,
    ) -> Result<Self, InvalidRangeError> {
        if low > max {
            return Err(InvalidRangeError::Inverted { low, high: max });
        }
        if low == 0 || low == max {
            return Ok(Self::fixed_millis(max));
        }
        Self::ranged_millis_from_rng(low, max, rng)
    }
}

impl Delay for DelayPolicy {
    fn delay(&mut self) -> time::Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::RangedMillis(range) => time::Duration::from_millis(range.sample()),
        }
    }
}

/// [`Delay`] backed by a closure. Built by [`from_fn`].
pub struct DelayFn<F> {
    f: F,
}

/// Wraps a closure as a [`Delay`] policy.
pub fn from_fn<F: FnMut() -> time::Duration>(f: F) -> DelayFn<F> {
    DelayFn { f }
}

impl<F: FnMut() -> time::Duration> Delay for DelayFn<F> {
    fn delay(&mut self) -> time::Duration {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for DelayFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayFn").finish_non_exhaustive()
    }
}
