//! Inclusive uniform ranges shared by the ranged size and delay policies.
//!
//! [`Ranged`] owns its own [`SmallRng`], so two policies never share random state and a
//! policy can be reproduced exactly from a seed.
//!
//! ## Seeding
//! - [`Ranged::new`] seeds from the thread-local RNG.
//! - [`Ranged::from_seed`] takes a fixed 32-byte seed (tests, reproducible runs).
//! - [`Ranged::from_rng`] derives a generator from a caller-owned RNG, which lets one base
//!   seed drive several independent policies.
use std::{error::Error, fmt};

use rand::{Rng, RngCore, SeedableRng, rng, rngs::SmallRng};

/// Error returned when a policy range is constructed with unusable bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRangeError {
    /// `low > high`.
    Inverted { low: u64, high: u64 },
    /// A ranged chunk size starting at 0. A zero cap means "uncapped", so it cannot be drawn.
    ZeroSize { high: u64 },
}

impl fmt::Display for InvalidRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted { low, high } => write!(
                f,
                "range lower bound must not exceed upper bound: {low} > {high}"
            ),
            Self::ZeroSize { high } => write!(
                f,
                "ranged chunk size must start at 1 or more: [0, {high}]"
            ),
        }
    }
}

impl Error for InvalidRangeError {}

/// Uniform sampler over the inclusive range `[low, high]`.
///
/// Bounds are checked once at construction; every [`sample`](Ranged::sample) afterwards is
/// guaranteed to land inside them. Equal bounds are allowed and always yield that value.
#[derive(Debug, Clone)]
pub struct Ranged {
    low: u64,
    high: u64,
    rng: SmallRng,
}

impl Ranged {
    /// Creates a sampler seeded from the thread-local RNG.
    pub fn new(low: u64, high: u64) -> Result<Self, InvalidRangeError> {
        Self::with_rng(low, high, SmallRng::from_rng(&mut rng()))
    }

    /// Creates a sampler with a fixed seed.
    pub fn from_seed(low: u64, high: u64, seed: [u8; 32]) -> Result<Self, InvalidRangeError> {
        Self::with_rng(low, high, SmallRng::from_seed(seed))
    }

    /// Creates a sampler whose generator is derived from `rng`.
    pub fn from_rng(
        low: u64,
        high: u64,
        rng: &mut impl RngCore,
    ) -> Result<Self, InvalidRangeError> {
        Self::with_rng(low, high, SmallRng::from_rng(rng))
    }

    fn with_rng(low: u64, high: u64, rng: SmallRng) -> Result<Self, InvalidRangeError> {
        validate_range(low, high)?;
        Ok(Self { low, high, rng })
    }

    /// Inclusive lower bound.
    #[inline]
    pub fn low(&self) -> u64 {
        self.low
    }

    /// Inclusive upper bound.
    #[inline]
    pub fn high(&self) -> u64 {
        self.high
    }

    /// Draws the next value, uniformly distributed in `[low, high]`.
    pub fn sample(&mut self) -> u64 {
        self.rng.random_range(self.low..=self.high)
    }
}

pub(crate) fn validate_range(low: u64, high: u64) -> Result<(), InvalidRangeError> {
    if low > high {
        return Err(InvalidRangeError::Inverted { low, high });
    }
    Ok(())
}
