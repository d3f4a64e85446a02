//! Randomness sources and index sampling.
//!
//! Every salt, IV, and generated password character flows through a single
//! [`RandomSource`], so callers can swap the OS CSPRNG for a seeded source
//! in tests.
//!
//! - [`OsRandom`]: OS-level CSPRNG (`OsRng`)
//! - [`SeededRandom`]: deterministic `StdRng`, for reproducible tests only
//! - [`uniform_index`]: unbiased index selection by rejection sampling
//! - [`modulo_index`]: legacy `byte % n` selection (slightly biased)

use std::fmt;
use std::sync::Mutex;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Random`] if the source cannot produce bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))
    }
}

/// Deterministic source seeded from a `u64`.
///
/// Produces the same stream for the same seed. Never use it for real
/// vault material.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a source whose output is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| CryptoError::Random("seeded source lock poisoned".into()))?;
        rng.fill_bytes(dest);
        Ok(())
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SeededRandom")
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Draw `len` random bytes from `rng`.
///
/// # Errors
///
/// Propagates [`CryptoError::Random`] from the source.
pub fn random_bytes(rng: &dyn RandomSource, len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut out = vec![0u8; len];
    rng.fill(&mut out)?;
    Ok(out)
}

/// Draw a fixed-size random array from `rng`.
///
/// # Errors
///
/// Propagates [`CryptoError::Random`] from the source.
pub fn random_array<const N: usize>(rng: &dyn RandomSource) -> Result<[u8; N], CryptoError> {
    let mut out = [0u8; N];
    rng.fill(&mut out)?;
    Ok(out)
}

/// Pick an index in `0..bound` with every value equally likely.
///
/// Draws 32-bit values and rejects the tail that would make `v % bound`
/// uneven.
///
/// # Errors
///
/// Returns [`CryptoError::Random`] if `bound` is zero or exceeds `u32::MAX`,
/// or if the source fails.
#[allow(clippy::arithmetic_side_effects)]
pub fn uniform_index(rng: &dyn RandomSource, bound: usize) -> Result<usize, CryptoError> {
    let bound32 = u32::try_from(bound)
        .ok()
        .filter(|b| *b > 0)
        .ok_or_else(|| CryptoError::Random(format!("invalid sampling bound: {bound}")))?;

    // 2^32 mod bound, computed without leaving u32.
    let tail = (u32::MAX % bound32 + 1) % bound32;
    let max_accepted = u32::MAX - tail;

    loop {
        let value = u32::from_le_bytes(random_array::<4>(rng)?);
        if value <= max_accepted {
            return Ok((value % bound32) as usize);
        }
    }
}

/// Pick an index in `0..bound` as `byte % bound` from a single random byte.
///
/// Values below `256 % bound` are slightly more likely than the rest.
///
/// # Errors
///
/// Returns [`CryptoError::Random`] if `bound` is zero or exceeds 256,
/// or if the source fails.
#[allow(clippy::arithmetic_side_effects)]
pub fn modulo_index(rng: &dyn RandomSource, bound: usize) -> Result<usize, CryptoError> {
    if bound == 0 || bound > 256 {
        return Err(CryptoError::Random(format!(
            "invalid sampling bound: {bound}"
        )));
    }
    let [byte] = random_array::<1>(rng)?;
    Ok(usize::from(byte) % bound)
}

// ---------------------------------------------------------------------------
// Sampling strategy
// ---------------------------------------------------------------------------

/// How generated passwords map random bytes onto alphabet positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sampling {
    /// Rejection sampling, every character equally likely.
    #[default]
    Uniform,
    /// `byte % alphabet_len`, compatible with vaults generated by older clients.
    Modulo,
}

impl Sampling {
    /// Pick an index in `0..bound` using this strategy.
    ///
    /// # Errors
    ///
    /// See [`uniform_index`] and [`modulo_index`].
    pub fn index(self, rng: &dyn RandomSource, bound: usize) -> Result<usize, CryptoError> {
        match self {
            Self::Uniform => uniform_index(rng, bound),
            Self::Modulo => modulo_index(rng, bound),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
