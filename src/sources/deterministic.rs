//! Deterministic pseudo-random byte source.
//!
//! Xoshiro256** is fast and statistically strong but fully predictable
//! from its state. It stands in for the general-purpose PRNG of a
//! language runtime: the baseline every other source is compared against.

use super::{ByteSource, ProviderError};
use rand_core::{OsRng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::sync::{Mutex, PoisonError};

/// Byte source backed by a seeded or OS-seeded Xoshiro256** stream.
///
/// The stream continues across calls; a fixed seed makes the sequence of
/// samples reproducible from run to run.
pub struct DeterministicSource {
    rng: Mutex<Xoshiro256StarStar>,
    seed: Option<u64>,
}

impl DeterministicSource {
    /// Creates a source from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Xoshiro256StarStar::seed_from_u64(seed)),
            seed: Some(seed),
        }
    }

    /// Creates a source seeded from the operating system.
    pub fn from_os_entropy() -> Result<Self, ProviderError> {
        let rng = Xoshiro256StarStar::from_rng(OsRng)?;
        Ok(Self {
            rng: Mutex::new(rng),
            seed: None,
        })
    }

    /// Creates a seeded source when `seed` is given, otherwise an OS-seeded one.
    pub fn new(seed: Option<u64>) -> Result<Self, ProviderError> {
        match seed {
            Some(seed) => Ok(Self::seeded(seed)),
            None => Self::from_os_entropy(),
        }
    }

    /// Returns the fixed seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl ByteSource for DeterministicSource {
    fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError> {
        let mut buf = vec![0u8; size];
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_bytes(&mut buf);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let a = DeterministicSource::seeded(42);
        let b = DeterministicSource::seeded(42);

        assert_eq!(a.produce(1000).unwrap(), b.produce(1000).unwrap());
        assert_eq!(a.seed(), Some(42));
    }

    #[test]
    fn test_matches_generator_stream() {
        let source = DeterministicSource::seeded(0x5EED);
        let mut rng = Xoshiro256StarStar::seed_from_u64(0x5EED);
        let mut expected = vec![0u8; 512];
        rng.fill_bytes(&mut expected);

        assert_eq!(source.produce(512).unwrap(), expected);
    }

    #[test]
    fn test_stream_continues_across_calls() {
        let source = DeterministicSource::seeded(7);
        let first = source.produce(256).unwrap();
        let second = source.produce(256).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_zero_seed_still_random() {
        let source = DeterministicSource::seeded(0);
        let out = source.produce(64).unwrap();

        assert!(out.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_os_seeded_sources_differ() {
        let a = DeterministicSource::from_os_entropy().unwrap();
        let b = DeterministicSource::from_os_entropy().unwrap();

        assert_eq!(a.seed(), None);
        assert_ne!(a.produce(64).unwrap(), b.produce(64).unwrap());
    }
}
