//! ChaCha-based CSPRNG byte source with periodic reseeding.
//!
//! ChaCha20 keyed from the operating system. After `reseed_interval`
//! output bytes the key is replaced with fresh OS entropy; an interval of
//! 0 disables reseeding.

use super::{ByteSource, ProviderError};
use rand::rngs::adapter::ReseedingRng;
use rand_chacha::ChaCha20Core;
use rand_core::{OsRng, RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Default number of output bytes between reseeds (1 MiB).
pub const DEFAULT_RESEED_INTERVAL: u64 = 1 << 20;

/// ChaCha20 rekeyed from `R` every `reseed_interval` bytes.
fn reseeding<R: RngCore>(
    core: ChaCha20Core,
    reseed_interval: u64,
    reseeder: R,
) -> ReseedingRng<ChaCha20Core, R> {
    ReseedingRng::new(core, reseed_interval, reseeder)
}

/// Byte source backed by an OS-reseeded ChaCha20 generator.
pub struct SecureSource {
    rng: Mutex<ReseedingRng<ChaCha20Core, OsRng>>,
    reseed_interval: u64,
}

impl SecureSource {
    /// Creates a source seeded from the operating system.
    pub fn from_os_entropy(reseed_interval: u64) -> Result<Self, ProviderError> {
        let core = ChaCha20Core::from_rng(OsRng)?;
        Ok(Self {
            rng: Mutex::new(reseeding(core, reseed_interval, OsRng)),
            reseed_interval,
        })
    }

    /// Output bytes between reseeds; 0 when reseeding is disabled.
    pub fn reseed_interval(&self) -> u64 {
        self.reseed_interval
    }

    /// Rekeys immediately from OS entropy.
    pub fn reseed(&self) -> Result<(), ProviderError> {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reseed()?;
        tracing::debug!("CSPRNG reseeded");
        Ok(())
    }
}

impl ByteSource for SecureSource {
    fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError> {
        let mut buf = vec![0u8; size];
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_fill_bytes(&mut buf)?;
        Ok(buf)
    }
}
