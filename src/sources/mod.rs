//! Randomness sources behind a uniform "give me N bytes" interface.
//!
//! Each provider wraps one platform or library primitive. The registry maps
//! source identifiers to providers and normalizes their failures; it does
//! no analysis of its own.

mod config;
mod deterministic;
mod device;
mod os;
mod registry;
mod secure;

pub use config::{DeviceConfig, SourcesConfig, SourcesConfigError, DEFAULT_MAX_SAMPLE_SIZE};
pub use deterministic::DeterministicSource;
pub use device::{CancelToken, DeviceSource};
pub use os::OsEntropySource;
pub use registry::{SourceRegistry, CSPRNG_ID, PRNG_ID, RANDOM_ID, URANDOM_ID};
pub use secure::{SecureSource, DEFAULT_RESEED_INTERVAL};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by the registry for one source request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceError {
    /// Requested size is zero or above the registry maximum.
    #[error("invalid sample size {requested} (must be between 1 and {max})")]
    InvalidSize {
        /// Requested size.
        requested: usize,
        /// Registry maximum.
        max: usize,
    },

    /// The provider failed or could not be built.
    #[error("source {id} unavailable: {reason}")]
    Unavailable {
        /// Source identifier.
        id: String,
        /// Provider failure, as text.
        reason: String,
    },

    /// No source is registered under this id.
    #[error("unknown source: {id}")]
    UnknownSource {
        /// Requested identifier.
        id: String,
    },
}

/// Failures inside an individual provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Opening or reading a device failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A generator or the OS entropy call failed.
    #[error("entropy provider failed: {0}")]
    Rng(#[from] rand_core::Error),

    /// A device read did not finish in time.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The shared cancel token was set.
    #[error("cancelled")]
    Cancelled,

    /// The device reached end of file early.
    #[error("short read: got {got} of {want} bytes")]
    ShortRead {
        /// Bytes read.
        got: usize,
        /// Bytes requested.
        want: usize,
    },

    /// The reader thread dropped its channel.
    #[error("reader thread exited without a result")]
    WorkerLost,
}

/// A provider of raw random bytes.
///
/// Implementations must be thread-safe so that several sources can be
/// sampled in parallel.
pub trait ByteSource: Send + Sync {
    /// Produces exactly `size` bytes.
    fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError>;
}

/// The closed set of source kinds the registry knows how to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Xoshiro256**, optionally with a fixed seed.
    Deterministic { seed: Option<u64> },
    /// ChaCha20 CSPRNG seeded and periodically rekeyed from the OS.
    Secure { reseed_interval: u64 },
    /// The kernel CSPRNG syscall.
    OsEntropy,
    /// A readable entropy device.
    Device { path: PathBuf, timeout_ms: u64 },
}

impl SourceKind {
    /// Builds the provider for this kind.
    pub fn build(&self, cancel: &CancelToken) -> Result<Box<dyn ByteSource>, ProviderError> {
        let source: Box<dyn ByteSource> = match self {
            Self::Deterministic { seed } => Box::new(DeterministicSource::new(*seed)?),
            Self::Secure { reseed_interval } => {
                Box::new(SecureSource::from_os_entropy(*reseed_interval)?)
            }
            Self::OsEntropy => Box::new(OsEntropySource::new()),
            Self::Device { path, timeout_ms } => Box::new(DeviceSource::new(
                path.clone(),
                Duration::from_millis(*timeout_ms),
                cancel.clone(),
            )),
        };
        Ok(source)
    }

    /// Human-readable label for reports.
    pub fn label(&self) -> String {
        match self {
            Self::Deterministic { .. } => "PRNG".to_string(),
            Self::Secure { .. } => "CSPRNG".to_string(),
            Self::OsEntropy => "TRNG (/dev/urandom)".to_string(),
            Self::Device { path, .. } => format!("TRNG ({})", path.display()),
        }
    }
}
