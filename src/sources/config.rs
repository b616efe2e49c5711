//! Source registry configuration.

use super::secure::DEFAULT_RESEED_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Largest sample a single request may ask for (64 MiB).
pub const DEFAULT_MAX_SAMPLE_SIZE: usize = 64 * 1024 * 1024;

/// Configuration for the canonical sources and any extra devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Fixed seed for the deterministic generator; OS-seeded when absent.
    pub prng_seed: Option<u64>,
    /// Output bytes between CSPRNG reseeds (0 disables reseeding).
    pub csprng_reseed_interval: u64,
    /// Path of the blocking entropy device.
    pub random_device: PathBuf,
    /// Maximum wait for a device read, in milliseconds.
    pub device_timeout_ms: u64,
    /// Upper bound on a single sample request.
    pub max_sample_size: usize,
    /// Additional entropy devices to register.
    pub devices: Vec<DeviceConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            prng_seed: None,
            csprng_reseed_interval: DEFAULT_RESEED_INTERVAL,
            random_device: PathBuf::from("/dev/random"),
            device_timeout_ms: 5000,
            max_sample_size: DEFAULT_MAX_SAMPLE_SIZE,
            devices: Vec::new(),
        }
    }
}

impl SourcesConfig {
    /// Device wait budget as a `Duration`.
    pub fn device_timeout(&self) -> Duration {
        Duration::from_millis(self.device_timeout_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), SourcesConfigError> {
        if self.device_timeout_ms == 0 {
            return Err(SourcesConfigError::InvalidTimeout);
        }
        if self.max_sample_size == 0 {
            return Err(SourcesConfigError::InvalidMaxSampleSize);
        }
        for (i, device) in self.devices.iter().enumerate() {
            if device.id.trim().is_empty() {
                return Err(SourcesConfigError::EmptyDeviceId);
            }
            if self.devices[..i].iter().any(|d| d.id == device.id) {
                return Err(SourcesConfigError::DuplicateDevice(device.id.clone()));
            }
        }
        Ok(())
    }
}

/// An extra entropy device, e.g. `/dev/hwrng`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Identifier used to select the source.
    pub id: String,
    /// Display label; defaults to `TRNG (<path>)`.
    #[serde(default)]
    pub label: Option<String>,
    /// Device path.
    pub path: PathBuf,
}

/// Source configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourcesConfigError {
    /// `device_timeout_ms` is zero.
    #[error("device timeout must be positive")]
    InvalidTimeout,
    /// `max_sample_size` is zero.
    #[error("maximum sample size must be positive")]
    InvalidMaxSampleSize,
    /// A `[[devices]]` entry has an empty id.
    #[error("device id must not be empty")]
    EmptyDeviceId,
    /// Two `[[devices]]` entries share an id.
    #[error("device id {0:?} declared twice")]
    DuplicateDevice(String),
}
