//! Named source lookup and request validation.

use super::{
    ByteSource, CancelToken, ProviderError, SourceError, SourceKind, SourcesConfig,
    DEFAULT_MAX_SAMPLE_SIZE,
};
use crate::analysis::ByteSample;

/// Identifier of the deterministic generator.
pub const PRNG_ID: &str = "prng";
/// Identifier of the ChaCha20 CSPRNG.
pub const CSPRNG_ID: &str = "csprng";
/// Identifier of the kernel entropy syscall.
pub const URANDOM_ID: &str = "urandom";
/// Identifier of the blocking entropy device.
pub const RANDOM_ID: &str = "random";

struct Entry {
    id: String,
    label: String,
    /// Construction failures are kept and reported on every request.
    provider: Result<Box<dyn ByteSource>, String>,
}

/// Maps source identifiers to byte providers.
///
/// Registration order is preserved for listing.
pub struct SourceRegistry {
    entries: Vec<Entry>,
    max_sample_size: usize,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new(max_sample_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_sample_size,
        }
    }

    /// Creates a registry with the four canonical sources and any
    /// configured extra devices.
    pub fn from_config(config: &SourcesConfig, cancel: &CancelToken) -> Self {
        let mut registry = Self::new(config.max_sample_size);
        let timeout_ms = config.device_timeout_ms;

        registry.register_kind(
            PRNG_ID,
            SourceKind::Deterministic {
                seed: config.prng_seed,
            },
            cancel,
        );
        registry.register_kind(
            CSPRNG_ID,
            SourceKind::Secure {
                reseed_interval: config.csprng_reseed_interval,
            },
            cancel,
        );
        registry.register_kind(URANDOM_ID, SourceKind::OsEntropy, cancel);
        registry.register_kind(
            RANDOM_ID,
            SourceKind::Device {
                path: config.random_device.clone(),
                timeout_ms,
            },
            cancel,
        );

        for device in &config.devices {
            let kind = SourceKind::Device {
                path: device.path.clone(),
                timeout_ms,
            };
            let label = device.label.clone().unwrap_or_else(|| kind.label());
            match kind.build(cancel) {
                Ok(provider) => registry.register(&device.id, label, provider),
                Err(e) => registry.register_failed(&device.id, label, &e),
            }
        }

        registry
    }

    /// Builds and registers a source of the given kind under `id`.
    pub fn register_kind(&mut self, id: &str, kind: SourceKind, cancel: &CancelToken) {
        let label = kind.label();
        match kind.build(cancel) {
            Ok(provider) => self.register(id, label, provider),
            Err(e) => self.register_failed(id, label, &e),
        }
    }

    /// Registers a provider, replacing any previous one with the same id.
    pub fn register(&mut self, id: &str, label: impl Into<String>, provider: Box<dyn ByteSource>) {
        self.insert(Entry {
            id: id.to_string(),
            label: label.into(),
            provider: Ok(provider),
        });
    }

    fn register_failed(&mut self, id: &str, label: String, error: &ProviderError) {
        tracing::warn!(source = id, error = %error, "Source could not be initialized");
        self.insert(Entry {
            id: id.to_string(),
            label,
            provider: Err(error.to_string()),
        });
    }

    fn insert(&mut self, entry: Entry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Registered identifiers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    /// Returns true if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    /// Display label of a registered source.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.entry(id).map(|e| e.label.as_str())
    }

    /// Largest sample size accepted by [`produce`](Self::produce).
    pub fn max_sample_size(&self) -> usize {
        self.max_sample_size
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Produces a sample of exactly `size` bytes from the source `id`.
    ///
    /// No caching and no retry: every failure is returned to the caller.
    pub fn produce(&self, id: &str, size: usize) -> Result<ByteSample, SourceError> {
        if size == 0 || size > self.max_sample_size {
            return Err(SourceError::InvalidSize {
                requested: size,
                max: self.max_sample_size,
            });
        }

        let entry = self.entry(id).ok_or_else(|| SourceError::UnknownSource {
            id: id.to_string(),
        })?;

        let unavailable = |reason: String| SourceError::Unavailable {
            id: id.to_string(),
            reason,
        };

        let provider = entry.provider.as_ref().map_err(|e| unavailable(e.clone()))?;
        let bytes = provider
            .produce(size)
            .map_err(|e| unavailable(e.to_string()))?;

        if bytes.len() != size {
            return Err(unavailable(format!(
                "provider returned {} of {} bytes",
                bytes.len(),
                size
            )));
        }

        tracing::debug!(source = id, size, "Sample produced");
        Ok(ByteSample::from_bytes(bytes))
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLE_SIZE)
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.ids().collect::<Vec<_>>())
            .field("max_sample_size", &self.max_sample_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Truncating;

    impl ByteSource for Truncating {
        fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError> {
            Ok(vec![0u8; size / 2])
        }
    }

    fn test_config() -> SourcesConfig {
        SourcesConfig {
            prng_seed: Some(42),
            random_device: PathBuf::from("/nonexistent/random"),
            ..Default::default()
        }
    }

    #[test]
    fn test_canonical_sources_registered() {
        let registry = SourceRegistry::from_config(&test_config(), &CancelToken::new());

        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec![PRNG_ID, CSPRNG_ID, URANDOM_ID, RANDOM_ID]);
        assert_eq!(registry.label(URANDOM_ID), Some("TRNG (/dev/urandom)"));
    }

    #[test]
    fn test_produce_exact_size() {
        let registry = SourceRegistry::from_config(&test_config(), &CancelToken::new());

        for id in [PRNG_ID, CSPRNG_ID, URANDOM_ID] {
            let sample = registry.produce(id, 10_000).unwrap();
            assert_eq!(sample.len(), 10_000);
        }
    }

    #[test]
    fn test_invalid_sizes() {
        let registry = SourceRegistry::from_config(&test_config(), &CancelToken::new());

        assert!(matches!(
            registry.produce(PRNG_ID, 0),
            Err(SourceError::InvalidSize { requested: 0, .. })
        ));
        assert!(matches!(
            registry.produce(PRNG_ID, DEFAULT_MAX_SAMPLE_SIZE + 1),
            Err(SourceError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_unknown_source() {
        let registry = SourceRegistry::default();

        assert_eq!(
            registry.produce("quantum", 16).unwrap_err(),
            SourceError::UnknownSource {
                id: "quantum".into()
            }
        );
    }

    #[test]
    fn test_missing_device_unavailable() {
        let registry = SourceRegistry::from_config(&test_config(), &CancelToken::new());

        assert!(matches!(
            registry.produce(RANDOM_ID, 16),
            Err(SourceError::Unavailable { id, .. }) if id == RANDOM_ID
        ));
    }

    #[test]
    fn test_short_provider_output_rejected() {
        let mut registry = SourceRegistry::default();
        registry.register("half", "Half", Box::new(Truncating));

        assert!(matches!(
            registry.produce("half", 100),
            Err(SourceError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = SourceRegistry::from_config(&test_config(), &CancelToken::new());
        registry.register(PRNG_ID, "Custom", Box::new(Truncating));

        assert_eq!(registry.ids().count(), 4);
        assert_eq!(registry.label(PRNG_ID), Some("Custom"));
    }

    #[test]
    fn test_seeded_prng_reproducible_across_registries() {
        let a = SourceRegistry::from_config(&test_config(), &CancelToken::new());
        let b = SourceRegistry::from_config(&test_config(), &CancelToken::new());

        assert_eq!(
            a.produce(PRNG_ID, 512).unwrap(),
            b.produce(PRNG_ID, 512).unwrap()
        );
    }

    #[test]
    fn test_extra_devices_registered() {
        let config = SourcesConfig {
            devices: vec![super::super::DeviceConfig {
                id: "hwrng".into(),
                label: None,
                path: PathBuf::from("/dev/hwrng"),
            }],
            ..test_config()
        };
        let registry = SourceRegistry::from_config(&config, &CancelToken::new());

        assert!(registry.contains("hwrng"));
        assert_eq!(registry.label("hwrng"), Some("TRNG (/dev/hwrng)"));
    }
}
