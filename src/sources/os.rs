//! Operating system entropy via the `getrandom` syscall family.

use super::{ByteSource, ProviderError};
use rand_core::{OsRng, RngCore};

/// Byte source reading the kernel CSPRNG (`getrandom(2)` on Linux,
/// `getentropy` on macOS, `BCryptGenRandom` on Windows).
///
/// Never blocks once the kernel pool has been initialized.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropySource;

impl OsEntropySource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl ByteSource for OsEntropySource {
    fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError> {
        let mut buf = vec![0u8; size];
        OsRng.try_fill_bytes(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_entropy_length() {
        let source = OsEntropySource::new();
        let bytes = source.produce(4096).unwrap();

        assert_eq!(bytes.len(), 4096);
        // 4096 zero bytes from a working kernel RNG is not a realistic outcome
        assert!(bytes.iter().any(|&b| b != 0));
    }
}
