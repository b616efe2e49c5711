//! Byte sample and histogram types.

/// Number of distinct byte values, and therefore histogram bins.
pub const BINS: usize = 256;

/// A finite, immutable sequence of bytes produced by one source.
///
/// This is the input of the analysis stage. It is consumed by a single
/// analysis call and never retained afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteSample {
    data: Vec<u8>,
}

impl ByteSample {
    /// Wraps raw bytes as a sample.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the raw byte data.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the sample and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for ByteSample {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl std::fmt::Debug for ByteSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSample")
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Occurrence counts for each of the 256 byte values.
///
/// Bin `i` counts occurrences of byte value `i`. Counts always sum to
/// the length of the sample the histogram was built from.
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; BINS],
    total: u64,
}

impl Histogram {
    /// Builds the histogram of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; BINS];
        for &b in data {
            counts[b as usize] += 1;
        }
        Self {
            counts,
            total: data.len() as u64,
        }
    }

    /// Returns the per-value counts.
    #[inline]
    pub fn counts(&self) -> &[u64; BINS] {
        &self.counts
    }

    /// Returns the count for one byte value.
    #[inline]
    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// Total number of observations.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of byte values that never occurred.
    pub fn empty_bins(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("total", &self.total)
            .field("empty_bins", &self.empty_bins())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_each_value() {
        let hist = Histogram::from_bytes(&[0, 0, 7, 255, 255, 255]);

        assert_eq!(hist.count(0), 2);
        assert_eq!(hist.count(7), 1);
        assert_eq!(hist.count(255), 3);
        assert_eq!(hist.count(1), 0);
        assert_eq!(hist.total(), 6);
        assert_eq!(hist.empty_bins(), 253);
    }

    #[test]
    fn test_empty_histogram() {
        let hist = Histogram::from_bytes(&[]);

        assert_eq!(hist.total(), 0);
        assert_eq!(hist.empty_bins(), BINS);
    }

    #[test]
    fn test_sample_accessors() {
        let sample = ByteSample::from(vec![1u8, 2, 3]);

        assert_eq!(sample.len(), 3);
        assert!(!sample.is_empty());
        assert_eq!(sample.as_bytes(), &[1, 2, 3]);
        assert_eq!(sample.into_bytes(), vec![1, 2, 3]);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn histogram_sums_to_sample_length(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
                let hist = Histogram::from_bytes(&data);
                let sum: u64 = hist.counts().iter().sum();
                prop_assert_eq!(sum, data.len() as u64);
                prop_assert_eq!(hist.total(), data.len() as u64);
            }
        }
    }
}
