//! Sample-power thresholds and advisories.
//!
//! Under-powered samples still get a full metric bundle; the thresholds
//! here decide whether that bundle carries an advisory or, in strict mode,
//! whether analysis is refused outright.

use super::{analyzer::AnalysisError, statistics::ChiSquareTest};
use serde::{Deserialize, Serialize};

/// Analysis thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Minimum expected count per histogram bin for the chi-square
    /// approximation to be trusted.
    pub min_expected_per_bin: f64,
    /// Fail with `DegenerateSample` instead of attaching an advisory.
    pub strict: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_expected_per_bin: 5.0, // Cochran's rule of thumb
            strict: false,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a config that refuses under-powered samples.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    /// Smallest sample size that satisfies `min_expected_per_bin`.
    pub fn min_sample_len(&self) -> usize {
        (self.min_expected_per_bin * super::BINS as f64).ceil() as usize
    }

    /// Checks the chi-square baseline against the thresholds.
    ///
    /// Returns the advisories to attach to the bundle, or an error in strict mode.
    pub fn check(&self, chi: &ChiSquareTest) -> Result<Vec<Advisory>, AnalysisError> {
        if chi.expected_per_bin >= self.min_expected_per_bin {
            return Ok(Vec::new());
        }

        if self.strict {
            return Err(AnalysisError::DegenerateSample {
                expected_per_bin: chi.expected_per_bin,
                minimum: self.min_expected_per_bin,
            });
        }

        Ok(vec![Advisory::DegenerateSample {
            expected_per_bin: chi.expected_per_bin,
            minimum: self.min_expected_per_bin,
        }])
    }
}

/// Non-fatal caveats attached to a metric bundle.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The chi-square p-value rests on too few counts per bin.
    #[error("expected count per bin {expected_per_bin:.2} below {minimum:.2}; chi-square p-value is unreliable")]
    DegenerateSample {
        /// N / 256 for this sample.
        expected_per_bin: f64,
        /// Configured minimum.
        minimum: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chi_with_expected(expected_per_bin: f64) -> ChiSquareTest {
        ChiSquareTest {
            statistic: 0.0,
            p_value: 1.0,
            expected_per_bin,
        }
    }

    #[test]
    fn test_well_powered_sample_has_no_advisory() {
        let config = AnalyzerConfig::default();
        let advisories = config.check(&chi_with_expected(39.0625)).unwrap();

        assert!(advisories.is_empty());
    }

    #[test]
    fn test_small_sample_gets_advisory() {
        let config = AnalyzerConfig::default();
        let advisories = config.check(&chi_with_expected(0.5)).unwrap();

        assert_eq!(advisories.len(), 1);
        assert!(matches!(
            advisories[0],
            Advisory::DegenerateSample { minimum, .. } if minimum == 5.0
        ));
    }

    #[test]
    fn test_strict_mode_rejects_small_sample() {
        let config = AnalyzerConfig::strict();

        assert!(matches!(
            config.check(&chi_with_expected(0.5)),
            Err(AnalysisError::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_min_sample_len() {
        assert_eq!(AnalyzerConfig::default().min_sample_len(), 1280);
    }
}
