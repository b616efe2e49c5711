//! Quality analyzer producing one metric bundle per sample.
//!
//! The analyzer is stateless: every call is a pure function of the sample
//! (timing aside), so it can be shared freely across threads.

use super::{
    sample::{ByteSample, Histogram},
    statistics,
    threshold::{Advisory, AnalyzerConfig},
};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

/// Errors that end the analysis of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnalysisError {
    /// A statistic came out non-finite.
    #[error("invalid sample: {0}")]
    InvalidSample(String),

    /// Too few bytes for a reliable chi-square test (strict mode only).
    #[error("degenerate sample: expected count per bin {expected_per_bin:.2} below {minimum:.2}")]
    DegenerateSample {
        /// N / 256 for this sample.
        expected_per_bin: f64,
        /// Configured minimum.
        minimum: f64,
    },
}

/// Statistics and timing for one analyzed sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBundle {
    /// Wall-clock time spent computing the statistics, in seconds.
    pub elapsed_seconds: f64,
    /// Shannon entropy estimate in bits per byte, in `[0, 8]`.
    pub entropy_bits: f64,
    /// Chi-square statistic against the uniform byte distribution.
    pub chi_square_statistic: f64,
    /// Chi-square p-value (255 degrees of freedom), in `[0, 1]`.
    pub chi_square_p_value: f64,
    /// Kolmogorov-Smirnov statistic against uniform(0, 1).
    pub ks_statistic: f64,
    /// Kolmogorov-Smirnov p-value, in `[0, 1]`.
    pub ks_p_value: f64,
    /// Number of bytes analyzed.
    pub sample_len: usize,
    /// Caveats about the reliability of the statistics.
    pub advisories: Vec<Advisory>,
}

impl MetricBundle {
    /// Returns true if no advisory was raised.
    pub fn is_reliable(&self) -> bool {
        self.advisories.is_empty()
    }
}

/// Computes the fixed metric bundle for byte samples.
#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer {
    config: AnalyzerConfig,
}

impl QualityAnalyzer {
    /// Creates an analyzer with the given thresholds.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer thresholds.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one sample.
    ///
    /// Runs histogram, entropy, chi-square and Kolmogorov-Smirnov in that
    /// order and times the four steps together.
    pub fn analyze(&self, sample: &ByteSample) -> Result<MetricBundle, AnalysisError> {
        if sample.is_empty() {
            return Err(AnalysisError::InvalidSample("sample is empty".into()));
        }

        let start = Instant::now();

        let hist = Histogram::from_bytes(sample.as_bytes());
        let entropy_bits = statistics::shannon_entropy_bits(&hist)?;
        let chi = statistics::chi_square_uniform(&hist)?;
        let ks = statistics::ks_uniform(&hist)?;

        let elapsed_seconds = start.elapsed().as_secs_f64();

        let advisories = self.config.check(&chi)?;
        for advisory in &advisories {
            tracing::warn!(advisory = %advisory, "Sample is under-powered");
        }

        tracing::trace!(
            len = sample.len(),
            entropy_bits,
            chi_square = chi.statistic,
            ks = ks.statistic,
            "Sample analyzed"
        );

        Ok(MetricBundle {
            elapsed_seconds,
            entropy_bits,
            chi_square_statistic: chi.statistic,
            chi_square_p_value: chi.p_value,
            ks_statistic: ks.statistic,
            ks_p_value: ks.p_value,
            sample_len: sample.len(),
            advisories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn uniform_sample() -> ByteSample {
        // 0..=255 repeated 39 times: 9984 bytes
        ByteSample::from_bytes((0..39).flat_map(|_| 0..=255u8).collect())
    }

    #[test]
    fn test_constant_zero_sample() {
        let analyzer = QualityAnalyzer::default();
        let bundle = analyzer
            .analyze(&ByteSample::from_bytes(vec![0u8; 10_000]))
            .unwrap();

        assert!(bundle.entropy_bits < 1e-6);
        assert!(bundle.chi_square_statistic > 1e6);
        assert!(bundle.chi_square_p_value < 1e-12);
        assert_abs_diff_eq!(bundle.ks_statistic, 1.0);
        assert!(bundle.ks_p_value < 1e-12);
        assert!(bundle.elapsed_seconds >= 0.0);
        assert!(bundle.is_reliable());
    }

    #[test]
    fn test_uniform_sample() {
        let analyzer = QualityAnalyzer::default();
        let bundle = analyzer.analyze(&uniform_sample()).unwrap();

        assert_eq!(bundle.sample_len, 9984);
        assert!(bundle.entropy_bits > 7.999_999);
        assert!(bundle.entropy_bits <= 8.0);
        assert!(bundle.chi_square_p_value > 0.05);
        assert!(bundle.ks_statistic < 0.01);
    }

    #[test]
    fn test_empty_sample_rejected() {
        let analyzer = QualityAnalyzer::default();

        assert!(matches!(
            analyzer.analyze(&ByteSample::from_bytes(Vec::new())),
            Err(AnalysisError::InvalidSample(_))
        ));
    }

    #[test]
    fn test_analysis_is_pure() {
        let analyzer = QualityAnalyzer::default();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
        let sample = ByteSample::from_bytes(data);

        let first = analyzer.analyze(&sample).unwrap();
        let second = analyzer.analyze(&sample).unwrap();

        assert_eq!(first.entropy_bits.to_bits(), second.entropy_bits.to_bits());
        assert_eq!(
            first.chi_square_statistic.to_bits(),
            second.chi_square_statistic.to_bits()
        );
        assert_eq!(first.ks_statistic.to_bits(), second.ks_statistic.to_bits());
    }

    #[test]
    fn test_small_sample_carries_advisory() {
        let analyzer = QualityAnalyzer::default();
        let bundle = analyzer
            .analyze(&ByteSample::from_bytes((0..=255u8).collect()))
            .unwrap();

        assert!(!bundle.is_reliable());
        assert!(matches!(
            bundle.advisories[0],
            Advisory::DegenerateSample { .. }
        ));
    }

    #[test]
    fn test_strict_analyzer_rejects_small_sample() {
        let analyzer = QualityAnalyzer::new(AnalyzerConfig::strict());

        assert!(matches!(
            analyzer.analyze(&ByteSample::from_bytes(vec![1, 2, 3])),
            Err(AnalysisError::DegenerateSample { .. })
        ));
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn metrics_stay_in_range(data in proptest::collection::vec(any::<u8>(), 1..4096)) {
                let bundle = QualityAnalyzer::default()
                    .analyze(&ByteSample::from_bytes(data))
                    .unwrap();

                prop_assert!((0.0..=8.0).contains(&bundle.entropy_bits));
                prop_assert!((0.0..=1.0).contains(&bundle.chi_square_p_value));
                prop_assert!((0.0..=1.0).contains(&bundle.ks_p_value));
                prop_assert!(bundle.chi_square_statistic >= 0.0);
                prop_assert!(bundle.ks_statistic >= 0.0);
            }

            #[test]
            fn analysis_is_deterministic(data in proptest::collection::vec(any::<u8>(), 1..2048)) {
                let analyzer = QualityAnalyzer::default();
                let sample = ByteSample::from_bytes(data);
                let a = analyzer.analyze(&sample).unwrap();
                let b = analyzer.analyze(&sample).unwrap();

                prop_assert_eq!(a.entropy_bits.to_bits(), b.entropy_bits.to_bits());
                prop_assert_eq!(a.chi_square_statistic.to_bits(), b.chi_square_statistic.to_bits());
                prop_assert_eq!(a.ks_statistic.to_bits(), b.ks_statistic.to_bits());
            }
        }
    }
}
